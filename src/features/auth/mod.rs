//! Auth feature module: session lifecycle, silent refresh, sign-in/sign-up
//! endpoints, OAuth handoff parsing and the route guard. It touches security
//! boundaries and must avoid logging passwords or token material.
//!
//! Flow Overview: login, activation and the OAuth callback each produce a
//! `Session` that `AuthContext` persists before publishing. While a session is
//! authenticated a scheduler refreshes its access token every 31 minutes; a 401
//! from refresh or an explicit logout tears the session down.

pub mod client;
pub mod guards;
pub mod oauth;
pub mod refresh;
pub mod state;
pub mod store;
pub mod types;

pub use refresh::RefreshOutcome;
pub use state::AuthContext;
