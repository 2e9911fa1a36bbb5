//! # Cabinet (authentication client)
//!
//! `cabinet` is the client side of a small user-authentication service: it
//! registers and activates accounts, signs users in and out, resets and
//! changes passwords, completes a Google OAuth handoff and lists users.
//!
//! ## Session lifecycle
//!
//! A session is the pair of a user identity (`id`, `name`, `email`) and a
//! short-lived bearer access token. It is persisted under the
//! `AuthorizedUserData` key of a durable key-value store and mirrored in memory
//! by [`features::auth::state::AuthContext`], which is the only writer of both.
//!
//! - **Authenticated** means `user.name`, `user.email` and `accessToken` are all
//!   present; any partial state is anonymous.
//! - **Silent refresh:** while authenticated the access token is swapped every
//!   31 minutes using the long-lived refresh cookie held by the HTTP client.
//!   A `401` from the refresh endpoint ends the session.
//! - **Trust-on-read:** a persisted session is restored at start without asking
//!   the server; the first refresh or protected call discovers a stale token.
//!
//! ## Navigation
//!
//! Pages live under [`routes`]. Anonymous-only routes (`sign-in`, `sign-up`,
//! `forgot-password`, `reset-password/:token`, `google-auth`) vanish from the
//! navigable set once a session exists; activation and email confirmation links
//! work in any state.

#[path = "lib/mod.rs"]
pub mod app_lib;
pub mod cli;
pub mod components;
pub mod features;
pub mod routes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
