//! Shared client utilities for API access, configuration, errors, durable
//! storage and the theme preference.
//!
//! ## Endpoints
//!
//! | Method | Path | Credentials |
//! |---|---|---|
//! | `POST` | `/register`, `/login`, `/forgot-password` | none (`/login` sets the refresh cookie) |
//! | `GET` | `/activate/:token`, `/users` | none |
//! | `POST` | `/logout/:id`, `/refresh/:id` | refresh cookie |
//! | `PATCH` | `/update-name/:id`, `/update-email/:token`, `/update-password/:id` | bearer |
//! | `POST` | `/send-confirmation-email/:id` | bearer |
//! | `PATCH` | `/reset-password/:token` | none |
//!
//! Callers must not log tokens or passwords.

pub mod api;
pub mod config;
pub mod errors;
pub mod storage;
pub mod theme;

pub use api::ApiClient;
pub use config::AppConfig;
pub use errors::{AppError, FieldErrors, GENERIC_ERROR_MESSAGE};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use theme::{Theme, ThemeStore};
