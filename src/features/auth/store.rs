//! Persistent session store: one JSON blob under a fixed key of the durable
//! key-value storage. Only `AuthContext` writes through it; API clients read the
//! bearer token from it right before each protected call.

use super::types::Session;
use crate::app_lib::{AppError, SharedStore};
use tracing::warn;

pub const SESSION_KEY: &str = "AuthorizedUserData";

#[derive(Clone)]
pub struct SessionStore {
    store: SharedStore,
}

impl SessionStore {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Reads the persisted session, if any.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the store is unreadable or the entry is not a session.
    pub fn load(&self) -> Result<Option<Session>, AppError> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };

        serde_json::from_str::<Option<Session>>(&raw).map_err(|err| {
            AppError::Storage(format!("Invalid {SESSION_KEY} entry: {err}"))
        })
    }

    /// # Errors
    /// Returns `AppError::Storage` if the session cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), AppError> {
        let raw = serde_json::to_string(session)
            .map_err(|err| AppError::Serialization(format!("Failed to encode session: {err}")))?;
        self.store.set(SESSION_KEY, &raw)
    }

    /// # Errors
    /// Returns `AppError::Storage` if the entry cannot be removed.
    pub fn clear(&self) -> Result<(), AppError> {
        self.store.remove(SESSION_KEY)
    }

    /// Access token to attach as a bearer credential, read fresh on every call.
    ///
    /// # Errors
    /// Returns `AppError::Unauthorized` when no token is stored.
    pub fn bearer(&self) -> Result<String, AppError> {
        let session = self.load().unwrap_or_else(|err| {
            warn!("Ignoring unreadable session: {err}");
            None
        });

        session
            .and_then(|session| session.access_token)
            .ok_or_else(|| AppError::Unauthorized {
                status: 401,
                message: "You are not signed in".to_string(),
            })
    }
}
