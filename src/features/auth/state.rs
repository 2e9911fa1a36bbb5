//! Session state controller. `AuthContext` owns the in-memory session, keeps
//! it in sync with the persistent session store, owns the silent-refresh
//! scheduler and performs every Anonymous/Authenticated transition. All readers
//! and writers go through it, so memory and storage are always written
//! together inside one critical section.

use super::{
    client,
    refresh::{REFRESH_INTERVAL, SESSION_EXPIRED_MESSAGE},
    store::SessionStore,
    types::Session,
    types::User,
};
use crate::{
    app_lib::{ApiClient, AppError, SharedStore},
    components::notification::{Notification, Notifier},
    routes::{Navigator, Route},
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::{sync::watch, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const LOGGED_OUT_MESSAGE: &str = "You have been logged out";

pub(super) struct Inner {
    pub(super) api: ApiClient,
    pub(super) sessions: SessionStore,
    pub(super) notifier: Notifier,
    pub(super) navigator: Navigator,
    pub(super) session: watch::Sender<Session>,
    pub(super) refresh: Mutex<Option<CancellationToken>>,
    pub(super) refresh_interval: Duration,
}

/// Auth session context shared by every page.
#[derive(Clone)]
pub struct AuthContext {
    pub(super) inner: Arc<Inner>,
}

impl AuthContext {
    #[must_use]
    pub fn new(api: ApiClient, store: SharedStore, notifier: Notifier) -> Self {
        Self::with_refresh_interval(api, store, notifier, REFRESH_INTERVAL)
    }

    #[must_use]
    pub fn with_refresh_interval(
        api: ApiClient,
        store: SharedStore,
        notifier: Notifier,
        refresh_interval: Duration,
    ) -> Self {
        let (session, receiver) = watch::channel(Session::default());
        let navigator = Navigator::new(receiver);

        Self {
            inner: Arc::new(Inner {
                api,
                sessions: SessionStore::new(store),
                notifier,
                navigator,
                session,
                refresh: Mutex::new(None),
                refresh_interval,
            }),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    /// Snapshot of the in-memory session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.borrow().is_authenticated()
    }

    /// Restores the persisted session once at start, without asking the server.
    /// Returns whether the restored session is authenticated.
    pub fn restore(&self) -> bool {
        let persisted = match self.inner.sessions.load() {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!("Ignoring persisted session: {err}");
                None
            }
        };

        let Some(session) = persisted.filter(|session| session.user.is_some()) else {
            debug!("no persisted session");
            return false;
        };

        let authenticated = session.is_authenticated();
        self.inner.session.send_replace(session);

        if authenticated {
            self.schedule_refresh();
        }
        self.inner.navigator.revalidate();

        info!(authenticated, "session restored");
        authenticated
    }

    /// Enters the session returned by login, activation or the OAuth callback:
    /// persists it, mirrors it in memory and (re)starts the refresh timer.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the session cannot be persisted; memory is left untouched.
    pub fn set_session(&self, session: Session) -> Result<(), AppError> {
        let authenticated = session.is_authenticated();
        self.commit(session)?;

        if authenticated {
            self.schedule_refresh();
        } else {
            self.cancel_refresh();
        }

        info!(authenticated, "session set");
        Ok(())
    }

    /// Merges `patch` into the current user (name change, email confirmation).
    /// Returns `false` when there is no user to update.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the updated session cannot be persisted.
    pub fn update_user(&self, patch: &User) -> Result<bool, AppError> {
        let mut next = self.session();
        let Some(user) = next.user.as_mut() else {
            debug!("no user to update");
            return Ok(false);
        };
        user.merge(patch);
        self.commit(next)?;
        Ok(true)
    }

    /// Swaps the access token if the session still carries `sent`. Results of
    /// requests started before a newer login or logout are discarded.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the new token cannot be persisted.
    pub(super) fn replace_token(&self, sent: &str, fresh: String) -> Result<bool, AppError> {
        let mut outcome = Ok(false);
        let sessions = &self.inner.sessions;

        self.inner.session.send_if_modified(|current| {
            if current.access_token.as_deref() != Some(sent) {
                return false;
            }

            let next = Session {
                user: current.user.clone(),
                access_token: Some(fresh),
            };
            match sessions.save(&next) {
                Ok(()) => {
                    *current = next;
                    outcome = Ok(true);
                    true
                }
                Err(err) => {
                    outcome = Err(err);
                    false
                }
            }
        });

        outcome
    }

    /// Signs out. The local session is cleared whatever the server answers.
    pub async fn logout(&self) {
        let current = self.session();

        if let Some(user_id) = current.user_id() {
            if let Err(err) = client::logout(&self.inner.api, user_id).await {
                warn!("Server logout failed: {err}");
            }
        }

        self.end_session(Notification::info(LOGGED_OUT_MESSAGE));
    }

    /// Ends the session when a protected call sent with `sent` came back 401.
    /// Other errors, and rejections of a token the session no longer holds,
    /// leave everything as it is.
    pub(crate) fn on_unauthorized(&self, sent: Option<&str>, err: &AppError) -> bool {
        if !matches!(err, AppError::Unauthorized { .. }) {
            return false;
        }
        let current = self.inner.session.borrow().access_token.clone();
        if sent.is_none() || current.as_deref() != sent {
            debug!("ignoring rejection of a superseded token");
            return false;
        }

        self.end_session(Notification::error(SESSION_EXPIRED_MESSAGE));
        true
    }

    /// Authenticated → Anonymous: stop refreshing, drop memory and storage,
    /// tell the user and go to the sign-in page.
    pub(super) fn end_session(&self, notification: Notification) {
        self.cancel_refresh();

        let sessions = &self.inner.sessions;
        self.inner.session.send_modify(|current| {
            if let Err(err) = sessions.clear() {
                warn!("Failed to remove persisted session: {err}");
            }
            *current = Session::default();
        });

        self.inner.notifier.notify(notification);
        self.inner.navigator.navigate(Route::SignIn);

        info!("session ended");
    }

    /// Persists then publishes `next`; on a storage failure nothing changes.
    fn commit(&self, next: Session) -> Result<(), AppError> {
        let mut outcome = Ok(());
        let sessions = &self.inner.sessions;

        self.inner
            .session
            .send_if_modified(|current| match sessions.save(&next) {
                Ok(()) => {
                    *current = next;
                    true
                }
                Err(err) => {
                    outcome = Err(err);
                    false
                }
            });

        outcome
    }

    pub(super) fn refresh_slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.inner
            .refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
