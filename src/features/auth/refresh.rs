//! Silent access-token refresh. One scheduler per `AuthContext`; starting a new
//! one cancels the previous, and teardown cancels it outright.

use super::{client, state::AuthContext, state::Inner};
use crate::app_lib::{AppError, GENERIC_ERROR_MESSAGE};
use std::sync::{Arc, Weak};
use tokio::{
    runtime::Handle,
    time::{Duration, Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(31 * 60);

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please sign in again";
pub const STILL_VALID_MESSAGE: &str = "Your session is still valid";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New access token stored; user untouched.
    Refreshed,
    /// Refresh credential rejected; the session was torn down.
    Expired,
    /// Server kept the current token.
    StillValid,
    /// Any other failure; nothing changed.
    Failed(AppError),
    /// No authenticated session, or the session changed while the call was in flight.
    Skipped,
}

impl AuthContext {
    /// Runs one refresh cycle with the current `(user.id, accessToken)`.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let current = self.session();
        if !current.is_authenticated() {
            debug!("refresh skipped: not signed in");
            return RefreshOutcome::Skipped;
        }
        let (Some(user_id), Some(sent)) = (current.user_id(), current.access_token) else {
            debug!("refresh skipped: not signed in");
            return RefreshOutcome::Skipped;
        };

        match client::refresh(self.api(), user_id, &sent).await {
            Ok(response) => match self.replace_token(&sent, response.access_token) {
                Ok(true) => {
                    info!("access token refreshed");
                    RefreshOutcome::Refreshed
                }
                Ok(false) => {
                    debug!("discarding refresh result for a superseded session");
                    RefreshOutcome::Skipped
                }
                Err(err) => {
                    warn!("Failed to store refreshed token: {err}");
                    self.notifier().error(GENERIC_ERROR_MESSAGE);
                    RefreshOutcome::Failed(err)
                }
            },
            Err(err @ AppError::Unauthorized { .. }) => {
                if self.on_unauthorized(Some(&sent), &err) {
                    RefreshOutcome::Expired
                } else {
                    debug!("discarding refresh rejection for a superseded session");
                    RefreshOutcome::Skipped
                }
            }
            Err(err) if err.status() == Some(400) => {
                self.notifier().info(STILL_VALID_MESSAGE);
                RefreshOutcome::StillValid
            }
            Err(err) => {
                warn!("Refresh failed: {err}");
                self.notifier().error(GENERIC_ERROR_MESSAGE);
                RefreshOutcome::Failed(err)
            }
        }
    }

    /// (Re)starts the periodic refresh, superseding any running scheduler.
    pub(super) fn schedule_refresh(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.refresh_slot().replace(token.clone()) {
            previous.cancel();
        }

        let Ok(handle) = Handle::try_current() else {
            debug!("no runtime; refresh scheduler not started");
            return;
        };

        let period = self.inner.refresh_interval;
        let context = Arc::downgrade(&self.inner);
        handle.spawn(run_scheduler(context, token, period));
        debug!(period_secs = period.as_secs(), "refresh scheduled");
    }

    pub(super) fn cancel_refresh(&self) {
        if let Some(token) = self.refresh_slot().take() {
            token.cancel();
            debug!("refresh cancelled");
        }
    }
}

/// Holds only a weak handle so a dropped context stops its own scheduler.
async fn run_scheduler(context: Weak<Inner>, token: CancellationToken, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = context.upgrade() else {
                    break;
                };
                let auth = AuthContext { inner };
                let outcome = tokio::select! {
                    () = token.cancelled() => break,
                    outcome = auth.refresh_now() => outcome,
                };
                if outcome == RefreshOutcome::Expired {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_lib::{ApiClient, AppConfig, KeyValueStore, MemoryStore, SharedStore},
        components::notification::{Notification, Notifier},
        features::auth::{
            store::{SESSION_KEY, SessionStore},
            types::{Session, User},
        },
        routes::Route,
    };
    use anyhow::{Result, bail};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn user() -> User {
        User {
            id: Some(1),
            name: Some("A".to_string()),
            email: Some("a@b.com".to_string()),
        }
    }

    fn context(base_url: &str, store: SharedStore, period: Duration) -> Result<AuthContext> {
        let config = AppConfig::new(Some(base_url), None)?;
        Ok(AuthContext::with_refresh_interval(
            ApiClient::new(config)?,
            store,
            Notifier::new(),
            period,
        ))
    }

    async fn mount_refresh(server: &MockServer, old: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/refresh/1"))
            .and(body_json(json!({ "oldAccessToken": old })))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn refresh_success_replaces_token_only() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_refresh(
            &server,
            "tok1",
            ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "tok2" })),
        )
        .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store.clone(), REFRESH_INTERVAL)?;
        auth.set_session(Session::new(user(), "tok1"))?;

        assert_eq!(auth.refresh_now().await, RefreshOutcome::Refreshed);
        assert_eq!(auth.session(), Session::new(user(), "tok2"));
        assert_eq!(
            SessionStore::new(store).load()?,
            Some(Session::new(user(), "tok2"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn refresh_unauthorized_tears_down() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_refresh(
            &server,
            "tok1",
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })),
        )
        .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store.clone(), REFRESH_INTERVAL)?;
        auth.set_session(Session::new(user(), "tok1"))?;

        assert_eq!(auth.refresh_now().await, RefreshOutcome::Expired);
        assert!(!auth.is_authenticated());
        assert_eq!(store.get(SESSION_KEY)?, None);
        assert_eq!(auth.navigator().current(), Route::SignIn);
        assert_eq!(
            auth.notifier().current(),
            Some(Notification::error(SESSION_EXPIRED_MESSAGE))
        );
        Ok(())
    }

    #[tokio::test]
    async fn refresh_still_valid_and_failures_keep_state() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_refresh(
            &server,
            "tok1",
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Token is valid" })),
        )
        .await;
        mount_refresh(&server, "tok5", ResponseTemplate::new(500)).await;
        mount_refresh(
            &server,
            "tok6",
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden by policy" })),
        )
        .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store, REFRESH_INTERVAL)?;

        auth.set_session(Session::new(user(), "tok1"))?;
        assert_eq!(auth.refresh_now().await, RefreshOutcome::StillValid);
        assert_eq!(auth.session(), Session::new(user(), "tok1"));
        assert_eq!(
            auth.notifier().current(),
            Some(Notification::info(STILL_VALID_MESSAGE))
        );

        auth.set_session(Session::new(user(), "tok5"))?;
        match auth.refresh_now().await {
            RefreshOutcome::Failed(AppError::Http { status: 500, .. }) => {}
            other => bail!("expected failure, got {other:?}"),
        }
        assert_eq!(auth.session(), Session::new(user(), "tok5"));
        assert_eq!(
            auth.notifier().current(),
            Some(Notification::error(GENERIC_ERROR_MESSAGE))
        );

        // server wording never reaches the user from a background refresh
        auth.set_session(Session::new(user(), "tok6"))?;
        match auth.refresh_now().await {
            RefreshOutcome::Failed(AppError::Http { status: 403, .. }) => {}
            other => bail!("expected failure, got {other:?}"),
        }
        assert_eq!(auth.session(), Session::new(user(), "tok6"));
        assert_eq!(
            auth.notifier().current(),
            Some(Notification::error(GENERIC_ERROR_MESSAGE))
        );
        Ok(())
    }

    #[tokio::test]
    async fn refresh_result_after_logout_is_discarded() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_refresh(
            &server,
            "tok1",
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "late" }))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/logout/1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store.clone(), REFRESH_INTERVAL)?;
        auth.set_session(Session::new(user(), "tok1"))?;

        let pending = tokio::spawn({
            let auth = auth.clone();
            async move { auth.refresh_now().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        auth.logout().await;

        assert_eq!(pending.await?, RefreshOutcome::Skipped);
        assert_eq!(auth.session(), Session::default());
        assert_eq!(store.get(SESSION_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn scheduler_refreshes_periodically() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_refresh(
            &server,
            "tok1",
            ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "tok2" })),
        )
        .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store, Duration::from_millis(100))?;
        auth.set_session(Session::new(user(), "tok1"))?;

        let mut rx = auth.subscribe();
        tokio::time::timeout(std::time::Duration::from_secs(5), rx.changed()).await??;
        assert_eq!(auth.session().access_token.as_deref(), Some("tok2"));
        Ok(())
    }

    #[tokio::test]
    async fn scheduler_survives_a_failed_cycle() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/refresh/1"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_refresh(
            &server,
            "tok1",
            ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "tok2" })),
        )
        .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store, Duration::from_millis(100))?;
        auth.set_session(Session::new(user(), "tok1"))?;

        let mut rx = auth.subscribe();
        tokio::time::timeout(std::time::Duration::from_secs(5), rx.changed()).await??;
        assert_eq!(auth.session().access_token.as_deref(), Some("tok2"));

        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests.len() >= 2, "got {} requests", requests.len());
        Ok(())
    }

    #[tokio::test]
    async fn scheduler_stops_after_rejection() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/refresh/1"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context(&server.uri(), store.clone(), Duration::from_millis(100))?;
        auth.set_session(Session::new(user(), "tok1"))?;

        let mut rx = auth.subscribe();
        tokio::time::timeout(std::time::Duration::from_secs(5), rx.changed()).await??;
        assert!(!auth.is_authenticated());

        // several more periods pass without another request
        tokio::time::sleep(std::time::Duration::from_millis(350)).await;
        assert!(auth.refresh_slot().is_none());
        assert!(!auth.is_authenticated());
        assert_eq!(store.get(SESSION_KEY)?, None);
        assert_eq!(
            auth.notifier().current(),
            Some(Notification::error(SESSION_EXPIRED_MESSAGE))
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_supersedes_scheduler() -> Result<()> {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context("http://127.0.0.1:9", store, REFRESH_INTERVAL)?;

        auth.set_session(Session::new(user(), "tok1"))?;
        let first = auth.refresh_slot().clone();
        assert!(first.as_ref().is_some_and(|t| !t.is_cancelled()));

        auth.set_session(Session::new(user(), "tok2"))?;
        assert!(first.is_some_and(|t| t.is_cancelled()));

        let second = auth.refresh_slot().clone();
        auth.end_session(Notification::info("bye"));
        assert!(second.is_some_and(|t| t.is_cancelled()));
        assert!(auth.refresh_slot().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_without_session_is_skipped() -> Result<()> {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let auth = context("http://127.0.0.1:9", store, REFRESH_INTERVAL)?;
        assert_eq!(auth.refresh_now().await, RefreshOutcome::Skipped);
        Ok(())
    }
}
