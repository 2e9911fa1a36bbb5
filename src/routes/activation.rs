//! Activation page, reached from the emailed link in any session state.
//!
//! Flow Overview: one call to the activation endpoint. Success enters the
//! returned session at once; either outcome then shows its message for a
//! three-tick countdown before navigating (home on success, sign-up on failure).

use super::Route;
use crate::features::auth::{AuthContext, client};
use tokio::{sync::watch, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const ACTIVATED_MESSAGE: &str = "You have been successfully activated!";
pub const ACTIVATION_FAILED_MESSAGE: &str = "Failed to activate your account";
pub const COUNTDOWN_TICKS: u32 = 3;
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationState {
    Pending,
    Activated,
    Failed,
}

impl ActivationState {
    #[must_use]
    pub fn message(self) -> Option<&'static str> {
        match self {
            ActivationState::Pending => None,
            ActivationState::Activated => Some(ACTIVATED_MESSAGE),
            ActivationState::Failed => Some(ACTIVATION_FAILED_MESSAGE),
        }
    }
}

/// What the page shows: state plus seconds left before the redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationView {
    pub state: ActivationState,
    pub remaining: u32,
}

pub struct ActivationPage {
    view: watch::Sender<ActivationView>,
    tick: Duration,
}

impl Default for ActivationPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationPage {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tick(TICK)
    }

    /// Page whose countdown advances every `tick`.
    #[must_use]
    pub fn with_tick(tick: Duration) -> Self {
        let (view, _) = watch::channel(ActivationView {
            state: ActivationState::Pending,
            remaining: COUNTDOWN_TICKS,
        });
        Self { view, tick }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ActivationView> {
        self.view.subscribe()
    }

    /// Runs the activation flow. Cancelling `cancel` stops the pending request
    /// or the countdown; no navigation happens afterwards.
    pub async fn run(
        &self,
        auth: &AuthContext,
        activation_token: &str,
        cancel: &CancellationToken,
    ) -> ActivationState {
        let result = tokio::select! {
            () = cancel.cancelled() => return ActivationState::Pending,
            result = client::activate(auth.api(), activation_token) => result,
        };

        let state = match result.and_then(|session| auth.set_session(session)) {
            Ok(()) => {
                info!("account activated");
                ActivationState::Activated
            }
            Err(err) => {
                warn!("Activation failed: {err}");
                ActivationState::Failed
            }
        };

        self.view.send_replace(ActivationView {
            state,
            remaining: COUNTDOWN_TICKS,
        });

        for remaining in (0..COUNTDOWN_TICKS).rev() {
            tokio::select! {
                () = cancel.cancelled() => return state,
                () = tokio::time::sleep(self.tick) => {}
            }
            self.view.send_replace(ActivationView { state, remaining });
        }

        let target = match state {
            ActivationState::Activated => Route::Home,
            _ => Route::SignUp,
        };
        auth.navigator().navigate(target);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_lib::{ApiClient, AppConfig, KeyValueStore, MemoryStore, SharedStore},
        components::notification::Notifier,
        features::auth::store::SESSION_KEY,
    };
    use anyhow::Result;
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FAST_TICK: Duration = Duration::from_millis(20);

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    async fn context(status: u16) -> Result<(MockServer, AuthContext, SharedStore)> {
        let server = MockServer::start().await;
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_json(json!({
                "user": { "id": 1, "name": "A", "email": "a@b.com" },
                "accessToken": "tok1"
            }))
        } else {
            ResponseTemplate::new(status).set_body_json(json!({ "message": "Bad token" }))
        };
        Mock::given(method("GET"))
            .and(path("/activate/at"))
            .respond_with(response)
            .mount(&server)
            .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let api = ApiClient::new(AppConfig::new(Some(&server.uri()), None)?)?;
        let auth = AuthContext::new(api, store.clone(), Notifier::new());
        Ok((server, auth, store))
    }

    #[tokio::test]
    async fn failure_counts_down_then_goes_to_sign_up() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let (_server, auth, store) = context(400).await?;
        let page = ActivationPage::with_tick(FAST_TICK);
        let mut views = page.subscribe();

        let started = tokio::time::Instant::now();
        let state = page.run(&auth, "at", &CancellationToken::new()).await;

        assert_eq!(state, ActivationState::Failed);
        assert!(started.elapsed() >= FAST_TICK * COUNTDOWN_TICKS);
        assert_eq!(auth.navigator().current(), Route::SignUp);
        assert!(!auth.is_authenticated());
        assert_eq!(store.get(SESSION_KEY)?, None);
        assert_eq!(
            *views.borrow_and_update(),
            ActivationView {
                state: ActivationState::Failed,
                remaining: 0
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn success_enters_session_then_goes_home() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let (_server, auth, store) = context(200).await?;
        let page = ActivationPage::with_tick(FAST_TICK);
        let cancel = CancellationToken::new();

        let run = page.run(&auth, "at", &cancel);
        tokio::pin!(run);

        // the session is entered before the countdown ends
        let mut views = page.subscribe();
        tokio::select! {
            _ = &mut run => anyhow::bail!("finished before countdown"),
            changed = views.changed() => changed?,
        }
        assert_eq!(views.borrow().state, ActivationState::Activated);
        assert!(auth.is_authenticated());
        assert!(store.get(SESSION_KEY)?.is_some());

        assert_eq!(run.await, ActivationState::Activated);
        assert_eq!(auth.navigator().current(), Route::Home);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_during_countdown_skips_navigation() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let (_server, auth, _store) = context(400).await?;
        auth.navigator().navigate(Route::Activate("at".to_string()));
        let page = ActivationPage::new();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        let mut views = page.subscribe();
        tokio::spawn(async move {
            if views.changed().await.is_ok() {
                canceller.cancel();
            }
        });

        assert_eq!(page.run(&auth, "at", &cancel).await, ActivationState::Failed);
        assert_eq!(
            auth.navigator().current(),
            Route::Activate("at".to_string())
        );
        Ok(())
    }

    #[test]
    fn default_page_counts_whole_seconds() {
        let page = ActivationPage::default();
        assert_eq!(page.tick, TICK);
        assert_eq!(
            *page.subscribe().borrow(),
            ActivationView {
                state: ActivationState::Pending,
                remaining: COUNTDOWN_TICKS
            }
        );
    }
}
