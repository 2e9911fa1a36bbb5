//! Email-change confirmation page. Single attempt, no retry.

use super::Route;
use crate::{
    app_lib::AppError,
    features::{
        auth::{AuthContext, types::User},
        me::client,
    },
};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const INVALID_CONFIRMATION_MESSAGE: &str = "Confirmation token is not valid anymore";
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// New email merged into the session; navigated home after the delay.
    Confirmed(String),
    Rejected(AppError),
    Cancelled,
}

/// Confirms the pending email change behind `confirmation_token`.
///
/// Only the email of the persisted user changes; id, name and access token
/// stay as they are. Cancelling `cancel` drops the request or the redirect timer.
pub async fn run(
    auth: &AuthContext,
    confirmation_token: &str,
    cancel: &CancellationToken,
) -> ConfirmationOutcome {
    run_with_delay(auth, confirmation_token, cancel, REDIRECT_DELAY).await
}

/// Same as [`run`], waiting `delay` before the redirect home.
pub async fn run_with_delay(
    auth: &AuthContext,
    confirmation_token: &str,
    cancel: &CancellationToken,
    delay: Duration,
) -> ConfirmationOutcome {
    let sent = auth.session().access_token;
    let result = tokio::select! {
        () = cancel.cancelled() => return ConfirmationOutcome::Cancelled,
        result = client::update_email(auth.api(), auth.sessions(), confirmation_token) => result,
    };

    let email = match result.and_then(|updated| apply(auth, &updated)) {
        Ok(email) => email,
        Err(err) => {
            warn!("Email confirmation failed: {err}");
            if auth.on_unauthorized(sent.as_deref(), &err) {
                return ConfirmationOutcome::Rejected(err);
            }
            auth.notifier().error(INVALID_CONFIRMATION_MESSAGE);
            auth.navigator().navigate(Route::Home);
            return ConfirmationOutcome::Rejected(err);
        }
    };

    info!("email change confirmed");

    tokio::select! {
        () = cancel.cancelled() => return ConfirmationOutcome::Cancelled,
        () = tokio::time::sleep(delay) => {}
    }
    auth.navigator().navigate(Route::Home);
    ConfirmationOutcome::Confirmed(email)
}

fn apply(auth: &AuthContext, updated: &User) -> Result<String, AppError> {
    let email = updated
        .email
        .clone()
        .ok_or_else(|| AppError::Parse("Confirmation response has no email".to_string()))?;

    let patch = User {
        id: None,
        name: None,
        email: Some(email.clone()),
    };
    auth.update_user(&patch)?;
    Ok(email)
}
