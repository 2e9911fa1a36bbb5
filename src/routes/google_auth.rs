//! Google OAuth callback page. The backend redirects here with the session in
//! the URL fragment; a complete callback signs the user in.

use super::Route;
use crate::{
    app_lib::AppError,
    features::auth::{AuthContext, client, oauth, types::Session},
};
use tracing::{info, warn};

pub const GOOGLE_SIGN_IN_FAILED_MESSAGE: &str = "Failed to sign in with Google";

/// Where the browser is sent to start the Google sign-in.
#[must_use]
pub fn start_url(auth: &AuthContext) -> String {
    client::google_auth_url(auth.api())
}

/// Completes the handoff from the redirect `location`.
///
/// # Errors
/// Returns `AppError::Parse` when the callback lacks `name`, `email` or
/// `accessToken` (the session is left untouched), or `AppError::Storage` if the
/// session cannot be persisted.
pub fn complete(auth: &AuthContext, location: &str) -> Result<Session, AppError> {
    let session = oauth::parse_callback(location)
        .map(oauth::OAuthCallback::into_session)
        .and_then(|session| {
            auth.set_session(session.clone())?;
            Ok(session)
        })
        .inspect_err(|err| {
            warn!("Google sign-in failed: {err}");
            auth.notifier().error(GOOGLE_SIGN_IN_FAILED_MESSAGE);
        })?;

    auth.navigator().navigate(Route::Home);
    info!("signed in with Google");
    Ok(session)
}
