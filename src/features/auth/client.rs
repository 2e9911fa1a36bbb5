//! Client wrappers for the auth endpoints. These helpers fix paths and payload
//! shapes so route code never builds URLs or reads response fields by hand.

use super::types::{
    ForgotPasswordRequest, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest,
    ResetPasswordRequest, Session, User, UserId,
};
use crate::app_lib::{ApiClient, AppError};
use tracing::instrument;

/// Creates an account; the server answers with the created user and emails an activation link.
#[instrument(skip_all)]
pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<User, AppError> {
    api.post_json(&["register"], request).await
}

/// Activates an account from the emailed token and returns a fresh session.
#[instrument(skip_all)]
pub async fn activate(api: &ApiClient, activation_token: &str) -> Result<Session, AppError> {
    api.get_json(&["activate", activation_token]).await
}

/// Signs in; the response also sets the refresh cookie in the client's jar.
#[instrument(skip_all)]
pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<Session, AppError> {
    api.post_json(&["login"], request).await
}

/// Invalidates the refresh cookie on the server.
#[instrument(skip(api))]
pub async fn logout(api: &ApiClient, user_id: UserId) -> Result<(), AppError> {
    let id = user_id.to_string();
    api.post_empty(&["logout", id.as_str()]).await
}

/// Exchanges the refresh cookie and the old access token for a new access token.
/// The server answers 401 when the refresh cookie expired and 400 when the old
/// token is still valid.
#[instrument(skip(api, old_access_token))]
pub async fn refresh(
    api: &ApiClient,
    user_id: UserId,
    old_access_token: &str,
) -> Result<RefreshResponse, AppError> {
    let request = RefreshRequest {
        old_access_token: old_access_token.to_string(),
    };
    let id = user_id.to_string();
    api.post_json(&["refresh", id.as_str()], &request).await
}

/// Asks the server to email a password reset link.
#[instrument(skip_all)]
pub async fn forgot_password(api: &ApiClient, email: &str) -> Result<(), AppError> {
    let request = ForgotPasswordRequest {
        email: email.to_string(),
    };
    api.post_json_empty(&["forgot-password"], &request).await
}

/// Sets a new password using the emailed reset token.
#[instrument(skip_all)]
pub async fn reset_password(
    api: &ApiClient,
    reset_token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let request = ResetPasswordRequest {
        new_password: new_password.to_string(),
    };
    api.patch_json_empty(&["reset-password", reset_token], &request)
        .await
}

/// Entry point of the Google OAuth handoff; the browser is sent here.
#[must_use]
pub fn google_auth_url(api: &ApiClient) -> String {
    api.config().endpoint("/auth/google")
}
