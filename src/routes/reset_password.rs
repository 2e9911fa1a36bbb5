//! Reset-password page, reached from the emailed reset link.

use crate::{
    app_lib::FieldErrors,
    components::form::{Form, PASSWORD, SubmitError, validate_required},
    features::auth::{AuthContext, client},
};
use tokio_util::sync::CancellationToken;

pub const PASSWORD_RESET_MESSAGE: &str = "Your password has been successfully reset!";

/// # Errors
/// Returns `SubmitError::Invalid` for an empty token without calling the
/// server; otherwise the `SubmitError` produced by the form.
pub async fn submit(
    auth: &AuthContext,
    reset_token: &str,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<(), SubmitError> {
    if let Some(error) = validate_required(reset_token) {
        return Err(SubmitError::Invalid(FieldErrors::from([(
            "token".to_string(),
            error.to_string(),
        )])));
    }

    form.submit(auth.notifier(), cancel, |values| async move {
        client::reset_password(auth.api(), reset_token, values.get(PASSWORD)).await
    })
    .await?;

    form.clear();
    auth.notifier().info(PASSWORD_RESET_MESSAGE);
    Ok(())
}
