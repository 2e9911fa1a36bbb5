//! Account ("my cabinet") actions for the signed-in user: rename, request an
//! email change, change password. Each reads the bearer token from the session
//! store right before its call.

use crate::{
    app_lib::AppError,
    components::form::{
        CONFIRMATION, EMAIL, Form, NAME, NEW_PASSWORD, OLD_PASSWORD, PASSWORD, SubmitError,
    },
    features::{
        auth::{AuthContext, types::User, types::UserId},
        me::{client, types::UpdatePasswordRequest},
    },
};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const NAME_UPDATED_MESSAGE: &str = "Your name has been updated";
pub const EMAIL_CONFIRMATION_SENT_MESSAGE: &str = "Check your new email to confirm the change";
pub const PASSWORD_UPDATED_MESSAGE: &str = "Your password has been updated";

fn signed_in_user(auth: &AuthContext) -> Result<UserId, AppError> {
    let session = auth.session();
    match session.user_id() {
        Some(user_id) if session.is_authenticated() => Ok(user_id),
        _ => Err(AppError::Unauthorized {
            status: 401,
            message: "You are not signed in".to_string(),
        }),
    }
}

/// Ends the session when the bearer call was rejected with 401; the session
/// expiry notice replaces whatever the form reported.
fn expire_on_unauthorized<T>(
    auth: &AuthContext,
    sent: Option<&str>,
    result: Result<T, SubmitError>,
) -> Result<T, SubmitError> {
    if let Err(SubmitError::Failed(err)) = &result {
        auth.on_unauthorized(sent, err);
    }
    result
}

/// Renames the user; memory and storage take the returned user.
///
/// # Errors
/// Returns the `SubmitError` produced by the form.
pub async fn change_name(
    auth: &AuthContext,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<User, SubmitError> {
    let sent = auth.session().access_token;
    let result = form
        .submit(auth.notifier(), cancel, |values| async move {
            let user_id = signed_in_user(auth)?;
            let user = client::update_name(auth.api(), auth.sessions(), user_id, values.get(NAME))
                .await?;
            auth.update_user(&user)?;
            Ok(user)
        })
        .await;
    let user = expire_on_unauthorized(auth, sent.as_deref(), result)?;

    form.clear();
    auth.notifier().info(NAME_UPDATED_MESSAGE);
    info!("name updated");
    Ok(user)
}

/// Sends a confirmation link to the new address; the email only changes once
/// the link is followed.
///
/// # Errors
/// Returns the `SubmitError` produced by the form.
pub async fn request_email_change(
    auth: &AuthContext,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<(), SubmitError> {
    let sent = auth.session().access_token;
    let result = form
        .submit(auth.notifier(), cancel, |values| async move {
            let user_id = signed_in_user(auth)?;
            client::send_confirmation_email(
                auth.api(),
                auth.sessions(),
                user_id,
                values.get(EMAIL),
                values.get(PASSWORD),
            )
            .await
        })
        .await;
    let response = expire_on_unauthorized(auth, sent.as_deref(), result)?;

    form.clear();
    let message = if response.message.is_empty() {
        EMAIL_CONFIRMATION_SENT_MESSAGE.to_string()
    } else {
        response.message
    };
    auth.notifier().info(message);
    Ok(())
}

/// # Errors
/// Returns the `SubmitError` produced by the form.
pub async fn change_password(
    auth: &AuthContext,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<(), SubmitError> {
    let sent = auth.session().access_token;
    let result = form
        .submit(auth.notifier(), cancel, |values| async move {
            let user_id = signed_in_user(auth)?;
            let request = UpdatePasswordRequest {
                old_password: values.get(OLD_PASSWORD).to_string(),
                new_password: values.get(NEW_PASSWORD).to_string(),
                confirmation: values.get(CONFIRMATION).to_string(),
            };
            client::update_password(auth.api(), auth.sessions(), user_id, &request).await
        })
        .await;
    let response = expire_on_unauthorized(auth, sent.as_deref(), result)?;

    form.clear();
    let message = if response.message.is_empty() {
        PASSWORD_UPDATED_MESSAGE.to_string()
    } else {
        response.message
    };
    auth.notifier().info(message);
    info!("password updated");
    Ok(())
}
