//! Sign-up page. Registration does not sign the user in; the server emails an
//! activation link that lands on the activation page.

use crate::{
    components::form::{EMAIL, Form, NAME, PASSWORD, SubmitError},
    features::auth::{
        AuthContext, client,
        types::{RegisterRequest, User},
    },
};
use tokio_util::sync::CancellationToken;

pub const CHECK_EMAIL_MESSAGE: &str =
    "Check your email! We have sent you an email with activation link";

/// # Errors
/// Returns the `SubmitError` produced by the form.
pub async fn submit(
    auth: &AuthContext,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<User, SubmitError> {
    let user = form
        .submit(auth.notifier(), cancel, |values| async move {
            let request = RegisterRequest {
                name: values.get(NAME).to_string(),
                email: values.get(EMAIL).to_string(),
                password: values.get(PASSWORD).to_string(),
            };
            client::register(auth.api(), &request).await
        })
        .await?;

    form.clear();
    auth.notifier().info(CHECK_EMAIL_MESSAGE);
    Ok(user)
}
