//! Sign-in page. Validates the form locally, posts the credentials, and hands
//! the returned session to `AuthContext` before navigating home. The response
//! also sets the refresh cookie in the client's jar.

use super::Route;
use crate::{
    components::form::{EMAIL, Form, PASSWORD, SubmitError},
    features::auth::{
        AuthContext, client,
        types::{LoginRequest, Session},
    },
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Signs in with the values of a `Form::sign_in()` form.
///
/// On success the form and the notification slot are cleared and the user
/// lands on `/`.
///
/// # Errors
/// Returns the `SubmitError` produced by the form; failures are already
/// reported on the fields or in the notification slot.
pub async fn submit(
    auth: &AuthContext,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<Session, SubmitError> {
    let session = form
        .submit(auth.notifier(), cancel, |values| async move {
            let request = LoginRequest {
                email: values.get(EMAIL).to_string(),
                password: values.get(PASSWORD).to_string(),
            };
            let session = client::login(auth.api(), &request).await?;
            auth.set_session(session.clone())?;
            Ok(session)
        })
        .await?;

    form.clear();
    auth.notifier().clear();
    auth.navigator().navigate(Route::Home);

    info!("signed in");
    Ok(session)
}
