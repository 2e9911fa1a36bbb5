//! Forgot-password page: asks the server to email a reset link.

use crate::{
    components::form::{EMAIL, Form, SubmitError},
    features::auth::{AuthContext, client},
};
use tokio_util::sync::CancellationToken;

pub const RESET_LINK_SENT_MESSAGE: &str = "Confirmation has been sent!";

/// Server errors for `email` land on the email field.
///
/// # Errors
/// Returns the `SubmitError` produced by the form.
pub async fn submit(
    auth: &AuthContext,
    form: &mut Form,
    cancel: &CancellationToken,
) -> Result<(), SubmitError> {
    form.submit(auth.notifier(), cancel, |values| async move {
        client::forgot_password(auth.api(), values.get(EMAIL)).await
    })
    .await?;

    auth.notifier().info(RESET_LINK_SENT_MESSAGE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_lib::{ApiClient, AppConfig, MemoryStore, SharedStore},
        components::notification::{Notification, Notifier},
    };
    use anyhow::Result;
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn sends_reset_link_or_marks_email() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/forgot-password"))
            .and(body_json(json!({ "email": "a@b.com" })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/forgot-password"))
            .and(body_json(json!({ "email": "nobody@b.com" })))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not found",
                "errors": { "email": "User with this email does not exist" }
            })))
            .mount(&server)
            .await;

        let store: SharedStore = Arc::new(MemoryStore::new());
        let api = ApiClient::new(AppConfig::new(Some(&server.uri()), None)?)?;
        let auth = AuthContext::new(api, store, Notifier::new());
        let cancel = CancellationToken::new();

        let mut form = Form::forgot_password();
        form.set(EMAIL, "a@b.com");
        submit(&auth, &mut form, &cancel).await?;
        assert_eq!(
            auth.notifier().current(),
            Some(Notification::info(RESET_LINK_SENT_MESSAGE))
        );

        auth.notifier().clear();
        form.set(EMAIL, "nobody@b.com");
        assert!(submit(&auth, &mut form, &cancel).await.is_err());
        assert_eq!(
            form.error(EMAIL),
            Some("User with this email does not exist")
        );
        assert_eq!(auth.notifier().current(), None);
        Ok(())
    }
}
