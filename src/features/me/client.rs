//! Client helpers for current-user endpoints.

use super::types::{
    MessageResponse, SendConfirmationRequest, UpdateNameRequest, UpdatePasswordRequest,
    UpdatedUserResponse,
};
use crate::{
    app_lib::{ApiClient, AppError},
    features::auth::{
        store::SessionStore,
        types::{User, UserId},
    },
};
use tracing::instrument;

/// Renames the user and returns the updated record.
#[instrument(skip(api, sessions, updated_name))]
pub async fn update_name(
    api: &ApiClient,
    sessions: &SessionStore,
    user_id: UserId,
    updated_name: &str,
) -> Result<User, AppError> {
    let token = sessions.bearer()?;
    let request = UpdateNameRequest {
        updated_name: updated_name.to_string(),
    };
    let id = user_id.to_string();
    let response: UpdatedUserResponse = api
        .patch_json_with_bearer(&["update-name", id.as_str()], &request, &token)
        .await?;
    Ok(response.updated_user)
}

/// Asks the server to email a confirmation link to the new address.
#[instrument(skip(api, sessions, email, password))]
pub async fn send_confirmation_email(
    api: &ApiClient,
    sessions: &SessionStore,
    user_id: UserId,
    email: &str,
    password: &str,
) -> Result<MessageResponse, AppError> {
    let token = sessions.bearer()?;
    let request = SendConfirmationRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let id = user_id.to_string();
    api.post_json_with_bearer(&["send-confirmation-email", id.as_str()], &request, &token)
        .await
}

/// Applies the email change behind a confirmation token.
#[instrument(skip_all)]
pub async fn update_email(
    api: &ApiClient,
    sessions: &SessionStore,
    confirmation_token: &str,
) -> Result<User, AppError> {
    let token = sessions.bearer()?;
    let response: UpdatedUserResponse = api
        .patch_empty_with_bearer(&["update-email", confirmation_token], &token)
        .await?;
    Ok(response.updated_user)
}

#[instrument(skip(api, sessions, request))]
pub async fn update_password(
    api: &ApiClient,
    sessions: &SessionStore,
    user_id: UserId,
    request: &UpdatePasswordRequest,
) -> Result<MessageResponse, AppError> {
    let token = sessions.bearer()?;
    let id = user_id.to_string();
    api.patch_json_with_bearer(&["update-password", id.as_str()], request, &token)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_lib::{AppConfig, MemoryStore, SharedStore},
        features::auth::types::Session,
    };
    use anyhow::{Result, bail};
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn signed_in(token: &str) -> Result<SessionStore> {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(store);
        sessions.save(&Session::new(
            User {
                id: Some(1),
                name: Some("A".to_string()),
                email: Some("a@b.com".to_string()),
            },
            token,
        ))?;
        Ok(sessions)
    }

    #[tokio::test]
    async fn bearer_is_read_before_each_call() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        for token in ["tok1", "tok2"] {
            Mock::given(method("PATCH"))
                .and(path("/update-name/1"))
                .and(header("authorization", format!("Bearer {token}").as_str()))
                .and(body_json(json!({ "updatedName": "B" })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "updatedUser": { "id": 1, "name": "B", "email": "a@b.com" }
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let api = ApiClient::new(AppConfig::new(Some(&server.uri()), None)?)?;
        let sessions = signed_in("tok1")?;
        let user = update_name(&api, &sessions, 1, "B").await?;
        assert_eq!(user.name.as_deref(), Some("B"));

        // a token rotated between calls is picked up by the next call
        let mut rotated = sessions.load()?.unwrap_or_default();
        rotated.access_token = Some("tok2".to_string());
        sessions.save(&rotated)?;
        update_name(&api, &sessions, 1, "B").await?;
        Ok(())
    }

    #[tokio::test]
    async fn missing_token_fails_without_request() -> Result<()> {
        let api = ApiClient::new(AppConfig::new(Some("http://127.0.0.1:9"), None)?)?;
        let store: SharedStore = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(store);

        match update_email(&api, &sessions, "ct").await {
            Err(AppError::Unauthorized { status: 401, .. }) => Ok(()),
            other => bail!("expected unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn field_errors_surface_from_confirmation_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send-confirmation-email/1"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "Validation error",
                "errors": { "password": "Wrong password" }
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(AppConfig::new(Some(&server.uri()), None)?)?;
        let sessions = signed_in("tok1")?;

        match send_confirmation_email(&api, &sessions, 1, "new@b.com", "bad").await {
            Err(AppError::Fields { errors, .. }) => {
                assert_eq!(errors.get("password").map(String::as_str), Some("Wrong password"));
                Ok(())
            }
            other => bail!("expected field errors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_password_returns_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/update-password/1"))
            .and(header("authorization", "Bearer tok1"))
            .and(body_json(json!({
                "oldPassword": "secret1",
                "newPassword": "secret2",
                "confirmation": "secret2"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "Password updated" })),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(AppConfig::new(Some(&server.uri()), None)?)?;
        let sessions = signed_in("tok1")?;
        let request = UpdatePasswordRequest {
            old_password: "secret1".to_string(),
            new_password: "secret2".to_string(),
            confirmation: "secret2".to_string(),
        };
        let response = update_password(&api, &sessions, 1, &request).await?;
        assert_eq!(response.message, "Password updated");
        Ok(())
    }
}
