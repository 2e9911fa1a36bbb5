//! HTTP helpers for the JSON API with consistent timeouts and error handling.
//! Feature clients use these helpers to avoid duplicating request setup and to
//! map every failure onto the same `AppError` taxonomy. The helpers never store
//! tokens; bearer credentials are passed in per call, and the refresh cookie
//! lives only in the client's cookie jar.

use super::{
    config::AppConfig,
    errors::{AppError, FieldErrors},
};
use crate::APP_USER_AGENT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument};

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
}

impl ApiClient {
    /// Builds a client with a cookie jar, user agent and request timeout.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be initialized.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fetches JSON without credentials.
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AppError> {
        let response = self.send(self.request(Method::GET, segments)?).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .send(self.request(Method::POST, segments)?.json(body))
            .await?;
        handle_json_response(response).await
    }

    /// Posts JSON and ignores the response body.
    pub async fn post_json_empty<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<(), AppError> {
        let response = self
            .send(self.request(Method::POST, segments)?.json(body))
            .await?;
        handle_empty_response(response).await
    }

    /// Posts an empty body, relying on the cookie jar for credentials.
    pub async fn post_empty(&self, segments: &[&str]) -> Result<(), AppError> {
        let response = self.send(self.request(Method::POST, segments)?).await?;
        handle_empty_response(response).await
    }

    /// Patches JSON without credentials and ignores the response body.
    pub async fn patch_json_empty<B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), AppError> {
        let response = self
            .send(self.request(Method::PATCH, segments)?.json(body))
            .await?;
        handle_empty_response(response).await
    }

    /// Patches JSON with a bearer token and parses a JSON response.
    pub async fn patch_json_with_bearer<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .send(
                self.request(Method::PATCH, segments)?
                    .bearer_auth(token)
                    .json(body),
            )
            .await?;
        handle_json_response(response).await
    }

    /// Patches without a body, with a bearer token, and parses a JSON response.
    pub async fn patch_empty_with_bearer<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .send(self.request(Method::PATCH, segments)?.bearer_auth(token))
            .await?;
        handle_json_response(response).await
    }

    /// Posts JSON with a bearer token and parses a JSON response.
    pub async fn post_json_with_bearer<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .send(
                self.request(Method::POST, segments)?
                    .bearer_auth(token)
                    .json(body),
            )
            .await?;
        handle_json_response(response).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, AppError> {
        Ok(self
            .http
            .request(method, self.config.endpoint_with(segments)?))
    }

    #[instrument(skip_all)]
    async fn send(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let request = builder
            .build()
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))?;

        // paths may embed activation or reset tokens
        debug!(method = %request.method(), "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(map_request_error)?;

        debug!(status = response.status().as_u16(), "response received");

        Ok(response)
    }
}

/// Maps transport errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(error_from_response(response).await)
    }
}

/// Handles acknowledgement responses whose body is irrelevant.
async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify_error(status, &body)
}

/// Maps a failed response onto the tagged error type.
///
/// Error bodies look like `{"message": "...", "errors": {"email": "..."}}`; a
/// non-empty `errors` map makes the failure field-scoped unless the status is 401.
fn classify_error(status: StatusCode, body: &str) -> AppError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str)
        .map_or_else(|| sanitize_body(body), sanitize_body);

    let status_code = status.as_u16();

    if status == StatusCode::UNAUTHORIZED {
        return AppError::Unauthorized {
            status: status_code,
            message,
        };
    }

    let errors = parsed
        .as_ref()
        .and_then(|value| value.get("errors"))
        .map(field_errors)
        .unwrap_or_default();

    if status.is_client_error() && !errors.is_empty() {
        AppError::Fields {
            status: status_code,
            message,
            errors,
        }
    } else {
        AppError::Http {
            status: status_code,
            message,
        }
    }
}

fn field_errors(value: &Value) -> FieldErrors {
    let Some(object) = value.as_object() else {
        return FieldErrors::new();
    };

    object
        .iter()
        .filter_map(|(field, error)| {
            let message = match error {
                Value::String(text) => text.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            let message = sanitize_body(&message);
            Some((field.clone(), message))
        })
        .collect()
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
