//! Request and response types for auth-related API calls, plus the persisted
//! session shape. Request payloads carry passwords and tokens, so they must
//! never be logged.

use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// Identity fields of a user as known to the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// Overwrites the fields present in `patch`, keeping the others.
    pub fn merge(&mut self, patch: &User) {
        if patch.id.is_some() {
            self.id = patch.id;
        }
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
    }
}

/// Client-held session, persisted as `{"user": {...}, "accessToken": "..."}`.
///
/// The refresh credential is not part of it: the server keeps it in an
/// `HttpOnly` cookie that only the HTTP client's cookie jar sees.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token.into()),
        }
    }

    /// Name, email and access token must all be present; partial states are anonymous.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.name.is_some() && user.email.is_some())
            && self.access_token.is_some()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().and_then(|user| user.id)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.name.as_deref())
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.email.as_deref())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub old_access_token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}
