//! Google OAuth handoff. The backend finishes the OAuth dance and redirects to
//! `/google-auth` with the session in the URL fragment; this module only reads it.

use super::types::{Session, User, UserId};
use crate::app_lib::AppError;
use url::form_urlencoded;

/// Session data carried by the OAuth redirect target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthCallback {
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub access_token: String,
}

impl OAuthCallback {
    #[must_use]
    pub fn into_session(self) -> Session {
        Session::new(
            User {
                id: self.id,
                name: Some(self.name),
                email: Some(self.email),
            },
            self.access_token,
        )
    }
}

/// Parses a redirect location (absolute URL or path) such as
/// `/google-auth#id=1&name=A&email=a%40b.com&accessToken=t`.
/// The fragment wins; the query is read only when there is no fragment.
///
/// # Errors
/// Returns `AppError::Parse` naming the missing parameters when `name`, `email`
/// or `accessToken` is absent or empty.
pub fn parse_callback(location: &str) -> Result<OAuthCallback, AppError> {
    let params = callback_params(location);

    let mut id = None;
    let mut name = None;
    let mut email = None;
    let mut access_token = None;

    for (key, value) in form_urlencoded::parse(params.as_bytes()) {
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "id" => id = value.parse::<UserId>().ok(),
            "name" => name = Some(value),
            "email" => email = Some(value),
            "accessToken" => access_token = Some(value),
            _ => {}
        }
    }

    match (name, email, access_token) {
        (Some(name), Some(email), Some(access_token)) => Ok(OAuthCallback {
            id,
            name,
            email,
            access_token,
        }),
        (name, email, access_token) => {
            let missing: Vec<&str> = [
                ("name", name.is_none()),
                ("email", email.is_none()),
                ("accessToken", access_token.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            Err(AppError::Parse(format!(
                "OAuth callback is missing {}",
                missing.join(", ")
            )))
        }
    }
}

fn callback_params(location: &str) -> &str {
    let (before_fragment, fragment) = match location.split_once('#') {
        Some((before, fragment)) => (before, Some(fragment)),
        None => (location, None),
    };

    match fragment {
        Some(fragment) if !fragment.is_empty() => fragment,
        _ => before_fragment
            .split_once('?')
            .map_or("", |(_, query)| query),
    }
}
