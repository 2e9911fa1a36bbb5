//! Client configuration: API base URL, request timeout and the location of the
//! durable key-value store. Values come from CLI flags or environment variables;
//! blank values fall back to defaults. Configuration is public; do not store
//! secrets here.

use super::errors::AppError;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Backend used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
/// Default request timeout applied to all HTTP helpers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// File name of the JSON key-value store inside the config directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub storage_path: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    /// Builds a config from optional raw values, applying defaults for blanks.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the API base URL is not an absolute http(s) URL.
    pub fn new(api_base_url: Option<&str>, storage_path: Option<&str>) -> Result<Self, AppError> {
        let api_base_url = api_base_url
            .and_then(normalize_value)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&api_base_url)?;

        let storage_path = storage_path
            .and_then(normalize_value)
            .map_or_else(default_storage_path, PathBuf::from);

        Ok(Self {
            api_base_url,
            storage_path,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Builds an absolute URL for an API path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        build_url_with_base(self.api_base_url.as_str(), path)
    }

    /// Absolute URL for an API path given as raw segments. Each segment is
    /// percent-encoded, so a token holding `/`, `?` or `#` stays one segment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the base URL cannot carry a path.
    pub fn endpoint_with(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Config("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(value: &str) -> Result<Url, AppError> {
    let url = Url::parse(value)
        .map_err(|err| AppError::Config(format!("Invalid API base URL '{value}': {err}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::Config(format!(
            "Unsupported API base URL scheme: {scheme}"
        ))),
    }
}

/// `~/.config/cabinet/storage.json`, or the working directory when no config dir exists.
#[must_use]
pub fn default_storage_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")))
        .unwrap_or_default()
        .join(STORAGE_FILE_NAME)
}

/// Joins an explicit base URL and a path without doubling slashes.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
