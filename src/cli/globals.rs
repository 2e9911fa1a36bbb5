use crate::{
    app_lib::{ApiClient, AppConfig, FileStore, SharedStore, ThemeStore},
    components::notification::Notifier,
    features::auth::AuthContext,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Arguments shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    pub api_base_url: Option<String>,
    pub storage_path: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_base_url: Option<String>, storage_path: Option<String>) -> Self {
        Self {
            api_base_url,
            storage_path,
        }
    }

    /// # Errors
    /// Returns an error if the base URL is not a valid http(s) URL.
    pub fn config(&self) -> Result<AppConfig> {
        AppConfig::new(self.api_base_url.as_deref(), self.storage_path.as_deref())
            .context("invalid configuration")
    }

    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn store(&self) -> Result<SharedStore> {
        let config = self.config()?;
        debug!(path = %config.storage_path.display(), "using storage file");
        Ok(Arc::new(FileStore::new(config.storage_path)))
    }

    /// Builds the session context and restores the persisted session.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn context(&self) -> Result<AuthContext> {
        let config = self.config()?;
        let store: SharedStore = Arc::new(FileStore::new(config.storage_path.clone()));
        let api = ApiClient::new(config).context("failed to build HTTP client")?;

        let auth = AuthContext::new(api, store, Notifier::new());
        auth.restore();
        Ok(auth)
    }

    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn theme(&self) -> Result<ThemeStore> {
        Ok(ThemeStore::new(self.store()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(Some("https://auth.example.com".to_string()), None);
        assert_eq!(
            args.config().map(|config| config.endpoint("/users")).ok(),
            Some("https://auth.example.com/users".to_string())
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let args = GlobalArgs::new(Some("ftp://auth.example.com".to_string()), None);
        assert!(args.config().is_err());
    }

    #[tokio::test]
    async fn test_context_restores_from_storage_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storage.json");
        std::fs::write(
            &path,
            r#"{"AuthorizedUserData":"{\"user\":{\"id\":1,\"name\":\"A\",\"email\":\"a@b.com\"},\"accessToken\":\"tok1\"}"}"#,
        )?;

        let args = GlobalArgs::new(None, path.to_str().map(str::to_string));
        let auth = args.context()?;
        assert!(auth.is_authenticated());
        Ok(())
    }
}
