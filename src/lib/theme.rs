//! Light/dark preference persisted next to the session.

use super::{errors::AppError, storage::SharedStore};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Picks the value matching this theme.
    pub fn pick<T>(self, for_light: T, for_dark: T) -> T {
        match self {
            Theme::Light => for_light,
            Theme::Dark => for_dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.pick("light", "dark"))
    }
}

impl std::str::FromStr for Theme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(AppError::Config(format!("Unknown theme: {other}"))),
        }
    }
}

/// Reads and writes the `theme` key.
#[derive(Clone)]
pub struct ThemeStore {
    store: SharedStore,
}

impl ThemeStore {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Current theme; unreadable or unknown values fall back to light.
    #[must_use]
    pub fn load(&self) -> Theme {
        self.store
            .get(THEME_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// # Errors
    /// Returns `AppError::Storage` if the preference cannot be written.
    pub fn save(&self, theme: Theme) -> Result<(), AppError> {
        let raw = serde_json::to_string(&theme)
            .map_err(|err| AppError::Serialization(format!("Failed to encode theme: {err}")))?;
        self.store.set(THEME_KEY, &raw)
    }

    /// # Errors
    /// Returns `AppError::Storage` if the preference cannot be written.
    pub fn toggle(&self) -> Result<Theme, AppError> {
        let theme = self.load().toggled();
        self.save(theme)?;
        Ok(theme)
    }
}
