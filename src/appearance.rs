use std::sync::Arc;

use crate::models::{ColorScheme, ThemePreference};
use crate::storage::{KeyValueStore, StoreError};

impl ThemePreference {
    /// Resolves `system` against the host's current scheme. Hosts that report no scheme get light.
    pub fn resolve(self, system: Option<ColorScheme>) -> ColorScheme {
        match self {
            ThemePreference::Light => ColorScheme::Light,
            ThemePreference::Dark => ColorScheme::Dark,
            ThemePreference::System => system.unwrap_or(ColorScheme::Light),
        }
    }

    pub fn is_dark(self, system: Option<ColorScheme>) -> bool {
        self.resolve(system) == ColorScheme::Dark
    }
}

/// Theme preference stored as a plain string under its own key.
pub struct AppearanceStore<S> {
    store: Arc<S>,
    key: String,
}

impl<S: KeyValueStore> AppearanceStore<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Missing or unrecognised values fall back to `system`.
    pub async fn load(&self) -> Result<ThemePreference, StoreError> {
        let raw = match self.store.get(&self.key).await? {
            Some(raw) => raw,
            None => return Ok(ThemePreference::default()),
        };
        match raw.parse::<ThemePreference>() {
            Ok(theme) => Ok(theme),
            Err(error) => {
                log::warn!("ignoring stored theme key={} error={error}", self.key);
                Ok(ThemePreference::default())
            }
        }
    }

    pub async fn load_or_default(&self) -> ThemePreference {
        self.load().await.unwrap_or_else(|error| {
            log::warn!("loading theme failed key={} error={error}", self.key);
            ThemePreference::default()
        })
    }

    pub async fn save(&self, theme: ThemePreference) -> Result<(), StoreError> {
        self.store.set(&self.key, theme.as_str().to_string()).await?;
        log::debug!("theme saved key={} theme={theme}", self.key);
        Ok(())
    }
}
