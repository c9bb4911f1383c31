use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::error::BrowseError;

pub const DEFAULT_CONFIG_FILE: &str = "browse.toml";
const TITLE_PLACEHOLDER: &str = "{title}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowseSettings {
    pub refresh_delay_ms: u64,
    pub analytics_category: String,
    pub analytics_content_type: String,
    pub confirmation_generic: String,
    pub confirmation_with_title: String,
    pub database_url: String,
}

impl Default for BrowseSettings {
    fn default() -> Self {
        Self {
            refresh_delay_ms: 300,
            analytics_category: "artwork".into(),
            analytics_content_type: "browse".into(),
            confirmation_generic: "Artwork set as wallpaper".into(),
            confirmation_with_title: "Set \u{201c}{title}\u{201d} as wallpaper".into(),
            database_url: "sqlite://./data/browse.db".into(),
        }
    }
}

impl BrowseSettings {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Confirmation shown after an artwork became active. A blank title picks
    /// the generic text; any other title is embedded as given.
    pub fn confirmation_for(&self, title: Option<&str>) -> String {
        match title.filter(|title| !title.trim().is_empty()) {
            Some(title) => self.confirmation_with_title.replace(TITLE_PLACEHOLDER, title),
            None => self.confirmation_generic.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), BrowseError> {
        if !self.confirmation_with_title.contains(TITLE_PLACEHOLDER) {
            return Err(BrowseError::Config(format!(
                "confirmation_with_title must contain '{TITLE_PLACEHOLDER}'"
            )));
        }
        if self.analytics_category.trim().is_empty()
            || self.analytics_content_type.trim().is_empty()
        {
            return Err(BrowseError::Config(
                "analytics tags must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Defaults, then `browse.toml` in the working directory, then environment.
pub fn load_settings() -> BrowseSettings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Settings from a file the user named explicitly: a missing or malformed
/// file is an error rather than a silent fallback to defaults.
pub fn try_load_settings_from(path: &Path) -> Result<BrowseSettings, BrowseError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        BrowseError::Config(format!("cannot read '{}': {err}", path.display()))
    })?;
    let mut settings = parse_settings(&raw)
        .map_err(|err| BrowseError::Config(format!("'{}': {err}", path.display())))?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn load_settings_from(path: &Path) -> BrowseSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "config: ignoring unreadable settings file");
            BrowseSettings::default()
        }),
        Err(_) => BrowseSettings::default(),
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn parse_settings(raw: &str) -> Result<BrowseSettings, BrowseError> {
    toml::from_str::<BrowseSettings>(raw).map_err(|err| BrowseError::Config(err.to_string()))
}

fn apply_env_overrides(settings: &mut BrowseSettings, var: impl Fn(&str) -> Option<String>) {
    for key in ["BROWSE_REFRESH_DELAY_MS", "APP__REFRESH_DELAY_MS"] {
        if let Some(v) = var(key) {
            match v.parse::<u64>() {
                Ok(parsed) => settings.refresh_delay_ms = parsed,
                Err(_) => warn!(key, value = %v, "config: ignoring non-numeric refresh delay"),
            }
        }
    }

    if let Some(v) = var("APP__ANALYTICS_CATEGORY") {
        settings.analytics_category = v;
    }
    if let Some(v) = var("APP__ANALYTICS_CONTENT_TYPE") {
        settings.analytics_content_type = v;
    }
    if let Some(v) = var("APP__CONFIRMATION_GENERIC") {
        settings.confirmation_generic = v;
    }
    if let Some(v) = var("APP__CONFIRMATION_WITH_TITLE") {
        settings.confirmation_with_title = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
