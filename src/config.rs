//! Layered settings: built-in defaults, an optional TOML file, then
//! `NOXWATCH_*` environment variables. CLI flags are applied on top by the
//! binary.
//!
//! ```toml
//! model_path = "models/nox_model.json"
//! history_window = 100
//!
//! [storage]
//! backend = "sqlite"      # or "memory"
//! path = "nox_data.db"
//!
//! [refresh]
//! interval = "3s"         # headless loop
//! tui_interval = "2s"     # terminal dashboard
//!
//! [thresholds]
//! policy = "three-tier"   # or "two-tier"
//! moderate = 40.0
//! unsafe = 80.0
//!
//! [log]
//! level = "info"
//! file = "noxwatch.log"
//! ```
//!
//! Nested keys map to environment variables with a double underscore, e.g.
//! `NOXWATCH_STORAGE__BACKEND=memory`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{PolicyKind, ThresholdPolicy, DEFAULT_HISTORY_WINDOW};
use crate::error::{NoxError, Result};

/// Which [`crate::HistoryStore`] to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: PathBuf::from("nox_data.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub interval: String,
    pub tui_interval: String,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: "3s".to_string(),
            tui_interval: "2s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub policy: PolicyKind,
    pub moderate: Option<f64>,
    #[serde(rename = "unsafe")]
    pub unsafe_at: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("noxwatch.log"),
        }
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model_path: PathBuf,
    pub history_window: usize,
    pub storage: StorageSettings,
    pub refresh: RefreshSettings,
    pub thresholds: ThresholdSettings,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/nox_model.json"),
            history_window: DEFAULT_HISTORY_WINDOW,
            storage: StorageSettings::default(),
            refresh: RefreshSettings::default(),
            thresholds: ThresholdSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the environment.
    ///
    /// With `required` false a missing file is skipped silently.
    pub fn load(path: Option<&Path>, required: bool) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(required));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("NOXWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| NoxError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check every derived value so bad settings fail at startup.
    pub fn validate(&self) -> Result<()> {
        if self.history_window == 0 {
            return Err(NoxError::Config("history_window must be at least 1".to_string()));
        }
        self.policy()?;
        self.refresh_interval()?;
        self.tui_interval()?;
        Ok(())
    }

    pub fn policy(&self) -> Result<ThresholdPolicy> {
        ThresholdPolicy::build(
            self.thresholds.policy,
            self.thresholds.moderate,
            self.thresholds.unsafe_at,
        )
    }

    /// Pause between ticks in headless mode.
    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_duration(&self.refresh.interval)
    }

    /// Refresh cadence of the terminal dashboard.
    pub fn tui_interval(&self) -> Result<Duration> {
        parse_duration(&self.refresh.tui_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let s = Settings::default();
        assert_eq!(s.history_window, 100);
        assert_eq!(s.storage.backend, StorageBackend::Sqlite);
        assert_eq!(s.storage.path, PathBuf::from("nox_data.db"));
        assert_eq!(s.refresh_interval().unwrap(), Duration::from_secs(3));
        assert_eq!(s.tui_interval().unwrap(), Duration::from_secs(2));
        assert_eq!(s.policy().unwrap(), ThresholdPolicy::three_tier());
    }

    #[test]
    fn missing_optional_file_uses_defaults() {
        let s = Settings::load(Some(Path::new("/nonexistent/noxwatch.toml")), false).unwrap();
        assert_eq!(s.model_path, PathBuf::from("models/nox_model.json"));
    }

    #[test]
    fn missing_required_file_fails() {
        assert!(Settings::load(Some(Path::new("/nonexistent/noxwatch.toml")), true).is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = toml_file(
            r#"
            model_path = "other.json"
            history_window = 20

            [storage]
            backend = "memory"

            [refresh]
            interval = "500ms"

            [thresholds]
            policy = "two-tier"
            unsafe = 150.0
            "#,
        );

        let s = Settings::load(Some(file.path()), true).unwrap();
        assert_eq!(s.model_path, PathBuf::from("other.json"));
        assert_eq!(s.history_window, 20);
        assert_eq!(s.storage.backend, StorageBackend::Memory);
        assert_eq!(s.storage.path, PathBuf::from("nox_data.db"));
        assert_eq!(s.refresh_interval().unwrap(), Duration::from_millis(500));
        assert_eq!(s.tui_interval().unwrap(), Duration::from_secs(2));
        assert_eq!(
            s.policy().unwrap(),
            ThresholdPolicy::TwoTier { unsafe_at: 150.0 }
        );
    }

    #[test]
    fn invalid_values_fail_at_load() {
        let bad_interval = toml_file("[refresh]\ninterval = \"often\"\n");
        assert!(matches!(
            Settings::load(Some(bad_interval.path()), true),
            Err(NoxError::Config(_))
        ));

        let bad_thresholds = toml_file("[thresholds]\nmoderate = 90.0\nunsafe = 80.0\n");
        assert!(Settings::load(Some(bad_thresholds.path()), true).is_err());

        let zero_window = toml_file("history_window = 0\n");
        assert!(Settings::load(Some(zero_window.path()), true).is_err());
    }
}
