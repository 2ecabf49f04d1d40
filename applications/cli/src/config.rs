//! Application configuration
//!
//! Loaded from an optional TOML file, then overridden by `CODER_MUSIC_*`
//! environment variables. Nested keys use a double underscore, e.g.
//! `CODER_MUSIC_PLAYER__VOLUME=70`.

use anyhow::{bail, Context, Result};
use coder_catalog::CatalogConfig;
use coder_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "coder-music.toml";

const ENV_PREFIX: &str = "CODER_MUSIC";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub player: PlayerConfig,
    pub catalog: CatalogConfig,
    /// Data API key; playback and search stay disabled without it
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from file and process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration, reading variables from `env` instead of the
    /// process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings =
                    settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings.build().context("Failed to read configuration")?;
        let mut app: Self = config.try_deserialize().context("Invalid configuration")?;

        // Blank keys count as absent
        if app.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            app.api_key = None;
        }
        Ok(app)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.player.sample_interval_ms == 0 {
            bail!("player.sample_interval_ms must be greater than zero");
        }
        if self.player.volume > 100 {
            bail!(
                "player.volume must be between 0 and 100 (got {})",
                self.player.volume
            );
        }
        if self.catalog.base_url.trim().is_empty() {
            bail!("catalog.base_url cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_without_sources() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.player.volume, 50);
        assert_eq!(config.player.sample_interval_ms, 1000);
        assert_eq!(config.catalog.max_results, 20);
        assert!(config.api_key.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn file_then_environment() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_key = \"from-file\"\n\n[player]\nvolume = 30\n\n[catalog]\nmax_results = 5"
        )
        .unwrap();

        let config = AppConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("CODER_MUSIC_API_KEY", "from-env"),
                ("CODER_MUSIC_PLAYER__SAMPLE_INTERVAL_MS", "250"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.player.volume, 30);
        assert_eq!(config.player.sample_interval_ms, 250);
        assert_eq!(config.catalog.max_results, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load_with_env(Some(Path::new("/nonexistent/coder.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn blank_key_is_absent() {
        let config =
            AppConfig::load_with_env(None, env(&[("CODER_MUSIC_API_KEY", "   ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.player.sample_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.player.volume = 150;
        assert!(config.validate().is_err());
    }
}
