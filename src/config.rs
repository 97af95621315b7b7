use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::split::{SplitError, SplitRatios};
use crate::report::chart::{MAX_SIDE, MIN_SIDE};

pub const SEED_ENV: &str = "ARFF_SEED";
pub const PREVIEW_ROWS_ENV: &str = "ARFF_PREVIEW_ROWS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("environment variable {name}='{value}' is not a valid number")]
    Env { name: &'static str, value: String },
    #[error("preview_rows must be at least 1")]
    PreviewRows,
    #[error("chart size {0}x{1} is outside {min}..={max} pixels per side", min = MIN_SIDE, max = MAX_SIDE)]
    ChartSize(u32, u32),
    #[error(transparent)]
    Ratios(#[from] SplitError),
}

/// Pipeline settings. Every field has a default, so an empty JSON object
/// (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for every shuffle in the split.
    pub seed: u64,
    pub ratios: SplitRatios,
    /// Rows shown in the preview table; the split runs over these rows.
    pub preview_rows: usize,
    /// Column (matched case-insensitively) used for stratification and charts.
    pub stratify_column: String,
    /// Canonical chart order, applied only when `anchor_category` is present.
    pub preferred_order: Vec<String>,
    pub anchor_category: String,
    /// Chart sizes in pixels, `[width, height]`.
    pub thumb_size: [u32; 2],
    pub full_size: [u32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: 42,
            ratios: SplitRatios::default(),
            preview_rows: 1000,
            stratify_column: "protocol_type".to_string(),
            preferred_order: vec!["udp".into(), "tcp".into(), "icmp".into()],
            anchor_category: "tcp".to_string(),
            thumb_size: [900, 600],
            full_size: [2100, 1500],
        }
    }
}

impl Config {
    /// Load from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `ARFF_SEED` / `ARFF_PREVIEW_ROWS` using `lookup` to read them.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup(SEED_ENV) {
            self.seed = value.trim().parse().map_err(|_| ConfigError::Env {
                name: SEED_ENV,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(PREVIEW_ROWS_ENV) {
            self.preview_rows = value.trim().parse().map_err(|_| ConfigError::Env {
                name: PREVIEW_ROWS_ENV,
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ratios.validate()?;
        if self.preview_rows == 0 {
            return Err(ConfigError::PreviewRows);
        }
        for [width, height] in [self.thumb_size, self.full_size] {
            if ![width, height].iter().all(|side| (MIN_SIDE..=MAX_SIDE).contains(side)) {
                return Err(ConfigError::ChartSize(width, height));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_the_tool() {
        let config = Config::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.ratios, SplitRatios::default());
        assert_eq!(config.preview_rows, 1000);
        assert_eq!(config.stratify_column, "protocol_type");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 7, "ratios": {{"train": 0.8, "validation": 0.1, "test": 0.1}}}}"#).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.ratios.train, 0.8);
        assert_eq!(config.preview_rows, 1000);
    }

    #[test]
    fn invalid_json_is_reported_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_env(|name| match name {
                SEED_ENV => Some("99".into()),
                PREVIEW_ROWS_ENV => Some(" 10 ".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.preview_rows, 10);

        let err = config
            .apply_env(|name| (name == SEED_ENV).then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: SEED_ENV, .. }));
    }

    #[test]
    fn validation_rejects_bad_ratios_and_sizes() {
        let mut config = Config::default();
        config.ratios.test = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Ratios(_))));

        let mut config = Config::default();
        config.thumb_size = [0, 600];
        assert!(matches!(config.validate(), Err(ConfigError::ChartSize(0, 600))));
    }

    #[test]
    fn validation_caps_chart_sizes() {
        let mut config = Config::default();
        config.full_size = [100_000, 100_000];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ChartSize(100_000, 100_000))
        ));

        config.full_size = [MAX_SIDE, MAX_SIDE];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn oversized_chart_in_file_fails_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"thumb_size": [900, 60000]}}"#).unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ChartSize(900, 60000)));
    }
}
