use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rates::ECB_DAILY_URL;

pub(crate) const CONFIG_FILE: &str = "config.json";

/// User settings, stored as JSON in the platform config directory.
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// First day shown by history and statistics. One year ago when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) history_start: Option<NaiveDate>,
    /// Window, in months, of the statistics screen.
    pub(crate) stats_months: u32,
    pub(crate) rates_url: String,
    pub(crate) http_timeout_secs: u64,
    /// `tracing` filter used when `MONEYFLOW_LOG` is not set.
    pub(crate) log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_start: None,
            stats_months: 2,
            rates_url: ECB_DAILY_URL.into(),
            http_timeout_secs: 10,
            log_filter: "moneyflow=info".into(),
        }
    }
}

impl Config {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Configured first history day, unless it falls after `last`.
    pub(crate) fn history_start_until(&self, last: NaiveDate) -> Option<NaiveDate> {
        self.history_start.filter(|start| *start <= last)
    }

    /// First day of the statistics window ending `today`.
    pub(crate) fn stats_since(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.stats_months.max(1)))
            .unwrap_or(today)
    }

    pub(crate) fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

/// Platform directories for the database, logs and config file.
pub(crate) struct Paths {
    pub(crate) data_dir: PathBuf,
    pub(crate) config_file: PathBuf,
}

impl Paths {
    pub(crate) fn discover() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "moneyflow", "MoneyFlow")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self {
            data_dir,
            config_file: proj_dirs.config_dir().join(CONFIG_FILE),
        })
    }

    /// `MONEYFLOW_DB` when set, otherwise `moneyflow.db` in the data directory.
    pub(crate) fn database(&self) -> PathBuf {
        match std::env::var("MONEYFLOW_DB") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.data_dir.join("moneyflow.db"),
        }
    }

    pub(crate) fn log_file(&self) -> PathBuf {
        self.data_dir.join("moneyflow.log")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stats_months, 2);
        assert_eq!(config.rates_url, ECB_DAILY_URL);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"stats_months": 6, "history_start": "2023-04-01"}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.stats_months, 6);
        assert_eq!(config.history_start, Some(d("2023-04-01")));
        assert_eq!(config.http_timeout_secs, 10);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            stats_months: 3,
            log_filter: "moneyflow=debug".into(),
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_history_start_until() {
        assert_eq!(Config::default().history_start_until(d("2024-06-15")), None);
        let pinned = Config {
            history_start: Some(d("2024-01-01")),
            ..Config::default()
        };
        assert_eq!(pinned.history_start_until(d("2024-06-15")), Some(d("2024-01-01")));
        assert_eq!(pinned.history_start_until(d("2023-06-30")), None);
    }

    #[test]
    fn test_stats_since() {
        let config = Config::default();
        assert_eq!(config.stats_since(d("2024-03-31")), d("2024-01-31"));
    }
}
