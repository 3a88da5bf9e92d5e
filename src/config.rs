//! Run-time configuration.
//!
//! Everything a batch run needs is injected from a JSON settings file:
//! the vendor source list, the staleness thresholds, and the storage and
//! report paths. Nothing here is hard-coded per vendor.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One vendor endpoint entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub auth_token: String,
    pub source_name: String,
    /// Optional user-listing endpoint for the access-metrics ingestion.
    #[serde(default)]
    pub users_endpoint: Option<String>,
    /// Optional per-month access metrics endpoint.
    #[serde(default)]
    pub metrics_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: Vec<SourceConfig>,
    /// ON/OFF boundary: a device is OFF once `days_offline` exceeds this.
    #[serde(default)]
    pub threshold_days: i64,
    /// Display cutoff for the delayed-sensors report, independent of the
    /// ON/OFF boundary.
    #[serde(default = "default_min_report_days")]
    pub min_report_days: i64,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Reference "now" for staleness computation. Defaults to wall-clock
    /// UTC; injectable for testing and replays.
    #[serde(default)]
    pub reference_now: Option<DateTime<Utc>>,
}

fn default_min_report_days() -> i64 {
    2
}

fn default_db_path() -> PathBuf {
    PathBuf::from("database/medidores.db")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("relatorios")
}

impl Config {
    pub fn load(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn reference_now(&self) -> DateTime<Utc> {
        self.reference_now.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_sources_and_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sources": [
                    {{"endpoint": "https://api.example/sensors",
                      "auth_token": "t0",
                      "source_name": "Lyum"}}
                ],
                "threshold_days": 1
            }}"#
        )
        .unwrap();

        let config = Config::load(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].source_name, "Lyum");
        assert_eq!(config.threshold_days, 1);
        assert_eq!(config.min_report_days, 2);
        assert!(config.reference_now.is_none());
        assert!(config.sources[0].users_endpoint.is_none());
    }
}
