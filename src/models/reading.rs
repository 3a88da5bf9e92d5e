//! Canonical telemetry types shared by ingestion and classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One device's latest-known telemetry snapshot, after vendor corrections.
///
/// Built fresh on every ingestion run from the raw vendor payload. Never
/// persisted directly; only data derived from it reaches the history store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReading {
    pub source: String,
    pub customer_name: String,
    pub customer_email: String,
    pub device_description: String,
    pub last_measurement_at: DateTime<Utc>,
    pub platform: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeviceStatus {
    On,
    Off,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::On => "ON",
            DeviceStatus::Off => "OFF",
        }
    }

    pub fn from_db(value: &str) -> Option<DeviceStatus> {
        match value {
            "ON" => Some(DeviceStatus::On),
            "OFF" => Some(DeviceStatus::Off),
            _ => None,
        }
    }
}

/// A [`CanonicalReading`] with its derived staleness fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StalenessRecord {
    pub reading: CanonicalReading,
    /// Whole days since the last reading, relative to the run's reference
    /// time. Never negative.
    pub days_offline: i64,
    pub status: DeviceStatus,
    /// Customer name + device description, used downstream only as a
    /// grouping convenience, not as an identifier.
    pub name_description: String,
}
