//! Vendor telemetry sources.
//!
//! Each configured vendor endpoint is represented by one adapter. Adapters
//! fetch a raw batch and tag it with the source name; vendor-specific quirks
//! are handled by a small correction registry so adding a vendor never
//! touches shared code.

pub mod corrections;
mod error;
mod http;

pub use error::SourceError;
pub use http::HttpSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw user block as it appears in vendor payloads. Some vendors send a
/// ready-made `name`, others only `firstName`/`lastName`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSensor {
    #[serde(default)]
    pub description: Option<String>,
}

/// One item of a vendor's `{"data": [...]}` body, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSensorItem {
    #[serde(rename = "lastMeasurementTimestamp", default)]
    pub last_measurement_timestamp: Option<i64>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub sensor: Option<RawSensor>,
}

/// Item of a vendor's user-listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUserItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Per-user monthly access counts from a vendor's metrics endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAccessMetric {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "acessos_por_mes", default)]
    pub monthly: Vec<RawMonthlyAccess>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMonthlyAccess {
    /// `MM/YYYY` month key.
    pub month: String,
    pub access: i64,
}

/// A single vendor telemetry source.
///
/// A fetch either returns the vendor's full batch or a [`SourceError`];
/// the caller turns errors into an empty contribution so that one source
/// can never abort processing of the others.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the raw sensor batch, with vendor corrections already applied.
    async fn fetch_sensors(&self) -> Result<Vec<RawSensorItem>, SourceError>;
}
