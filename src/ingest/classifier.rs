//! Staleness classification.

use chrono::{DateTime, Utc};

use crate::models::{CanonicalReading, DeviceStatus, StalenessRecord};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Derive days-offline and ON/OFF status for one reading.
///
/// `threshold_days` is the ON/OFF boundary: the device is OFF once
/// `days_offline` exceeds it. The separate "minimum days to report"
/// display cutoff is applied later by [`overdue_only`].
pub fn classify(
    reading: &CanonicalReading,
    reference_utc: DateTime<Utc>,
    threshold_days: i64,
) -> StalenessRecord {
    let elapsed_ms =
        reference_utc.timestamp_millis() - reading.last_measurement_at.timestamp_millis();
    let days_offline = (elapsed_ms.div_euclid(DAY_MS)).max(0);

    let status = if days_offline > threshold_days {
        DeviceStatus::Off
    } else {
        DeviceStatus::On
    };

    StalenessRecord {
        name_description: format!("{}{}", reading.customer_name, reading.device_description),
        reading: reading.clone(),
        days_offline,
        status,
    }
}

/// Keep only records at or past the reporting cutoff.
pub fn overdue_only(records: &[StalenessRecord], min_report_days: i64) -> Vec<StalenessRecord> {
    records
        .iter()
        .filter(|r| r.days_offline >= min_report_days)
        .cloned()
        .collect()
}
