//! Raw vendor item → canonical reading.

use chrono::{DateTime, Utc};

use crate::models::CanonicalReading;
use crate::sources::RawSensorItem;

/// Normalize one raw item. Missing optional fields become empty strings;
/// an item with no usable timestamp yields `None` and is excluded from
/// classification entirely (it is not a "never reported" entry).
pub fn normalize(item: &RawSensorItem, source_name: &str) -> Option<CanonicalReading> {
    let millis = item.last_measurement_timestamp.filter(|ts| *ts != 0)?;
    let last_measurement_at = DateTime::<Utc>::from_timestamp_millis(millis)?;

    let user = item.user.as_ref();
    let customer_name = user
        .and_then(|u| u.name.as_deref())
        .unwrap_or("")
        .to_string();
    let customer_email = user
        .and_then(|u| u.email.as_deref())
        .unwrap_or("")
        .to_string();
    let device_description = item
        .sensor
        .as_ref()
        .and_then(|s| s.description.as_deref())
        .unwrap_or("")
        .to_string();

    Some(CanonicalReading {
        source: source_name.to_string(),
        customer_name,
        customer_email,
        device_description,
        last_measurement_at,
        platform: source_name.to_string(),
    })
}
