//! Named per-vendor correction strategies.
//!
//! Vendors disagree on timestamp units and on how user names are shipped.
//! Each quirk is a named [`Correction`] and the registry maps source names
//! to the corrections they need; every other source passes through as-is.

use super::{RawSensorItem, RawUser};

const HOUR_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Timestamp arrives in seconds and represents UTC; convert to
    /// milliseconds and shift -3h to express local time.
    SecondsUtcMinusThreeHours,
    /// No `user.name`; rebuild it from `firstName` + `lastName`.
    ReconstructUserName,
}

const REGISTRY: &[(&str, &[Correction])] = &[
    ("Lyum", &[Correction::SecondsUtcMinusThreeHours]),
    ("LiteMe", &[Correction::ReconstructUserName]),
    ("LiteMe - UFCG", &[Correction::ReconstructUserName]),
];

pub fn corrections_for(source_name: &str) -> &'static [Correction] {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == source_name)
        .map(|(_, corrections)| *corrections)
        .unwrap_or(&[])
}

/// Apply every registered correction for `source_name` to a raw batch.
pub fn apply(source_name: &str, items: &mut [RawSensorItem]) {
    for correction in corrections_for(source_name) {
        for item in items.iter_mut() {
            apply_one(*correction, item);
        }
    }
}

fn apply_one(correction: Correction, item: &mut RawSensorItem) {
    match correction {
        Correction::SecondsUtcMinusThreeHours => {
            if let Some(ts) = item.last_measurement_timestamp {
                if ts != 0 {
                    item.last_measurement_timestamp = Some(ts * 1000 - 3 * HOUR_MS);
                }
            }
        }
        Correction::ReconstructUserName => {
            let user = item.user.get_or_insert_with(RawUser::default);
            let first = user.first_name.as_deref().unwrap_or("");
            let last = user.last_name.as_deref().unwrap_or("");
            user.name = Some(format!("{first} {last}").trim().to_string());
        }
    }
}
