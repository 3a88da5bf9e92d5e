//! Daily ON/OFF aggregate counts for trend charts.
//!
//! This aggregate deliberately diverges from the row-level `status` field:
//! maintenance state overrides raw status here, and only here.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::{HistoryRecord, MaintenanceFlag};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyOnOff {
    pub date: NaiveDate,
    pub on: i64,
    pub off: i64,
}

/// Count ON vs OFF per registration date.
///
/// Rules, kept exactly as the historical reports compute them:
/// - maintenance flag `"False"` counts ON regardless of reading gap;
/// - any other explicit maintenance value counts ON when the gap between
///   `data_registro` and `ultima_leitura` is under 2 days, OFF when it is
///   over 1 day;
/// - rows with no maintenance value or no last reading contribute to
///   neither side. Dates without any contribution produce no point.
pub fn count_on_off_by_date(records: &[HistoryRecord]) -> Vec<DailyOnOff> {
    let mut by_date: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();

    for record in records {
        let entry = &record.entry;
        let contribution = match entry.manutencao {
            MaintenanceFlag::No => Some(true),
            MaintenanceFlag::Unknown => None,
            MaintenanceFlag::Yes => entry.ultima_leitura.map(|last| {
                (entry.data_registro - last).num_days() < 2
            }),
        };

        let Some(is_on) = contribution else {
            continue;
        };
        let counts = by_date.entry(entry.data_registro).or_insert((0, 0));
        if is_on {
            counts.0 += 1;
        } else {
            counts.1 += 1;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (on, off))| DailyOnOff { date, on, off })
        .collect()
}
