//! Persisted device-history rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DeviceStatus;

/// Tri-state maintenance flag. Stored as TEXT: `"True"`, `"False"`, or
/// NULL when never reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MaintenanceFlag {
    Yes,
    No,
    Unknown,
}

impl MaintenanceFlag {
    pub fn to_db(self) -> Option<&'static str> {
        match self {
            MaintenanceFlag::Yes => Some("True"),
            MaintenanceFlag::No => Some("False"),
            MaintenanceFlag::Unknown => None,
        }
    }

    pub fn from_db(value: Option<&str>) -> MaintenanceFlag {
        match value {
            None => MaintenanceFlag::Unknown,
            Some("False") => MaintenanceFlag::No,
            Some(_) => MaintenanceFlag::Yes,
        }
    }
}

/// One day-granularity fact about a device, keyed by
/// `(data_registro, nome, descricao_sensor)`.
///
/// Re-upserting the same key updates only `ultima_leitura`, `status` and
/// `manutencao`; the remaining fields stay as first recorded for that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub data_registro: NaiveDate,
    pub nome: String,
    pub email: String,
    pub descricao_sensor: String,
    pub ultima_leitura: Option<NaiveDate>,
    pub plataforma: String,
    pub status: DeviceStatus,
    pub tipo_medidor: Option<String>,
    pub manutencao: MaintenanceFlag,
}

/// A [`HistoryEntry`] as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(flatten)]
    pub entry: HistoryEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintenance_flag_round_trip() {
        assert_eq!(MaintenanceFlag::from_db(None), MaintenanceFlag::Unknown);
        assert_eq!(MaintenanceFlag::from_db(Some("False")), MaintenanceFlag::No);
        assert_eq!(MaintenanceFlag::from_db(Some("True")), MaintenanceFlag::Yes);
        // Any other recorded text counts as "under maintenance".
        assert_eq!(
            MaintenanceFlag::from_db(Some("agendada")),
            MaintenanceFlag::Yes
        );
        assert_eq!(MaintenanceFlag::Unknown.to_db(), None);
        assert_eq!(MaintenanceFlag::No.to_db(), Some("False"));
    }
}
