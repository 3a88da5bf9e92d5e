//! The ingestion pipeline: fetch → normalize → classify.
//!
//! Sources run one after another and are isolated from each other: a
//! failing fetch contributes zero records plus an error note in the run
//! summary, and never aborts the batch.

pub mod classifier;
pub mod normalizer;

pub use classifier::{classify, overdue_only};
pub use normalizer::normalize;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::db::models::{HistoryEntry, MaintenanceFlag};
use crate::models::{RunSummary, SourceReport, StalenessRecord};
use crate::sources::TelemetrySource;

/// Everything a batch run produced before persistence.
pub struct IngestionOutcome {
    pub records: Vec<StalenessRecord>,
    pub summary: RunSummary,
}

/// Fetch all configured sources and classify every normalizable record.
pub async fn collect(
    sources: &[Box<dyn TelemetrySource>],
    reference_utc: DateTime<Utc>,
    threshold_days: i64,
) -> IngestionOutcome {
    let mut records = Vec::new();
    let mut summary = RunSummary::default();

    for source in sources {
        let name = source.name().to_string();
        let mut report = SourceReport {
            source: name.clone(),
            fetched: 0,
            skipped_no_timestamp: 0,
            error: None,
        };

        match source.fetch_sensors().await {
            Ok(items) => {
                report.fetched = items.len();
                for item in &items {
                    match normalize(item, &name) {
                        Some(reading) => {
                            records.push(classify(&reading, reference_utc, threshold_days));
                        }
                        None => report.skipped_no_timestamp += 1,
                    }
                }
                info!(
                    "{name}: {} items fetched, {} without timestamp",
                    report.fetched, report.skipped_no_timestamp
                );
            }
            Err(err) => {
                warn!("{name}: fetch failed: {err}");
                report.error = Some(err.to_string());
            }
        }

        summary.sources.push(report);
    }

    summary.total_records = records.len();
    IngestionOutcome { records, summary }
}

/// Turn one classified record into the day's history fact.
///
/// Meter type and maintenance state are not part of the vendor telemetry;
/// they stay unknown here and survive same-day re-upserts only through the
/// store's narrow merge rules.
pub fn to_history_entry(record: &StalenessRecord, reference_utc: DateTime<Utc>) -> HistoryEntry {
    HistoryEntry {
        data_registro: reference_utc.date_naive(),
        nome: record.reading.customer_name.clone(),
        email: record.reading.customer_email.clone(),
        descricao_sensor: record.reading.device_description.clone(),
        ultima_leitura: Some(record.reading.last_measurement_at.date_naive()),
        plataforma: record.reading.platform.clone(),
        status: record.status,
        tipo_medidor: None,
        manutencao: MaintenanceFlag::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::sources::{RawSensor, RawSensorItem, RawUser, SourceError};

    struct FixedSource {
        name: String,
        result: Result<Vec<RawSensorItem>, u16>,
    }

    #[async_trait]
    impl TelemetrySource for FixedSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_sensors(&self) -> Result<Vec<RawSensorItem>, SourceError> {
            match &self.result {
                Ok(items) => Ok(items.clone()),
                Err(status) => Err(SourceError::Status(*status)),
            }
        }
    }

    fn item(name: &str, device: &str, millis: Option<i64>) -> RawSensorItem {
        RawSensorItem {
            last_measurement_timestamp: millis,
            user: Some(RawUser {
                name: Some(name.into()),
                email: Some(format!("{}@example.com", name.to_lowercase())),
                ..Default::default()
            }),
            sensor: Some(RawSensor {
                description: Some(device.into()),
            }),
        }
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_the_others() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let ts = reference.timestamp_millis();
        let sources: Vec<Box<dyn TelemetrySource>> = vec![
            Box::new(FixedSource {
                name: "FonteA".into(),
                result: Ok(vec![item("Ana", "M-001", Some(ts))]),
            }),
            Box::new(FixedSource {
                name: "FonteB".into(),
                result: Err(500),
            }),
            Box::new(FixedSource {
                name: "FonteC".into(),
                result: Ok(vec![item("Bia", "M-002", Some(ts)), item("Caio", "M-003", Some(ts))]),
            }),
        ];

        let outcome = collect(&sources, reference, 0).await;
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.summary.failed_sources(), 1);
        assert_eq!(outcome.summary.sources[1].source, "FonteB");
        assert!(outcome.summary.sources[1].error.is_some());
        assert_eq!(outcome.summary.total_records, 3);
    }

    #[tokio::test]
    async fn records_without_timestamp_are_counted_not_classified() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let sources: Vec<Box<dyn TelemetrySource>> = vec![Box::new(FixedSource {
            name: "FonteA".into(),
            result: Ok(vec![
                item("Ana", "M-001", Some(reference.timestamp_millis())),
                item("Bia", "M-002", None),
            ]),
        })];

        let outcome = collect(&sources, reference, 0).await;
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.summary.skipped_records(), 1);
        assert_eq!(outcome.summary.sources[0].fetched, 2);
    }

    #[test]
    fn history_entry_carries_run_and_reading_dates() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let reading_ts = Utc.with_ymd_and_hms(2025, 3, 7, 8, 0, 0).unwrap();
        let raw = item("Ana", "M-001", Some(reading_ts.timestamp_millis()));
        let reading = normalize(&raw, "Lyum").unwrap();
        let record = classify(&reading, reference, 2);
        let entry = to_history_entry(&record, reference);

        assert_eq!(entry.data_registro, reference.date_naive());
        assert_eq!(entry.ultima_leitura, Some(reading_ts.date_naive()));
        assert_eq!(entry.manutencao, MaintenanceFlag::Unknown);
        assert!(entry.tipo_medidor.is_none());
        assert_eq!(entry.plataforma, "Lyum");
    }
}
