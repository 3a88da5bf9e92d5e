//! Batch ingestion and historical state tracking for offline energy meters.
//!
//! The pipeline fetches telemetry from heterogeneous vendor APIs, corrects
//! per-vendor quirks, classifies each device's staleness, and merges daily
//! snapshots into an append-only SQLite history that the rollup views read.

pub mod config;
pub mod db;
pub mod ingest;
pub mod models;
pub mod report;
pub mod rollup;
pub mod sources;

use anyhow::{Context, Result};
use log::{info, warn};

use config::Config;
use db::models::{AccessMetric, MonthlyAccess, NewUser};
use db::Database;
use models::{RunSummary, SourceReport};
use sources::{HttpSource, TelemetrySource};

const DELAYED_EXPORT_FILENAME: &str = "sensores_atrasados.csv";
const MONTH_KEY_FORMAT: &str = "%m/%Y";

/// One full sensor-ingestion batch: fetch, classify, export, persist.
///
/// Per-source and per-record failures are contained in the returned
/// summary; only a failure of the store itself aborts the run.
pub async fn run_ingestion(config: &Config, db: &Database) -> Result<RunSummary> {
    let client = HttpSource::shared_client().context("failed to build HTTP client")?;
    let adapters: Vec<Box<dyn TelemetrySource>> = config
        .sources
        .iter()
        .map(|source| {
            Box::new(HttpSource::new(client.clone(), source.clone())) as Box<dyn TelemetrySource>
        })
        .collect();

    let reference = config.reference_now();
    let outcome = ingest::collect(&adapters, reference, config.threshold_days).await;
    let mut summary = outcome.summary;

    let entries = outcome
        .records
        .iter()
        .map(|record| ingest::to_history_entry(record, reference))
        .collect();
    summary.rows_written = db.upsert_history(entries).await?;

    // Report artifacts are a hand-off, not part of the store: a failed
    // write is contained like any other per-run failure.
    let delayed = ingest::overdue_only(&outcome.records, config.min_report_days);
    let export_rows = report::delayed_report_rows(&delayed, reference);
    let export_path = config.report_dir.join(DELAYED_EXPORT_FILENAME);
    if let Err(err) = report::write_delayed_csv(&export_path, &export_rows) {
        warn!("delayed-sensors export failed: {err:#}");
    }

    let history = db.list_history_ordered().await?;
    if let Err(err) = report::write_monthly_report(&config.report_dir, &history, reference) {
        warn!("monthly history report failed: {err:#}");
    }

    info!(
        "ingestion done: {} records ({} delayed), {} rows upserted, {} sources failed",
        summary.total_records,
        export_rows.len(),
        summary.rows_written,
        summary.failed_sources(),
    );
    Ok(summary)
}

/// Ingest platform users and their monthly access counts.
///
/// Skipped entirely when the target month already has data (lazy refresh).
pub async fn run_access_ingestion(config: &Config, db: &Database) -> Result<RunSummary> {
    let reference = config.reference_now();
    let target_month = reference.format(MONTH_KEY_FORMAT).to_string();

    let mut summary = RunSummary::default();
    if db.month_has_data(&target_month).await? {
        info!("access data for {target_month} already present, skipping refresh");
        return Ok(summary);
    }

    let client = HttpSource::shared_client().context("failed to build HTTP client")?;
    for source_config in &config.sources {
        let name = source_config.source_name.clone();
        let adapter = HttpSource::new(client.clone(), source_config.clone());
        let mut report = SourceReport {
            source: name.clone(),
            fetched: 0,
            skipped_no_timestamp: 0,
            error: None,
        };

        match adapter.fetch_users().await {
            Ok(raw_users) => {
                report.fetched = raw_users.len();
                let users: Vec<NewUser> = raw_users
                    .into_iter()
                    .filter_map(|raw| {
                        let Some(email) = raw.email.filter(|e| !e.is_empty()) else {
                            warn!("{name}: user entry without email skipped");
                            return None;
                        };
                        Some(NewUser {
                            nome: raw.name.unwrap_or_default(),
                            email,
                            cliente_ativo: raw.active,
                            plataforma: name.clone(),
                        })
                    })
                    .collect();
                db.upsert_users(users).await?;
            }
            Err(err) => {
                warn!("{name}: user fetch failed: {err}");
                report.error = Some(err.to_string());
                summary.sources.push(report);
                continue;
            }
        }

        match adapter.fetch_access_metrics().await {
            Ok(raw_metrics) => {
                let metrics: Vec<AccessMetric> = raw_metrics
                    .into_iter()
                    .filter_map(|raw| {
                        let email = raw.email.filter(|e| !e.is_empty())?;
                        Some(AccessMetric {
                            email,
                            monthly: raw
                                .monthly
                                .into_iter()
                                .map(|m| MonthlyAccess {
                                    mes: m.month,
                                    acessos: m.access,
                                })
                                .collect(),
                        })
                    })
                    .collect();
                summary.unresolved_users += db
                    .upsert_access_metrics(metrics, reference.date_naive())
                    .await?;
            }
            Err(err) => {
                warn!("{name}: access metrics fetch failed: {err}");
                report.error = Some(err.to_string());
            }
        }

        summary.sources.push(report);
    }

    info!(
        "access ingestion done: {} sources, {} unresolved users",
        summary.sources.len(),
        summary.unresolved_users
    );
    Ok(summary)
}
