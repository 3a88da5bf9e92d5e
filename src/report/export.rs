//! Delayed-sensors tabular export.
//!
//! Column names and the `dd/mm/yyyy` date format are a compatibility
//! contract with downstream consumers and must not change.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::HistoryRecord;
use crate::models::StalenessRecord;

pub const EXPORT_HEADERS: [&str; 8] = [
    "DataAtual",
    "Nome+Descrição",
    "Nome",
    "Email",
    "DescriçãoSensor",
    "DataÚltimaLeitura",
    "Plataforma",
    "Dias off.",
];

const EXPORT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    pub data_atual: String,
    pub nome_descricao: String,
    pub nome: String,
    pub email: String,
    pub descricao_sensor: String,
    pub data_ultima_leitura: String,
    pub plataforma: String,
    pub dias_off: i64,
}

impl ExportRow {
    fn from_record(record: &StalenessRecord, reference_utc: DateTime<Utc>) -> Self {
        Self {
            data_atual: reference_utc.format(EXPORT_DATE_FORMAT).to_string(),
            nome_descricao: record.name_description.clone(),
            nome: record.reading.customer_name.clone(),
            email: record.reading.customer_email.clone(),
            descricao_sensor: record.reading.device_description.clone(),
            data_ultima_leitura: record
                .reading
                .last_measurement_at
                .format(EXPORT_DATE_FORMAT)
                .to_string(),
            plataforma: record.reading.platform.clone(),
            dias_off: record.days_offline,
        }
    }
}

pub fn delayed_report_rows(
    records: &[StalenessRecord],
    reference_utc: DateTime<Utc>,
) -> Vec<ExportRow> {
    records
        .iter()
        .map(|record| ExportRow::from_record(record, reference_utc))
        .collect()
}

/// Restrict rows to the given platforms (empty = all) and days-off window.
pub fn filter_rows(
    rows: &[ExportRow],
    platforms: &[String],
    dias_min: i64,
    dias_max: i64,
) -> Vec<ExportRow> {
    rows.iter()
        .filter(|row| {
            (platforms.is_empty() || platforms.iter().any(|p| *p == row.plataforma))
                && row.dias_off >= dias_min
                && row.dias_off <= dias_max
        })
        .cloned()
        .collect()
}

pub fn write_delayed_csv(path: &Path, rows: &[ExportRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        let fields: [String; 8] = [
            row.data_atual.clone(),
            row.nome_descricao.clone(),
            row.nome.clone(),
            row.email.clone(),
            row.descricao_sensor.clone(),
            row.data_ultima_leitura.clone(),
            row.plataforma.clone(),
            row.dias_off.to_string(),
        ];
        writer.write_record(&fields)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write export file {}", path.display()))
}

pub fn monthly_report_filename(reference_utc: DateTime<Utc>) -> String {
    format!(
        "historico_{}_{:02}.csv",
        reference_utc.year(),
        reference_utc.month()
    )
}

/// Ordered full-history dump, one file per run month.
pub fn write_monthly_report(
    dir: &Path,
    records: &[HistoryRecord],
    reference_utc: DateTime<Utc>,
) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;

    let path = dir.join(monthly_report_filename(reference_utc));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;

    writer.write_record([
        "id",
        "data_registro",
        "nome",
        "email",
        "descricao_sensor",
        "ultima_leitura",
        "plataforma",
        "status",
        "tipo_medidor",
        "manutencao",
    ])?;
    for record in records {
        let entry = &record.entry;
        let fields: [String; 10] = [
            record.id.to_string(),
            entry.data_registro.format("%Y-%m-%d").to_string(),
            entry.nome.clone(),
            entry.email.clone(),
            entry.descricao_sensor.clone(),
            entry
                .ultima_leitura
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            entry.plataforma.clone(),
            entry.status.as_str().to_string(),
            entry.tipo_medidor.clone().unwrap_or_default(),
            entry.manutencao.to_db().unwrap_or("").to_string(),
        ];
        writer.write_record(&fields)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write report file {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::classify;
    use crate::models::CanonicalReading;
    use chrono::TimeZone;

    fn record(days_back: i64, reference: DateTime<Utc>) -> StalenessRecord {
        let reading = CanonicalReading {
            source: "Lyum".into(),
            customer_name: "Ana".into(),
            customer_email: "ana@example.com".into(),
            device_description: "M-001".into(),
            last_measurement_at: reference - chrono::Duration::days(days_back),
            platform: "Lyum".into(),
        };
        classify(&reading, reference, 0)
    }

    #[test]
    fn export_row_uses_day_month_year_dates() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let rows = delayed_report_rows(&[record(3, reference)], reference);

        assert_eq!(rows[0].data_atual, "10/03/2025");
        assert_eq!(rows[0].data_ultima_leitura, "07/03/2025");
        assert_eq!(rows[0].nome_descricao, "AnaM-001");
        assert_eq!(rows[0].dias_off, 3);
    }

    #[test]
    fn csv_headers_match_the_compat_contract() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sensores_atrasados.csv");
        write_delayed_csv(&path, &delayed_report_rows(&[record(3, reference)], reference))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "DataAtual,Nome+Descrição,Nome,Email,DescriçãoSensor,DataÚltimaLeitura,Plataforma,Dias off."
        );
        assert!(contents.lines().nth(1).unwrap().starts_with("10/03/2025,AnaM-001,Ana,"));
    }

    #[test]
    fn filters_apply_platform_and_day_window() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let rows = delayed_report_rows(
            &[record(1, reference), record(3, reference), record(9, reference)],
            reference,
        );

        let filtered = filter_rows(&rows, &[], 2, 5);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].dias_off, 3);

        let none = filter_rows(&rows, &["LiteMe".to_string()], 0, 10);
        assert!(none.is_empty());
    }

    #[test]
    fn monthly_report_name_is_zero_padded() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(monthly_report_filename(reference), "historico_2025_03.csv");
    }
}
