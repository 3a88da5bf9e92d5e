//! `historico_sensores` access.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{date_to_db, parse_date, parse_optional_date, parse_status},
    models::{HistoryEntry, HistoryRecord, MaintenanceFlag},
    Database,
};

const HISTORY_COLUMNS: &str = "id, data_registro, nome, email, descricao_sensor, \
     ultima_leitura, plataforma, status, tipo_medidor, manutencao";

fn row_to_record(row: &Row) -> Result<HistoryRecord> {
    let data_registro: String = row.get("data_registro")?;
    let ultima_leitura: Option<String> = row.get("ultima_leitura")?;
    let status: Option<String> = row.get("status")?;
    let manutencao: Option<String> = row.get("manutencao")?;

    Ok(HistoryRecord {
        id: row.get("id")?,
        entry: HistoryEntry {
            data_registro: parse_date(&data_registro, "data_registro")?,
            nome: row.get("nome")?,
            email: row.get("email")?,
            descricao_sensor: row.get("descricao_sensor")?,
            ultima_leitura: parse_optional_date(ultima_leitura, "ultima_leitura")?,
            plataforma: row.get::<_, Option<String>>("plataforma")?.unwrap_or_default(),
            status: parse_status(status.as_deref(), "status")?,
            tipo_medidor: row.get("tipo_medidor")?,
            manutencao: MaintenanceFlag::from_db(manutencao.as_deref()),
        },
    })
}

impl Database {
    /// Upsert one batch of day-facts in a single transaction.
    ///
    /// New `(data_registro, nome, descricao_sensor)` keys insert; existing
    /// keys update only `ultima_leitura`, `status` and `manutencao`. Email,
    /// plataforma and tipo_medidor keep whatever was first recorded for
    /// that day.
    pub async fn upsert_history(&self, entries: Vec<HistoryEntry>) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open history transaction")?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO historico_sensores (
                         data_registro, nome, descricao_sensor, email,
                         ultima_leitura, plataforma, tipo_medidor, status, manutencao
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(data_registro, nome, descricao_sensor) DO UPDATE
                     SET ultima_leitura = excluded.ultima_leitura,
                         status = excluded.status,
                         manutencao = excluded.manutencao",
                )?;

                for entry in &entries {
                    stmt.execute(params![
                        date_to_db(entry.data_registro),
                        entry.nome,
                        entry.descricao_sensor,
                        entry.email,
                        entry.ultima_leitura.map(date_to_db),
                        entry.plataforma,
                        entry.tipo_medidor,
                        entry.status.as_str(),
                        entry.manutencao.to_db(),
                    ])?;
                }
            }
            tx.commit().context("failed to commit history batch")?;
            Ok(entries.len())
        })
        .await
    }

    /// All rows registered inside `[start, end]`, for the rollup views.
    pub async fn history_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoryRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS}
                 FROM historico_sensores
                 WHERE data_registro BETWEEN ?1 AND ?2
                 ORDER BY descricao_sensor, data_registro",
            ))?;

            let mut rows = stmt.query(params![date_to_db(start), date_to_db(end)])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    /// Full history ordered by registration date, feeding the monthly
    /// report export.
    pub async fn list_history_ordered(&self) -> Result<Vec<HistoryRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS}
                 FROM historico_sensores
                 ORDER BY data_registro ASC",
            ))?;

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::models::{HistoryEntry, MaintenanceFlag};
    use crate::db::Database;
    use crate::models::DeviceStatus;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn open_db(dir: &TempDir) -> Database {
        Database::new(dir.path().join("test.db")).unwrap()
    }

    fn entry(status: DeviceStatus) -> HistoryEntry {
        HistoryEntry {
            data_registro: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            nome: "Ana".into(),
            email: "ana@example.com".into(),
            descricao_sensor: "M-001".into(),
            ultima_leitura: NaiveDate::from_ymd_opt(2025, 3, 9),
            plataforma: "Lyum".into(),
            status,
            tipo_medidor: Some("trifásico".into()),
            manutencao: MaintenanceFlag::No,
        }
    }

    #[tokio::test]
    async fn same_day_reruns_keep_one_row_and_last_status() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.upsert_history(vec![entry(DeviceStatus::On)]).await.unwrap();
        db.upsert_history(vec![entry(DeviceStatus::Off)]).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let rows = db.history_in_range(start, start).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.status, DeviceStatus::Off);
    }

    #[tokio::test]
    async fn conflict_merge_leaves_immutable_fields_untouched() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.upsert_history(vec![entry(DeviceStatus::On)]).await.unwrap();

        // Same natural key, different frozen-for-the-day fields.
        let mut second = entry(DeviceStatus::Off);
        second.email = "outra@example.com".into();
        second.plataforma = "LiteMe".into();
        second.tipo_medidor = Some("monofásico".into());
        second.ultima_leitura = NaiveDate::from_ymd_opt(2025, 3, 10);
        second.manutencao = MaintenanceFlag::Yes;
        db.upsert_history(vec![second]).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let rows = db.history_in_range(start, start).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0].entry;
        // Mutable set updated.
        assert_eq!(row.status, DeviceStatus::Off);
        assert_eq!(row.ultima_leitura, NaiveDate::from_ymd_opt(2025, 3, 10));
        assert_eq!(row.manutencao, MaintenanceFlag::Yes);
        // Frozen fields kept from the first write.
        assert_eq!(row.email, "ana@example.com");
        assert_eq!(row.plataforma, "Lyum");
        assert_eq!(row.tipo_medidor.as_deref(), Some("trifásico"));
    }

    #[tokio::test]
    async fn different_days_are_distinct_rows() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let mut day_two = entry(DeviceStatus::On);
        day_two.data_registro = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();

        db.upsert_history(vec![entry(DeviceStatus::On), day_two])
            .await
            .unwrap();

        let rows = db
            .history_in_range(
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn ordered_listing_sorts_by_registration_date() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        let mut later = entry(DeviceStatus::On);
        later.data_registro = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        db.upsert_history(vec![later, entry(DeviceStatus::On)])
            .await
            .unwrap();

        let rows = db.list_history_ordered().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].entry.data_registro < rows[1].entry.data_registro);
    }
}
