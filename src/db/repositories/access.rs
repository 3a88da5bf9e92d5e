//! `historico_acesso` access.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::warn;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::date_to_db,
    models::{AccessMetric, AccessRow},
    Database,
};

fn row_to_access(row: &Row) -> Result<AccessRow> {
    Ok(AccessRow {
        user_id: row.get("user_id")?,
        nome: row.get("nome")?,
        email: row.get("email")?,
        plataforma: row.get::<_, Option<String>>("plataforma")?.unwrap_or_default(),
        mes: row.get::<_, Option<String>>("mes")?.unwrap_or_default(),
        acessos: row.get::<_, Option<i64>>("acessos")?.unwrap_or(0),
    })
}

impl Database {
    /// Store per-month access counts, resolving each metric's user by
    /// email. Unresolved emails are skipped and counted, never fatal.
    /// A month already present for a user gets its count replaced.
    pub async fn upsert_access_metrics(
        &self,
        metrics: Vec<AccessMetric>,
        data_registro: NaiveDate,
    ) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open access-metrics transaction")?;
            let mut unresolved = 0usize;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO historico_acesso (user_id, data_registro, acessos, mes)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(user_id, mes) DO UPDATE
                     SET acessos = excluded.acessos",
                )?;

                for metric in &metrics {
                    let user_id: Option<i64> = tx
                        .query_row(
                            "SELECT id FROM usuarios WHERE email = ?1",
                            params![metric.email],
                            |row| row.get(0),
                        )
                        .optional()?;

                    let Some(user_id) = user_id else {
                        warn!("access metric skipped, unknown user: {}", metric.email);
                        unresolved += 1;
                        continue;
                    };

                    for month in &metric.monthly {
                        insert.execute(params![
                            user_id,
                            date_to_db(data_registro),
                            month.acessos,
                            month.mes,
                        ])?;
                    }
                }
            }
            tx.commit().context("failed to commit access metrics")?;
            Ok(unresolved)
        })
        .await
    }

    /// Lazy-refresh check: does any access row exist for this `MM/YYYY`?
    pub async fn month_has_data(&self, mes: &str) -> Result<bool> {
        let mes = mes.to_string();
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(1) FROM historico_acesso WHERE mes = ?1",
                params![mes],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    /// All access rows joined with their user identity, for the pivot.
    pub async fn access_rows(&self) -> Result<Vec<AccessRow>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.user_id, u.nome, u.email, u.plataforma, a.mes, a.acessos
                 FROM historico_acesso a
                 JOIN usuarios u ON u.id = a.user_id
                 ORDER BY u.nome, a.mes",
            )?;

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_access(row)?);
            }
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::models::{AccessMetric, MonthlyAccess, NewUser};
    use crate::db::Database;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn metric(email: &str, mes: &str, acessos: i64) -> AccessMetric {
        AccessMetric {
            email: email.into(),
            monthly: vec![MonthlyAccess {
                mes: mes.into(),
                acessos,
            }],
        }
    }

    async fn db_with_user() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        db.upsert_users(vec![NewUser {
            nome: "Ana".into(),
            email: "ana@example.com".into(),
            cliente_ativo: true,
            plataforma: "Lyum".into(),
        }])
        .await
        .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn unknown_email_is_skipped_and_counted() {
        let (_dir, db) = db_with_user().await;
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let unresolved = db
            .upsert_access_metrics(
                vec![
                    metric("ana@example.com", "03/2025", 7),
                    metric("ninguem@example.com", "03/2025", 4),
                ],
                today,
            )
            .await
            .unwrap();

        assert_eq!(unresolved, 1);
        let rows = db.access_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].acessos, 7);
    }

    #[tokio::test]
    async fn reingesting_a_month_replaces_the_count() {
        let (_dir, db) = db_with_user().await;
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        db.upsert_access_metrics(vec![metric("ana@example.com", "03/2025", 7)], today)
            .await
            .unwrap();
        db.upsert_access_metrics(vec![metric("ana@example.com", "03/2025", 9)], today)
            .await
            .unwrap();

        let rows = db.access_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].acessos, 9);
    }

    #[tokio::test]
    async fn month_has_data_reports_existence() {
        let (_dir, db) = db_with_user().await;
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        assert!(!db.month_has_data("03/2025").await.unwrap());
        db.upsert_access_metrics(vec![metric("ana@example.com", "03/2025", 7)], today)
            .await
            .unwrap();
        assert!(db.month_has_data("03/2025").await.unwrap());
        assert!(!db.month_has_data("04/2025").await.unwrap());
    }
}
