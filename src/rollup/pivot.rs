//! Per-user monthly access pivot.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::models::AccessRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotRow {
    pub user_id: i64,
    pub nome: String,
    pub email: String,
    pub plataforma: String,
    /// One count per month in the pivot's month set, 0 when absent.
    pub counts: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPivot {
    /// `MM/YYYY` keys in chronological order.
    pub months: Vec<String>,
    pub rows: Vec<PivotRow>,
}

fn parse_month_key(key: &str) -> Result<(i32, u32)> {
    let (month, year) = key
        .split_once('/')
        .with_context(|| format!("month key '{key}' is not MM/YYYY"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("month key '{key}' has a non-numeric month"))?;
    let year: i32 = year
        .parse()
        .with_context(|| format!("month key '{key}' has a non-numeric year"))?;
    if !(1..=12).contains(&month) {
        bail!("month key '{key}' is out of range");
    }
    Ok((year, month))
}

/// Inclusive chronological `MM/YYYY` sequence. The keys are ordered by
/// their parsed value, not lexicographically.
pub fn month_range(start: &str, end: &str) -> Result<Vec<String>> {
    let (mut year, mut month) = parse_month_key(start)?;
    let last = parse_month_key(end)?;

    let mut months = Vec::new();
    while (year, month) <= last {
        months.push(format!("{month:02}/{year}"));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    Ok(months)
}

/// Build the user × month access-count table, 0-filled, one row per user.
pub fn build_access_pivot(
    rows: &[AccessRow],
    start_month: &str,
    end_month: &str,
) -> Result<AccessPivot> {
    let months = month_range(start_month, end_month)?;

    let mut pivot_rows: Vec<PivotRow> = Vec::new();
    for row in rows {
        if !pivot_rows.iter().any(|p| p.user_id == row.user_id) {
            pivot_rows.push(PivotRow {
                user_id: row.user_id,
                nome: row.nome.clone(),
                email: row.email.clone(),
                plataforma: row.plataforma.clone(),
                counts: vec![0; months.len()],
            });
        }
    }

    for row in rows {
        let Some(index) = months.iter().position(|m| *m == row.mes) else {
            continue;
        };
        if let Some(pivot_row) = pivot_rows.iter_mut().find(|p| p.user_id == row.user_id) {
            pivot_row.counts[index] = row.acessos;
        }
    }

    Ok(AccessPivot {
        months,
        rows: pivot_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: i64, nome: &str, mes: &str, acessos: i64) -> AccessRow {
        AccessRow {
            user_id,
            nome: nome.into(),
            email: format!("{}@example.com", nome.to_lowercase()),
            plataforma: "Lyum".into(),
            mes: mes.into(),
            acessos,
        }
    }

    #[test]
    fn month_range_is_chronological_across_year_boundary() {
        let months = month_range("11/2024", "02/2025").unwrap();
        assert_eq!(months, vec!["11/2024", "12/2024", "01/2025", "02/2025"]);
    }

    #[test]
    fn month_range_rejects_bad_keys() {
        assert!(month_range("2024/11", "02/2025").is_err());
        assert!(month_range("13/2024", "02/2025").is_err());
        assert!(month_range("nov/2024", "02/2025").is_err());
    }

    #[test]
    fn absent_months_fill_with_zero_and_users_never_duplicate() {
        let rows = vec![
            row(1, "Ana", "11/2024", 5),
            row(1, "Ana", "01/2025", 3),
            row(2, "Bia", "12/2024", 8),
        ];
        let pivot = build_access_pivot(&rows, "11/2024", "01/2025").unwrap();

        assert_eq!(pivot.months.len(), 3);
        assert_eq!(pivot.rows.len(), 2);

        let ana = pivot.rows.iter().find(|r| r.nome == "Ana").unwrap();
        assert_eq!(ana.counts, vec![5, 0, 3]);
        let bia = pivot.rows.iter().find(|r| r.nome == "Bia").unwrap();
        assert_eq!(bia.counts, vec![0, 8, 0]);
    }

    #[test]
    fn months_outside_the_range_are_ignored() {
        let rows = vec![row(1, "Ana", "05/2020", 99), row(1, "Ana", "12/2024", 2)];
        let pivot = build_access_pivot(&rows, "11/2024", "12/2024").unwrap();
        assert_eq!(pivot.rows[0].counts, vec![0, 2]);
    }
}
