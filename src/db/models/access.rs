//! Access-metric rows, keyed by `(user_id, mes)` with `mes = "MM/YYYY"`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAccess {
    /// `MM/YYYY` month key.
    pub mes: String,
    pub acessos: i64,
}

/// Monthly access counts for one user, resolved by email at upsert time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessMetric {
    pub email: String,
    pub monthly: Vec<MonthlyAccess>,
}

/// One joined `historico_acesso` row with its user identity, as consumed
/// by the access pivot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRow {
    pub user_id: i64,
    pub nome: String,
    pub email: String,
    pub plataforma: String,
    pub mes: String,
    pub acessos: i64,
}
