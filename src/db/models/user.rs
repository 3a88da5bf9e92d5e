//! Platform user rows.

use serde::{Deserialize, Serialize};

/// A user to insert. Ignored if `(email, plataforma)` already exists;
/// existing rows are only ever changed through `toggle_active`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub nome: String,
    pub email: String,
    pub cliente_ativo: bool,
    pub plataforma: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub cliente_ativo: bool,
    pub plataforma: String,
}
