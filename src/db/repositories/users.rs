//! `usuarios` access.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    models::{NewUser, User},
    Database,
};

fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get("id")?,
        nome: row.get("nome")?,
        email: row.get("email")?,
        cliente_ativo: row
            .get::<_, Option<bool>>("cliente_ativo")?
            .unwrap_or(false),
        plataforma: row.get::<_, Option<String>>("plataforma")?.unwrap_or_default(),
    })
}

impl Database {
    /// Insert users that are not yet known by `(email, plataforma)`.
    /// Existing rows are never touched here; `toggle_active` is the only
    /// mutation path for a stored user.
    pub async fn upsert_users(&self, users: Vec<NewUser>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open users transaction")?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO usuarios (nome, email, cliente_ativo, plataforma)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(email, plataforma) DO NOTHING",
                )?;
                for user in &users {
                    stmt.execute(params![
                        user.nome,
                        user.email,
                        user.cliente_ativo,
                        user.plataforma,
                    ])?;
                }
            }
            tx.commit().context("failed to commit users batch")?;
            Ok(())
        })
        .await
    }

    pub async fn toggle_active(&self, user_id: i64, active: bool) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE usuarios SET cliente_ativo = ?1 WHERE id = ?2",
                params![active, user_id],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("user {user_id} not found"));
            }
            Ok(())
        })
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, nome, email, cliente_ativo, plataforma
                 FROM usuarios
                 ORDER BY nome, plataforma",
            )?;

            let mut rows = stmt.query([])?;
            let mut users = Vec::new();
            while let Some(row) = rows.next()? {
                users.push(row_to_user(row)?);
            }
            Ok(users)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::models::NewUser;
    use crate::db::Database;
    use tempfile::TempDir;

    fn user(nome: &str, email: &str, plataforma: &str) -> NewUser {
        NewUser {
            nome: nome.into(),
            email: email.into(),
            cliente_ativo: true,
            plataforma: plataforma.into(),
        }
    }

    #[tokio::test]
    async fn reinsert_does_not_update_existing_user() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();

        db.upsert_users(vec![user("Ana", "ana@example.com", "Lyum")])
            .await
            .unwrap();
        db.upsert_users(vec![user("Ana Renomeada", "ana@example.com", "Lyum")])
            .await
            .unwrap();

        let users = db.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].nome, "Ana");
    }

    #[tokio::test]
    async fn same_email_on_other_platform_is_a_new_user() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();

        db.upsert_users(vec![
            user("Ana", "ana@example.com", "Lyum"),
            user("Ana", "ana@example.com", "LiteMe"),
        ])
        .await
        .unwrap();

        assert_eq!(db.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn toggle_active_flips_only_the_flag() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();

        db.upsert_users(vec![user("Ana", "ana@example.com", "Lyum")])
            .await
            .unwrap();
        let id = db.list_users().await.unwrap()[0].id;

        db.toggle_active(id, false).await.unwrap();
        let users = db.list_users().await.unwrap();
        assert!(!users[0].cliente_ativo);
        assert_eq!(users[0].nome, "Ana");
    }

    #[tokio::test]
    async fn toggle_active_unknown_user_errors() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        assert!(db.toggle_active(99, true).await.is_err());
    }
}
