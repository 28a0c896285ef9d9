//! # Client Repository
//!
//! Clients and their credit lines.
//!
//! Debt is only ever raised by the order engine when an order is validated.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use erp_core::validation::{validate_name, validate_price_cents};
use erp_core::Client;

/// Input for a new client.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub credit_limit_cents: i64,
    pub current_debt_cents: i64,
    pub is_vip: bool,
}

pub(crate) async fn fetch_client(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, email, phone, credit_limit_cents, current_debt_cents, is_vip
        FROM clients
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(client)
}

#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Inserts a client and returns it with its generated id.
    pub async fn insert(&self, new: &NewClient) -> DbResult<Client> {
        validate_name("name", &new.name)?;
        validate_price_cents("credit_limit", new.credit_limit_cents)?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            credit_limit_cents: new.credit_limit_cents,
            current_debt_cents: new.current_debt_cents,
            is_vip: new.is_vip,
        };

        debug!(id = %client.id, name = %client.name, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, name, email, phone, credit_limit_cents, current_debt_cents, is_vip)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.credit_limit_cents)
        .bind(client.current_debt_cents)
        .bind(client.is_vip)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        fetch_client(&mut conn, id).await
    }

    /// All clients ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, phone, credit_limit_cents, current_debt_cents, is_vip
            FROM clients
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let client = repo
            .insert(&NewClient {
                name: "Supermarché Score".to_string(),
                credit_limit_cents: 1_000_000,
                is_vip: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let loaded = repo.get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(loaded, client);
        assert!(loaded.is_vip);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_empty_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.clients().insert(&NewClient::default()).await.is_err());
        assert_eq!(db.clients().count().await.unwrap(), 0);
    }
}
