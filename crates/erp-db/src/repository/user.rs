//! # User Repository
//!
//! Operators referenced as actors. There is no authentication here; a user
//! row only gives an actor id a name.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;
use erp_core::validation::validate_name;
use erp_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn insert(&self, username: &str, role: &str) -> DbResult<User> {
        validate_name("username", username)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            role: role.to_string(),
        };

        sqlx::query("INSERT INTO users (id, username, role) VALUES (?1, ?2, ?3)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.role)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, role FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Returns the existing user with this name, creating it if needed.
    pub async fn get_or_create(&self, username: &str, role: &str) -> DbResult<User> {
        match self.get_by_username(username).await? {
            Some(user) => Ok(user),
            None => self.insert(username, role).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = db.users().get_or_create("admin", "admin").await.unwrap();
        let second = db.users().get_or_create("admin", "admin").await.unwrap();

        assert_eq!(first, second);
        assert!(db.users().get_by_username("nobody").await.unwrap().is_none());
    }
}
