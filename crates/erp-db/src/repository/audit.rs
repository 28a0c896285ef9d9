//! # Audit Repository
//!
//! Append-only audit log. Rows are never updated or deleted.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use erp_core::{AuditAction, AuditEntry, NewAuditEntry};

/// Writes one audit row on an existing connection or transaction.
///
/// The order engine calls this inside its transaction so the entry commits
/// or rolls back with the change it describes.
pub(crate) async fn insert_entry(
    conn: &mut SqliteConnection,
    entry: &NewAuditEntry,
) -> DbResult<AuditEntry> {
    let row = AuditEntry {
        id: Uuid::new_v4().to_string(),
        action: entry.action,
        details: entry.details.clone(),
        user_id: entry.user_id.clone(),
        created_at: Utc::now(),
    };

    debug!(action = row.action.as_str(), "Writing audit entry");

    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, action, details, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&row.id)
    .bind(row.action)
    .bind(&row.details)
    .bind(&row.user_id)
    .bind(row.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(row)
}

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Writes one entry in its own implicit transaction.
    pub async fn record(&self, entry: &NewAuditEntry) -> DbResult<AuditEntry> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut conn, entry).await
    }

    /// Most recent entries first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, action, details, user_id, created_at
            FROM audit_logs
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries with one tag, oldest first.
    pub async fn list_by_action(&self, action: AuditAction) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, action, details, user_id, created_at
            FROM audit_logs
            WHERE action = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(action)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
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
    async fn test_record_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let audit = db.audit();

        audit
            .record(&NewAuditEntry::new(AuditAction::Seed, "first", None))
            .await
            .unwrap();
        audit
            .record(&NewAuditEntry::new(AuditAction::AlertStock, "second", Some("u-1")))
            .await
            .unwrap();

        assert_eq!(audit.count().await.unwrap(), 2);

        let recent = audit.list(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].details, "second");
        assert_eq!(recent[0].user_id.as_deref(), Some("u-1"));

        let alerts = audit.list_by_action(AuditAction::AlertStock).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].action, AuditAction::AlertStock);
    }
}
