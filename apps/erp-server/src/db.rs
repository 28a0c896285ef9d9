//! Store startup.
//!
//! The SQLite files may sit on a volume that is still being mounted when the
//! process starts, so opening a store is retried with exponential backoff.
//! Only infrastructure failures are retried; anything else (a migration that
//! does not apply, say) is reported straight away.

use std::time::Duration;

use backoff::ExponentialBackoff;
use tracing::{info, warn};

use erp_db::{Database, DbConfig, DbError};

/// Opens (and migrates) a store, retrying for up to `max_elapsed`.
pub async fn connect_with_retry(config: DbConfig, max_elapsed: Duration) -> Result<Database, DbError> {
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(250),
        max_interval: Duration::from_secs(5),
        multiplier: 2.0,
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    let schema = config.schema;
    let path = config.database_path.clone();

    let db = backoff::future::retry(policy, || {
        let config = config.clone();
        async move {
            Database::new(config).await.map_err(|e| {
                if e.is_infrastructure() {
                    warn!(error = %e, "Store not ready, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await?;

    info!(schema = schema.as_str(), path = %path.display(), "Store opened");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use erp_db::Schema;

    #[tokio::test]
    async fn test_opens_in_memory_store() {
        let db = connect_with_retry(DbConfig::in_memory().schema(Schema::Warehouse), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_gives_up_on_unusable_path() {
        let config = DbConfig::new("/nonexistent-dir/for/erp/test.db").connect_timeout(Duration::from_millis(200));
        let err = connect_with_retry(config, Duration::from_millis(300)).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
