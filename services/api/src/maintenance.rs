//! services/api/src/maintenance.rs
//!
//! One-shot repair of the secondary indexes on the `users` table.
//!
//! An earlier schema carried a unique `username_1` index that no longer matches
//! the data model and produced duplicate-key failures on registration. The repair
//! drops that index, then every remaining non-primary index on `users`. The
//! indexes the service actually needs are recreated by
//! [`DbAdapter::ensure_indexes`](crate::adapters::db::DbAdapter::ensure_indexes)
//! the next time the server starts.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};

/// The stale index dropped before the general sweep.
pub const LEGACY_INDEX: &str = "username_1";

/// The table whose indexes are repaired.
pub const USERS_TABLE: &str = "users";

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index {0} does not exist")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A secondary index as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IndexInfo {
    pub name: String,
    /// Set when the index backs a constraint, which must be dropped instead.
    pub constraint_name: Option<String>,
}

/// The catalog operations the repair needs.
#[async_trait]
pub trait IndexCatalog: Send + Sync {
    async fn drop_index(&self, table: &str, index: &IndexInfo) -> Result<(), IndexError>;

    /// Every index on `table` except the primary key.
    async fn list_secondary_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, IndexError>;
}

/// What a repair run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub legacy_dropped: bool,
    pub dropped: Vec<String>,
    /// Set when listing or dropping the secondary indexes failed part way.
    pub sweep_error: Option<String>,
}

/// Drops `LEGACY_INDEX` and then every secondary index on `users`.
///
/// Neither step is fatal: a missing legacy index is logged as a warning, and a
/// failure during the sweep is logged and recorded in the report.
pub async fn repair_user_indexes(catalog: &dyn IndexCatalog) -> RepairReport {
    let mut report = RepairReport::default();

    let legacy = IndexInfo {
        name: LEGACY_INDEX.to_string(),
        constraint_name: None,
    };
    match catalog.drop_index(USERS_TABLE, &legacy).await {
        Ok(()) => {
            info!("Successfully dropped {} index", LEGACY_INDEX);
            report.legacy_dropped = true;
        }
        Err(e) => warn!("Index might not exist: {}", e),
    }

    if let Err(e) = sweep(catalog, &mut report).await {
        warn!("Error checking indexes: {}", e);
        report.sweep_error = Some(e.to_string());
    }

    info!("Index cleanup completed successfully!");
    report
}

async fn sweep(catalog: &dyn IndexCatalog, report: &mut RepairReport) -> Result<(), IndexError> {
    let indexes = catalog.list_secondary_indexes(USERS_TABLE).await?;
    let names: Vec<&str> = indexes.iter().map(|i| i.name.as_str()).collect();
    info!("Current indexes: {:?}", names);

    for index in &indexes {
        catalog.drop_index(USERS_TABLE, index).await?;
        info!("Dropped index: {}", index.name);
        report.dropped.push(index.name.clone());
    }
    Ok(())
}

//=========================================================================================
// PostgreSQL Catalog
//=========================================================================================

/// `IndexCatalog` over the PostgreSQL system catalogs.
pub struct PgIndexCatalog {
    pool: PgPool,
}

impl PgIndexCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Quotes an SQL identifier.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[async_trait]
impl IndexCatalog for PgIndexCatalog {
    async fn drop_index(&self, table: &str, index: &IndexInfo) -> Result<(), IndexError> {
        let statement = match &index.constraint_name {
            Some(constraint) => format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                quote_ident(table),
                quote_ident(constraint)
            ),
            None => format!("DROP INDEX {}", quote_ident(&index.name)),
        };

        sqlx::query(&statement)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                // 42704: undefined_object
                sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("42704") => {
                    IndexError::NotFound(index.name.clone())
                }
                _ => IndexError::Database(e),
            })?;
        Ok(())
    }

    async fn list_secondary_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, IndexError> {
        let indexes = sqlx::query_as::<_, IndexInfo>(
            "SELECT i.relname::text AS name, c.conname::text AS constraint_name \
             FROM pg_index x \
             JOIN pg_class i ON i.oid = x.indexrelid \
             JOIN pg_class t ON t.oid = x.indrelid \
             LEFT JOIN pg_constraint c ON c.conindid = x.indexrelid AND c.conrelid = t.oid \
             WHERE t.relname = $1 AND NOT x.indisprimary \
             ORDER BY i.relname",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// An in-memory catalog; `fail_listing` simulates a broken sweep.
    #[derive(Default)]
    struct FakeCatalog {
        indexes: Mutex<Vec<IndexInfo>>,
        fail_listing: bool,
    }

    impl FakeCatalog {
        fn with(names: &[&str]) -> Self {
            let indexes = names
                .iter()
                .map(|n| IndexInfo {
                    name: n.to_string(),
                    constraint_name: None,
                })
                .collect();
            Self {
                indexes: Mutex::new(indexes),
                fail_listing: false,
            }
        }
    }

    #[async_trait]
    impl IndexCatalog for FakeCatalog {
        async fn drop_index(&self, _table: &str, index: &IndexInfo) -> Result<(), IndexError> {
            let mut indexes = self.indexes.lock().unwrap();
            let before = indexes.len();
            indexes.retain(|i| i.name != index.name);
            if indexes.len() == before {
                return Err(IndexError::NotFound(index.name.clone()));
            }
            Ok(())
        }

        async fn list_secondary_indexes(&self, _table: &str) -> Result<Vec<IndexInfo>, IndexError> {
            if self.fail_listing {
                return Err(IndexError::Database(sqlx::Error::PoolClosed));
            }
            Ok(self.indexes.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn test_missing_legacy_index_is_not_fatal() {
        let catalog = FakeCatalog::default();

        let report = repair_user_indexes(&catalog).await;

        assert!(!report.legacy_dropped);
        assert!(report.dropped.is_empty());
        assert!(report.sweep_error.is_none());
    }

    #[tokio::test]
    async fn test_drops_legacy_then_all_secondary_indexes() {
        let catalog = FakeCatalog::with(&[LEGACY_INDEX, "users_email_key", "email_1"]);

        let report = repair_user_indexes(&catalog).await;

        assert!(report.legacy_dropped);
        assert_eq!(report.dropped, vec!["users_email_key", "email_1"]);
        assert!(catalog.indexes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_failure_is_reported() {
        let catalog = FakeCatalog {
            fail_listing: true,
            ..FakeCatalog::default()
        };

        let report = repair_user_indexes(&catalog).await;

        assert!(report.sweep_error.is_some());
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
