//! Read-all of the ledger with a local cache-aside fallback.
//!
//! Every successful read overwrites a JSON cache file. When the store cannot
//! be read, a cache younger than its maximum age is served instead and the
//! snapshot says so. The cache never shadows a healthy store.

use crate::{
    config::settings::CacheSettings,
    core::{expense, product, sale, staff},
    entities::{ExpenseModel, ProductModel, SaleModel, StaffModel},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where a snapshot's data came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotSource {
    /// Read from the store just now
    #[default]
    Store,
    /// Served from the local cache because the store was unreachable
    Cache {
        /// When the cached copy was taken
        saved_at: DateTime<Utc>,
    },
}

/// All four ledger collections, read together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Staff in creation order
    pub staff: Vec<StaffModel>,
    /// Catalog by category and name
    pub products: Vec<ProductModel>,
    /// Sales by date and id
    pub sales: Vec<SaleModel>,
    /// Expenses by date and id
    pub expenses: Vec<ExpenseModel>,
    /// Origin of this data
    #[serde(skip)]
    pub source: SnapshotSource,
}

impl LedgerSnapshot {
    /// Whether this data came from the cache rather than the store.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self.source, SnapshotSource::Cache { .. })
    }

    /// Name of a staff member by id.
    #[must_use]
    pub fn staff_name(&self, staff_id: i64) -> Option<&str> {
        self.staff
            .iter()
            .find(|s| s.id == staff_id)
            .map(|s| s.name.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedSnapshot {
    saved_at: DateTime<Utc>,
    snapshot: LedgerSnapshot,
}

/// JSON file holding the last snapshot read from the store.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    max_age: Duration,
}

impl SnapshotCache {
    /// Cache at `path` that serves copies no older than `max_age`.
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    /// Builds the cache described by the config, or `None` when disabled.
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings.enabled.then(|| {
            let hours = i64::try_from(settings.max_age_hours).unwrap_or(i64::MAX);
            Self::new(
                &settings.path,
                Duration::try_hours(hours).unwrap_or(Duration::MAX),
            )
        })
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, snapshot: &LedgerSnapshot, saved_at: DateTime<Utc>) -> Result<()> {
        let cached = CachedSnapshot {
            saved_at,
            snapshot: snapshot.clone(),
        };
        let json = serde_json::to_vec(&cached)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        debug!("Snapshot cached at {}", self.path.display());
        Ok(())
    }

    /// Overwrites the cache with `snapshot`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        self.write(snapshot, Utc::now()).await
    }

    async fn read(&self) -> Result<Option<CachedSnapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn is_fresh(&self, saved_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(saved_at) <= self.max_age
    }
}

/// Reads all four collections from the store.
///
/// # Errors
/// Returns an error if any query fails.
pub async fn read_store(db: &DatabaseConnection) -> Result<LedgerSnapshot> {
    Ok(LedgerSnapshot {
        staff: staff::get_all_staff(db).await?,
        products: product::get_catalog(db).await?,
        sales: sale::get_all_sales(db).await?,
        expenses: expense::get_all_expenses(db).await?,
        source: SnapshotSource::Store,
    })
}

/// Reads the ledger, falling back to a fresh cached copy if the store fails.
///
/// # Errors
/// Returns the store error when there is no cache, or the cached copy is
/// missing, unreadable or older than its maximum age.
pub async fn load_snapshot(
    db: &DatabaseConnection,
    cache: Option<&SnapshotCache>,
) -> Result<LedgerSnapshot> {
    let store_error = match read_store(db).await {
        Ok(snapshot) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.save(&snapshot).await {
                    warn!("Failed to update snapshot cache: {e}");
                }
            }
            return Ok(snapshot);
        }
        Err(e) => e,
    };

    let Some(cache) = cache else {
        return Err(store_error);
    };
    match cache.read().await {
        Ok(Some(cached)) if cache.is_fresh(cached.saved_at, Utc::now()) => {
            warn!(
                "Store unavailable ({store_error}); serving snapshot cached at {}",
                cached.saved_at
            );
            Ok(LedgerSnapshot {
                source: SnapshotSource::Cache {
                    saved_at: cached.saved_at,
                },
                ..cached.snapshot
            })
        }
        Ok(Some(cached)) => {
            warn!(
                "Store unavailable and cached snapshot from {} is too old",
                cached.saved_at
            );
            Err(store_error)
        }
        Ok(None) => Err(store_error),
        Err(e) => {
            warn!("Store unavailable and snapshot cache is unreadable: {e}");
            Err(store_error)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::StaffRole, errors::Error, test_utils::*};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn offline_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("store offline".to_string())])
            .into_connection()
    }

    #[tokio::test]
    async fn test_store_read_refreshes_cache() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::hours(1));
        let db = setup_test_db().await?;
        create_test_staff(&db, "Kim", StaffRole::Senior).await?;

        let snapshot = load_snapshot(&db, Some(&cache)).await?;
        assert_eq!(snapshot.source, SnapshotSource::Store);
        assert!(!snapshot.is_stale());
        assert_eq!(snapshot.staff.len(), 1);
        assert!(cache.path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_fresh_cache_serves_when_store_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::hours(1));
        let db = setup_test_db().await?;
        let kim = create_test_staff(&db, "Kim", StaffRole::Senior).await?;
        load_snapshot(&db, Some(&cache)).await?;

        let snapshot = load_snapshot(&offline_db(), Some(&cache)).await?;
        assert!(snapshot.is_stale());
        assert_eq!(snapshot.staff_name(kim.id), Some("Kim"));
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_cache_is_refused() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::hours(1));
        cache
            .write(&LedgerSnapshot::default(), Utc::now() - Duration::days(2))
            .await?;

        let result = load_snapshot(&offline_db(), Some(&cache)).await;
        assert!(matches!(result, Err(Error::Database(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_store_error_without_cache() -> Result<()> {
        let result = load_snapshot(&offline_db(), None).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let dir = tempfile::tempdir()?;
        let missing = SnapshotCache::new(dir.path().join("never-written.json"), Duration::hours(1));
        let result = load_snapshot(&offline_db(), Some(&missing)).await;
        assert!(matches!(result, Err(Error::Database(_))));
        Ok(())
    }

    #[test]
    fn test_disabled_cache_setting() {
        let mut settings = CacheSettings::default();
        assert!(SnapshotCache::from_settings(&settings).is_some());
        settings.enabled = false;
        assert!(SnapshotCache::from_settings(&settings).is_none());
    }
}
