//! Job lock repository.
//!
//! The storage-enforced exclusivity guard behind the update coordinator.
//! A key is acquired with a conditional insert, so the "at most one
//! in-flight job per trigger class" guarantee holds across server
//! instances and sessions, not just within one process.

use std::sync::Arc;

use crate::entities::{job_lock, JobLock};
use encore_common::{AppError, AppResult};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// Job lock repository for database operations.
#[derive(Clone)]
pub struct JobLockRepository {
    db: Arc<DatabaseConnection>,
}

impl JobLockRepository {
    /// Create a new job lock repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Try to acquire the lock for a trigger key.
    ///
    /// Returns `true` when this caller now holds the key, `false` when a
    /// job for the key is already in flight. Rows older than
    /// `stale_after_secs` are reclaimed first so a crashed holder cannot
    /// wedge the key forever.
    pub async fn try_acquire(&self, key: &str, stale_after_secs: i64) -> AppResult<bool> {
        let now = chrono::Utc::now();
        let stale_cutoff = now - chrono::Duration::seconds(stale_after_secs);

        JobLock::delete_many()
            .filter(job_lock::Column::Key.eq(key))
            .filter(job_lock::Column::LockedAt.lt(stale_cutoff))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = job_lock::ActiveModel {
            key: Set(key.to_string()),
            locked_at: Set(now.into()),
        };

        let inserted = JobLock::insert(model)
            .on_conflict(
                OnConflict::column(job_lock::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted == 1)
    }

    /// Release the lock for a trigger key.
    pub async fn release(&self, key: &str) -> AppResult<()> {
        JobLock::delete_many()
            .filter(job_lock::Column::Key.eq(key))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_try_acquire_free_key() {
        // stale delete matches nothing, insert lands
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0), exec(1)])
                .into_connection(),
        );

        let repo = JobLockRepository::new(db);
        assert!(repo.try_acquire("cleanup-expired", 600).await.unwrap());
    }

    #[tokio::test]
    async fn test_try_acquire_busy_key() {
        // stale delete matches nothing, insert hits the existing row
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0), exec(0)])
                .into_connection(),
        );

        let repo = JobLockRepository::new(db);
        assert!(!repo.try_acquire("cleanup-expired", 600).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0)])
                .into_connection(),
        );

        let repo = JobLockRepository::new(db);
        repo.release("cleanup-expired").await.unwrap();
        repo.release("cleanup-expired").await.unwrap();
    }
}
