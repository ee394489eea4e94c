//! Update coordinator.
//!
//! Guarantees at most one in-flight job per trigger key. The guard lives
//! in the `job_lock` table, so it holds across server instances and UI
//! sessions, not just within one process. A second trigger while a job is
//! outstanding is rejected immediately with `AlreadyRunning`, never
//! queued; the key is released when the job finishes, success or failure.

use std::future::Future;

use encore_common::{AppError, AppResult};
use encore_db::repositories::JobLockRepository;

/// Trigger keys used by the engine. Per-artist and global updates use
/// independent keys so they do not needlessly block each other.
pub mod keys {
    /// Update every followed artist.
    pub const ALL_ARTIST_STATS: &str = "all-artist-stats";
    /// Expiry cleanup sweep.
    pub const CLEANUP_EXPIRED: &str = "cleanup-expired";
    /// False-positive cleanup sweep.
    pub const CLEANUP_FALSE_POSITIVE: &str = "cleanup-false-positive";
    /// Game release scan.
    pub const GAME_RELEASE_SCAN: &str = "game-release-scan";

    /// Update a single artist.
    #[must_use]
    pub fn artist_stats(artist_id: &str) -> String {
        format!("artist-stats:{artist_id}")
    }

    /// Update every artist one user follows.
    #[must_use]
    pub fn user_stats(user_id: &str) -> String {
        format!("user-stats:{user_id}")
    }
}

/// Exclusivity guard for trigger jobs.
#[derive(Clone)]
pub struct UpdateCoordinator {
    lock_repo: JobLockRepository,
    stale_after_secs: i64,
}

impl UpdateCoordinator {
    /// Create a new coordinator.
    #[must_use]
    pub const fn new(lock_repo: JobLockRepository, stale_after_secs: i64) -> Self {
        Self {
            lock_repo,
            stale_after_secs,
        }
    }

    /// Run a job exclusively under a trigger key.
    ///
    /// The job's result or failure is propagated unchanged; the
    /// coordinator adds nothing beyond the exclusivity guarantee.
    pub async fn run_exclusive<T, F>(&self, key: &str, job: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        if !self
            .lock_repo
            .try_acquire(key, self.stale_after_secs)
            .await?
        {
            return Err(AppError::AlreadyRunning(key.to_string()));
        }

        let result = job.await;

        // The key must come free even when the job failed.
        if let Err(e) = self.lock_repo.release(key).await {
            tracing::warn!(key, error = %e, "Failed to release job lock");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn coordinator(results: Vec<MockExecResult>) -> UpdateCoordinator {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results(results)
                .into_connection(),
        );
        UpdateCoordinator::new(JobLockRepository::new(db), 600)
    }

    #[tokio::test]
    async fn test_job_result_propagated() {
        // stale delete, acquire, release
        let coordinator = coordinator(vec![exec(0), exec(1), exec(1)]);

        let result = coordinator
            .run_exclusive(keys::CLEANUP_EXPIRED, async { Ok(42_u64) })
            .await
            .unwrap();

        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_busy_key_rejected_without_running_job() {
        // stale delete, acquire hits the existing row
        let coordinator = coordinator(vec![exec(0), exec(0)]);

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let result = coordinator
            .run_exclusive(keys::CLEANUP_EXPIRED, async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(AppError::AlreadyRunning(_))));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_key_released_after_failure() {
        // stale delete, acquire, release (still runs on failure)
        let coordinator = coordinator(vec![exec(0), exec(1), exec(1)]);

        let result: AppResult<()> = coordinator
            .run_exclusive(keys::ALL_ARTIST_STATS, async {
                Err(AppError::ExternalService("spotify: timeout".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[test]
    fn test_scoped_keys_are_independent() {
        assert_ne!(keys::artist_stats("a1"), keys::ALL_ARTIST_STATS);
        assert_ne!(keys::artist_stats("a1"), keys::artist_stats("a2"));
        assert_ne!(keys::user_stats("u1"), keys::artist_stats("u1"));
    }
}
