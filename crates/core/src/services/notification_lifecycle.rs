//! Notification lifecycle service.
//!
//! Owns the notification state machine and the two sweep jobs:
//!
//! - `active -> expired` once the notification window has elapsed,
//! - `active -> retracted` when the condition that justified the alert no
//!   longer holds.
//!
//! Both sweeps are idempotent: a rerun with no new qualifying input
//! transitions nothing and reports 0. Terminal rows are never touched and
//! never deleted; retention is a storage concern outside this engine.

use chrono::{DateTime, Utc};
use encore_common::AppResult;
use encore_db::{
    entities::notification::{self, NotificationSubject},
    repositories::{ArtistRepository, GameRepository, NotificationRepository, ReleaseRepository},
};

/// Service running the notification sweeps.
#[derive(Clone)]
pub struct NotificationLifecycleService {
    notification_repo: NotificationRepository,
    artist_repo: ArtistRepository,
    game_repo: GameRepository,
    release_repo: ReleaseRepository,
}

impl NotificationLifecycleService {
    /// Create a new lifecycle service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        artist_repo: ArtistRepository,
        game_repo: GameRepository,
        release_repo: ReleaseRepository,
    ) -> Self {
        Self {
            notification_repo,
            artist_repo,
            game_repo,
            release_repo,
        }
    }

    /// Active notifications for a user, newest first.
    pub async fn active_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_active_for_user(user_id, limit)
            .await
    }

    /// Transition every active notification whose window has elapsed to
    /// `expired`. Returns the number of notifications transitioned.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let count = self.notification_repo.expire_due(now).await?;
        if count > 0 {
            tracing::info!(count, "Expired stale release notifications");
        }
        Ok(count)
    }

    /// Retract every active notification whose justifying condition no
    /// longer holds. Returns the number of notifications transitioned.
    ///
    /// Unlike the expiry sweep this re-reads current artist, game and
    /// release state, since the invalidating condition is external.
    pub async fn sweep_false_positives(&self) -> AppResult<u64> {
        let active = self.notification_repo.find_active().await?;

        let mut count = 0;
        for n in active {
            if self.is_still_valid(&n).await? {
                continue;
            }
            if self.notification_repo.retract(n).await? {
                count += 1;
            }
        }

        if count > 0 {
            tracing::info!(count, "Retracted false-positive notifications");
        }
        Ok(count)
    }

    /// Re-validate the condition that created a notification.
    async fn is_still_valid(&self, n: &notification::Model) -> AppResult<bool> {
        match n.subject {
            NotificationSubject::ArtistRelease => {
                let Some(artist_id) = n.artist_id.as_deref() else {
                    return Ok(false);
                };
                let Some(release_id) = n.release_id.as_deref() else {
                    return Ok(false);
                };
                if self.artist_repo.find_by_id(artist_id).await?.is_none() {
                    return Ok(false);
                }
                Ok(self.release_repo.find_by_id(release_id).await?.is_some())
            }
            NotificationSubject::GameRelease => {
                let Some(game_id) = n.game_id.as_deref() else {
                    return Ok(false);
                };
                Ok(self.game_repo.find_by_id(game_id).await?.is_some())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use encore_db::entities::{artist, notification::NotificationState, release};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> NotificationLifecycleService {
        NotificationLifecycleService::new(
            NotificationRepository::new(Arc::clone(&db)),
            ArtistRepository::new(Arc::clone(&db)),
            GameRepository::new(Arc::clone(&db)),
            ReleaseRepository::new(db),
        )
    }

    fn active_notification(id: &str) -> notification::Model {
        let now = Utc::now();
        notification::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            subject: NotificationSubject::ArtistRelease,
            artist_id: Some("a1".to_string()),
            game_id: None,
            release_id: Some("r1".to_string()),
            state: NotificationState::Active,
            created_at: now.into(),
            expires_at: (now + Duration::days(7)).into(),
        }
    }

    fn test_artist(id: &str) -> artist::Model {
        artist::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            name: "Artist".to_string(),
            total_followers: 0,
            average_popularity: None,
            last_release_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_sweep_expired_idempotent_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let svc = service(db);
        let now = Utc::now();

        assert_eq!(svc.sweep_expired(now).await.unwrap(), 2);
        // rerun with no time advance: zero additional transitions
        assert_eq!(svc.sweep_expired(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_false_positive_sweep_retracts_dangling_release() {
        let n = active_notification("n1");
        let mut retracted = n.clone();
        retracted.state = NotificationState::Retracted;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // active set
                .append_query_results([[n]])
                // artist still exists
                .append_query_results([[test_artist("a1")]])
                // release row is gone
                .append_query_results([Vec::<release::Model>::new()])
                // retract update returning
                .append_query_results([[retracted]])
                .into_connection(),
        );

        let svc = service(db);
        assert_eq!(svc.sweep_false_positives().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_false_positive_sweep_keeps_valid_notifications() {
        let n = active_notification("n1");
        let release = release::Model {
            id: "r1".to_string(),
            artist_id: "a1".to_string(),
            platform: encore_db::entities::platform_link::Platform::Spotify,
            platform_release_id: "native-1".to_string(),
            name: "Album".to_string(),
            release_type: encore_db::entities::release::ReleaseType::Album,
            released_at: Utc::now().into(),
            track_count: 8,
            popularity: None,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n]])
                .append_query_results([[test_artist("a1")]])
                .append_query_results([[release]])
                .into_connection(),
        );

        let svc = service(db);
        // everything still holds: zero transitions
        assert_eq!(svc.sweep_false_positives().await.unwrap(), 0);
    }
}
