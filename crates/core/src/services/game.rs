//! Game service.
//!
//! Followed games carry an announced release date instead of a platform
//! stats feed. The scan job walks games whose date has arrived and were
//! not yet notified, creates one active notification each and marks the
//! game, so a rescan never duplicates the alert.

use chrono::{DateTime, Duration, Utc};
use encore_common::{AppError, AppResult, IdGenerator};
use encore_db::{
    entities::{
        game,
        game::Storefront,
        notification,
        notification::{NotificationState, NotificationSubject},
    },
    repositories::{GameRepository, NotificationRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::update_coordinator::{keys, UpdateCoordinator};

/// Input for following a game.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowGameInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    pub storefront: Storefront,
    #[validate(length(min = 1, max = 256))]
    pub storefront_game_id: String,
    /// Announced release date, if the storefront lists one.
    pub release_date: Option<DateTime<Utc>>,
}

/// Service managing followed games.
#[derive(Clone)]
pub struct GameService {
    game_repo: GameRepository,
    notification_repo: NotificationRepository,
    coordinator: UpdateCoordinator,
    id_gen: IdGenerator,
    notification_ttl: Duration,
}

impl GameService {
    /// Create a new game service.
    #[must_use]
    pub fn new(
        game_repo: GameRepository,
        notification_repo: NotificationRepository,
        coordinator: UpdateCoordinator,
        notification_ttl_days: i64,
    ) -> Self {
        Self {
            game_repo,
            notification_repo,
            coordinator,
            id_gen: IdGenerator::new(),
            notification_ttl: Duration::days(notification_ttl_days),
        }
    }

    /// List the games a user follows.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<game::Model>> {
        self.game_repo.find_by_user(user_id).await
    }

    /// Follow a game.
    ///
    /// A game whose announced date is already in the past starts
    /// unnotified; the next scan picks it up.
    pub async fn follow(&self, user_id: &str, input: FollowGameInput) -> AppResult<game::Model> {
        input.validate()?;

        self.game_repo
            .create(game::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                name: Set(input.name),
                storefront: Set(input.storefront),
                storefront_game_id: Set(input.storefront_game_id),
                release_date: Set(input.release_date.map(Into::into)),
                notified: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Unfollow a game. Its notifications cascade away with it; the
    /// false-positive sweep retracts any already delivered.
    pub async fn unfollow(&self, user_id: &str, game_id: &str) -> AppResult<()> {
        let game = self
            .game_repo
            .find_by_id(game_id)
            .await?
            .ok_or_else(|| AppError::GameNotFound(game_id.to_string()))?;

        if game.user_id != user_id {
            return Err(AppError::Forbidden("Not the owner of this game".to_string()));
        }

        self.game_repo.delete(game_id).await
    }

    /// Scan for games whose announced release date has arrived and
    /// notify their followers. Returns the number of games notified.
    ///
    /// Runs under its own trigger key; a rescan with nothing new pending
    /// notifies nothing and reports 0.
    pub async fn scan_releases(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.coordinator
            .run_exclusive(keys::GAME_RELEASE_SCAN, async {
                let due = self.game_repo.find_released_unnotified(now).await?;

                let mut count = 0;
                for game in due {
                    self.notification_repo
                        .create(notification::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            user_id: Set(game.user_id.clone()),
                            subject: Set(NotificationSubject::GameRelease),
                            artist_id: Set(None),
                            game_id: Set(Some(game.id.clone())),
                            release_id: Set(None),
                            state: Set(NotificationState::Active),
                            created_at: Set(now.into()),
                            expires_at: Set((now + self.notification_ttl).into()),
                        })
                        .await?;
                    self.game_repo.mark_notified(game).await?;
                    count += 1;
                }

                if count > 0 {
                    tracing::info!(count, "Notified released games");
                }
                Ok(count)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_db::repositories::JobLockRepository;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> GameService {
        let coordinator = UpdateCoordinator::new(JobLockRepository::new(Arc::clone(&db)), 600);
        GameService::new(
            GameRepository::new(Arc::clone(&db)),
            NotificationRepository::new(db),
            coordinator,
            7,
        )
    }

    fn due_game(id: &str) -> game::Model {
        game::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            name: "Game".to_string(),
            storefront: Storefront::Steam,
            storefront_game_id: "440".to_string(),
            release_date: Some(Utc::now().into()),
            notified: false,
            created_at: Utc::now().into(),
        }
    }

    fn game_notification(game_id: &str) -> notification::Model {
        let now = Utc::now();
        notification::Model {
            id: "n1".to_string(),
            user_id: "u1".to_string(),
            subject: NotificationSubject::GameRelease,
            artist_id: None,
            game_id: Some(game_id.to_string()),
            release_id: None,
            state: NotificationState::Active,
            created_at: now.into(),
            expires_at: (now + Duration::days(7)).into(),
        }
    }

    #[tokio::test]
    async fn test_scan_notifies_due_game_once() {
        let game = due_game("g1");
        let mut notified = game.clone();
        notified.notified = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // lock: stale delete, acquire; release at the end
                .append_exec_results([exec(0), exec(1), exec(1)])
                // due games
                .append_query_results([[game]])
                // insert returning: the notification
                .append_query_results([[game_notification("g1")]])
                // update returning: the marked game
                .append_query_results([[notified]])
                .into_connection(),
        );

        let svc = service(db);
        assert_eq!(svc.scan_releases(Utc::now()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scan_with_nothing_due_reports_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0), exec(1), exec(1)])
                .append_query_results([Vec::<game::Model>::new()])
                .into_connection(),
        );

        let svc = service(db);
        assert_eq!(svc.scan_releases(Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unfollow_checks_ownership() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[game::Model {
                    user_id: "someone-else".to_string(),
                    ..due_game("g1")
                }]])
                .into_connection(),
        );

        let svc = service(db);
        let result = svc.unfollow("u1", "g1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
