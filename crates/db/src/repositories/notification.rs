//! Notification repository.

use std::sync::Arc;

use crate::entities::{notification, notification::NotificationState, Notification};
use encore_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new notification.
    pub async fn create(
        &self,
        model: notification::ActiveModel,
    ) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get active notifications for a user, newest first.
    pub async fn find_active_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::State.eq(NotificationState::Active))
            .order_by_desc(notification::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get every active notification (for the false-positive sweep).
    pub async fn find_active(&self) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::State.eq(NotificationState::Active))
            .order_by_asc(notification::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Transition every active notification whose window has elapsed to
    /// `expired`. One statement, so a second run with no time advance
    /// matches zero rows and returns 0.
    pub async fn expire_due(&self, now: chrono::DateTime<chrono::Utc>) -> AppResult<u64> {
        let result = Notification::update_many()
            .filter(notification::Column::State.eq(NotificationState::Active))
            .filter(notification::Column::ExpiresAt.lte(now))
            .col_expr(
                notification::Column::State,
                Expr::value(NotificationState::Expired),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Retract a single notification. Only `active` rows transition;
    /// terminal states stay untouched.
    pub async fn retract(&self, n: notification::Model) -> AppResult<bool> {
        if n.state.is_terminal() {
            return Ok(false);
        }
        let mut active: notification::ActiveModel = n.into();
        active.state = Set(NotificationState::Retracted);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::notification::NotificationSubject;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_notification(id: &str, state: NotificationState) -> notification::Model {
        let now = Utc::now();
        notification::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            subject: NotificationSubject::ArtistRelease,
            artist_id: Some("a1".to_string()),
            game_id: None,
            release_id: Some("r1".to_string()),
            state,
            created_at: now.into(),
            expires_at: (now + Duration::days(7)).into(),
        }
    }

    #[tokio::test]
    async fn test_expire_due_reports_transition_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 3,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let now = Utc::now();

        // First sweep transitions three rows, the rerun matches none.
        assert_eq!(repo.expire_due(now).await.unwrap(), 3);
        assert_eq!(repo.expire_due(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_retract_skips_terminal_states() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = NotificationRepository::new(db);

        let expired = create_test_notification("n1", NotificationState::Expired);
        assert!(!repo.retract(expired).await.unwrap());

        let retracted = create_test_notification("n2", NotificationState::Retracted);
        assert!(!repo.retract(retracted).await.unwrap());
    }

    #[test]
    fn test_game_relation_resolves_to_join() {
        use crate::entities::Game;
        use sea_orm::QueryTrait;

        let sql = Notification::find()
            .find_also_related(Game)
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(sql.contains("\"game\""));
    }
}
