//! Game repository.

use std::sync::Arc;

use crate::entities::{game, Game};
use encore_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

/// Game repository for database operations.
#[derive(Clone)]
pub struct GameRepository {
    db: Arc<DatabaseConnection>,
}

impl GameRepository {
    /// Create a new game repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a game by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<game::Model>> {
        Game::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List games followed by a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<game::Model>> {
        Game::find()
            .filter(game::Column::UserId.eq(user_id))
            .order_by_asc(game::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List games whose release date has arrived but were not yet notified.
    pub async fn find_released_unnotified(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<Vec<game::Model>> {
        Game::find()
            .filter(game::Column::Notified.eq(false))
            .filter(game::Column::ReleaseDate.lte(now))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new game.
    pub async fn create(&self, model: game::ActiveModel) -> AppResult<game::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record that the release notification for a game was created.
    pub async fn mark_notified(&self, game: game::Model) -> AppResult<game::Model> {
        let mut active: game::ActiveModel = game.into();
        active.notified = Set(true);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a game. Its notifications go with it via cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let game = self.find_by_id(id).await?;
        if let Some(g) = game {
            g.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
