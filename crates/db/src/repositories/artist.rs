//! Artist repository.

use std::sync::Arc;

use crate::entities::{artist, Artist};
use encore_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

/// Artist repository for database operations.
#[derive(Clone)]
pub struct ArtistRepository {
    db: Arc<DatabaseConnection>,
}

impl ArtistRepository {
    /// Create a new artist repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an artist by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<artist::Model>> {
        Artist::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every followed artist.
    pub async fn find_all(&self) -> AppResult<Vec<artist::Model>> {
        Artist::find()
            .order_by_asc(artist::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List artists followed by a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<artist::Model>> {
        Artist::find()
            .filter(artist::Column::UserId.eq(user_id))
            .order_by_asc(artist::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new artist.
    pub async fn create(&self, model: artist::ActiveModel) -> AppResult<artist::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist derived stats on an artist record.
    pub async fn save_stats(
        &self,
        artist: artist::Model,
        total_followers: i64,
        average_popularity: Option<f32>,
    ) -> AppResult<artist::Model> {
        let mut active: artist::ActiveModel = artist.into();
        active.total_followers = Set(total_followers);
        active.average_popularity = Set(average_popularity);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record the date of the most recent known release.
    pub async fn save_last_release_at(
        &self,
        artist: artist::Model,
        last_release_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<artist::Model> {
        let mut active: artist::ActiveModel = artist.into();
        active.last_release_at = Set(Some(last_release_at.into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an artist. Platform links, releases and notifications go
    /// with it via foreign-key cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let artist = self.find_by_id(id).await?;
        if let Some(a) = artist {
            a.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_artist(id: &str, user_id: &str) -> artist::Model {
        artist::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Test Artist".to_string(),
            total_followers: 0,
            average_popularity: None,
            last_release_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let artist = create_test_artist("a1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[artist.clone()]])
                .into_connection(),
        );

        let repo = ArtistRepository::new(db);
        let result = repo.find_by_id("a1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn test_find_by_user_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<artist::Model>::new()])
                .into_connection(),
        );

        let repo = ArtistRepository::new(db);
        let result = repo.find_by_user("u1").await.unwrap();

        assert!(result.is_empty());
    }
}
