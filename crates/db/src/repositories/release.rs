//! Release repository.

use std::sync::Arc;

use crate::entities::{release, Release};
use encore_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Release repository for database operations.
#[derive(Clone)]
pub struct ReleaseRepository {
    db: Arc<DatabaseConnection>,
}

impl ReleaseRepository {
    /// Create a new release repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a release by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<release::Model>> {
        Release::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List known releases for an artist, most recent first.
    pub async fn find_by_artist(&self, artist_id: &str) -> AppResult<Vec<release::Model>> {
        Release::find()
            .filter(release::Column::ArtistId.eq(artist_id))
            .order_by_desc(release::Column::ReleasedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new release.
    pub async fn create(&self, model: release::ActiveModel) -> AppResult<release::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing release in place (corrected metadata).
    pub async fn update(&self, model: release::ActiveModel) -> AppResult<release::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::platform_link::Platform;
    use crate::entities::release::ReleaseType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_release(id: &str, artist_id: &str, native_id: &str) -> release::Model {
        release::Model {
            id: id.to_string(),
            artist_id: artist_id.to_string(),
            platform: Platform::Spotify,
            platform_release_id: native_id.to_string(),
            name: "Test Album".to_string(),
            release_type: ReleaseType::Album,
            released_at: Utc::now().into(),
            track_count: 10,
            popularity: Some(60),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_artist_found() {
        let release = create_test_release("r1", "a1", "spotify:album:1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[release.clone()]])
                .into_connection(),
        );

        let repo = ReleaseRepository::new(db);
        let result = repo.find_by_artist("a1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].platform_release_id, "spotify:album:1");
    }

    #[tokio::test]
    async fn test_find_by_artist_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<release::Model>::new()])
                .into_connection(),
        );

        let repo = ReleaseRepository::new(db);
        let result = repo.find_by_artist("a1").await.unwrap();

        assert!(result.is_empty());
    }
}
