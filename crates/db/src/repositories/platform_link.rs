//! Platform link repository.

use std::sync::Arc;

use crate::entities::{platform_link, platform_link::Platform, PlatformLink};
use encore_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// Platform link repository for database operations.
#[derive(Clone)]
pub struct PlatformLinkRepository {
    db: Arc<DatabaseConnection>,
}

impl PlatformLinkRepository {
    /// Create a new platform link repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List platform links for an artist.
    pub async fn find_by_artist(&self, artist_id: &str) -> AppResult<Vec<platform_link::Model>> {
        PlatformLink::find()
            .filter(platform_link::Column::ArtistId.eq(artist_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the link between an artist and one platform.
    pub async fn find_by_artist_and_platform(
        &self,
        artist_id: &str,
        platform: Platform,
    ) -> AppResult<Option<platform_link::Model>> {
        PlatformLink::find()
            .filter(platform_link::Column::ArtistId.eq(artist_id))
            .filter(platform_link::Column::Platform.eq(platform))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new platform link.
    pub async fn create(
        &self,
        model: platform_link::ActiveModel,
    ) -> AppResult<platform_link::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the stats fetched from a platform.
    ///
    /// `followers`/`popularity` stay NULL when the platform did not report
    /// them; absence is preserved, never replaced by placeholder numbers.
    pub async fn save_stats(
        &self,
        link: platform_link::Model,
        followers: Option<i64>,
        popularity: Option<i32>,
    ) -> AppResult<platform_link::Model> {
        let mut active: platform_link::ActiveModel = link.into();
        active.followers = Set(followers);
        active.popularity = Set(popularity);
        active.fetched_at = Set(Some(chrono::Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_link(id: &str, artist_id: &str, platform: Platform) -> platform_link::Model {
        platform_link::Model {
            id: id.to_string(),
            artist_id: artist_id.to_string(),
            platform,
            platform_artist_id: format!("native-{id}"),
            followers: None,
            popularity: None,
            fetched_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_artist_and_platform_found() {
        let link = create_test_link("l1", "a1", Platform::Spotify);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[link.clone()]])
                .into_connection(),
        );

        let repo = PlatformLinkRepository::new(db);
        let result = repo
            .find_by_artist_and_platform("a1", Platform::Spotify)
            .await
            .unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().platform, Platform::Spotify);
    }
}
