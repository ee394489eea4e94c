//! Artist service.
//!
//! Orchestrates the canonical artist records: following across platforms,
//! refreshing per-platform stats through the gateway, merging them with
//! the aggregator and running release detection. Every scoped stats
//! update goes through the update coordinator so concurrent triggers for
//! the same scope are rejected instead of doubled.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use encore_common::{AppError, AppResult, IdGenerator};
use encore_db::{
    entities::{artist, platform_link, platform_link::Platform},
    repositories::{ArtistRepository, PlatformLinkRepository},
};
use futures::future::join_all;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::platform::PlatformGateway;
use crate::services::release_detector::ReleaseDetector;
use crate::services::stats_aggregator::{aggregate, PlatformStats};
use crate::services::update_coordinator::{keys, UpdateCoordinator};

/// Input for following an artist.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowArtistInput {
    pub platform: Platform,
    #[validate(length(min = 1, max = 256))]
    pub platform_artist_id: String,
    /// Display name override; defaults to the platform's name.
    #[validate(length(max = 256))]
    pub name: Option<String>,
}

/// Which artists a stats update covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScope {
    /// Every followed artist.
    All,
    /// One artist.
    Artist(String),
    /// Every artist one user follows.
    User(String),
}

impl UpdateScope {
    /// Trigger key for the exclusivity guard. Scopes use independent keys
    /// so a per-artist update does not block the global one.
    #[must_use]
    pub fn lock_key(&self) -> String {
        match self {
            Self::All => keys::ALL_ARTIST_STATS.to_string(),
            Self::Artist(id) => keys::artist_stats(id),
            Self::User(id) => keys::user_stats(id),
        }
    }
}

/// Outcome counts of one stats update job.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateSummary {
    pub updated_count: u64,
    pub failed_count: u64,
}

/// Service managing followed artists.
#[derive(Clone)]
pub struct ArtistService {
    artist_repo: ArtistRepository,
    link_repo: PlatformLinkRepository,
    gateway: Arc<dyn PlatformGateway>,
    detector: ReleaseDetector,
    coordinator: UpdateCoordinator,
    id_gen: IdGenerator,
    notification_ttl: Duration,
}

impl ArtistService {
    /// Create a new artist service.
    #[must_use]
    pub fn new(
        artist_repo: ArtistRepository,
        link_repo: PlatformLinkRepository,
        gateway: Arc<dyn PlatformGateway>,
        detector: ReleaseDetector,
        coordinator: UpdateCoordinator,
        notification_ttl_days: i64,
    ) -> Self {
        Self {
            artist_repo,
            link_repo,
            gateway,
            detector,
            coordinator,
            id_gen: IdGenerator::new(),
            notification_ttl: Duration::days(notification_ttl_days),
        }
    }

    /// List the artists a user follows.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<artist::Model>> {
        self.artist_repo.find_by_user(user_id).await
    }

    /// Search a platform for artists to follow.
    pub async fn search(
        &self,
        platform: Platform,
        query: &str,
    ) -> AppResult<Vec<crate::platform::PlatformArtistSummary>> {
        self.gateway.search_artists(platform, query).await
    }

    /// Follow an artist: create the canonical record from its first
    /// platform link.
    pub async fn follow(
        &self,
        user_id: &str,
        input: FollowArtistInput,
    ) -> AppResult<artist::Model> {
        input.validate()?;

        let detail = self
            .gateway
            .artist_details(input.platform, &input.platform_artist_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "artist {} not found on {}",
                    input.platform_artist_id,
                    input.platform.as_tag()
                ))
            })?;

        let now = Utc::now();
        let stats = aggregate(&[PlatformStats {
            followers: detail.followers,
            popularity: detail.popularity,
        }]);

        let created = self
            .artist_repo
            .create(artist::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                name: Set(input.name.unwrap_or_else(|| detail.name.clone())),
                total_followers: Set(stats.total_followers),
                average_popularity: Set(stats.average_popularity),
                last_release_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await?;

        self.link_repo
            .create(platform_link::ActiveModel {
                id: Set(self.id_gen.generate()),
                artist_id: Set(created.id.clone()),
                platform: Set(input.platform),
                platform_artist_id: Set(input.platform_artist_id),
                followers: Set(detail.followers),
                popularity: Set(detail.popularity),
                fetched_at: Set(Some(now.into())),
                created_at: Set(now.into()),
            })
            .await?;

        Ok(created)
    }

    /// Link an additional platform to an already-followed artist and
    /// recompute the merged stats from the stored links.
    pub async fn link_platform(
        &self,
        user_id: &str,
        artist_id: &str,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<artist::Model> {
        let artist = self.get_owned(user_id, artist_id).await?;

        if self
            .link_repo
            .find_by_artist_and_platform(artist_id, platform)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "artist already linked to {}",
                platform.as_tag()
            )));
        }

        let detail = self
            .gateway
            .artist_details(platform, platform_artist_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "artist {platform_artist_id} not found on {}",
                    platform.as_tag()
                ))
            })?;

        let now = Utc::now();
        self.link_repo
            .create(platform_link::ActiveModel {
                id: Set(self.id_gen.generate()),
                artist_id: Set(artist_id.to_string()),
                platform: Set(platform),
                platform_artist_id: Set(platform_artist_id.to_string()),
                followers: Set(detail.followers),
                popularity: Set(detail.popularity),
                fetched_at: Set(Some(now.into())),
                created_at: Set(now.into()),
            })
            .await?;

        let links = self.link_repo.find_by_artist(artist_id).await?;
        let stats = aggregate(&stats_from_links(&links));
        self.artist_repo
            .save_stats(artist, stats.total_followers, stats.average_popularity)
            .await
    }

    /// Unfollow an artist. Platform links, releases and notifications
    /// cascade away with it.
    pub async fn unfollow(&self, user_id: &str, artist_id: &str) -> AppResult<()> {
        self.get_owned(user_id, artist_id).await?;
        self.artist_repo.delete(artist_id).await
    }

    /// Run a scoped stats update under its trigger key.
    ///
    /// A second trigger for the same scope while one is outstanding is
    /// rejected with `AlreadyRunning`; independent scopes run in parallel.
    pub async fn update_stats(&self, scope: UpdateScope) -> AppResult<UpdateSummary> {
        let key = scope.lock_key();
        self.coordinator
            .run_exclusive(&key, async {
                let artists = match &scope {
                    UpdateScope::All => self.artist_repo.find_all().await?,
                    UpdateScope::Artist(id) => {
                        let artist = self
                            .artist_repo
                            .find_by_id(id)
                            .await?
                            .ok_or_else(|| AppError::ArtistNotFound(id.clone()))?;
                        vec![artist]
                    }
                    UpdateScope::User(id) => self.artist_repo.find_by_user(id).await?,
                };

                let mut summary = UpdateSummary::default();
                for artist in artists {
                    let artist_id = artist.id.clone();
                    match self.refresh_artist(artist).await {
                        Ok(_) => summary.updated_count += 1,
                        Err(e) => {
                            tracing::warn!(artist_id, error = %e, "Artist stats update failed");
                            summary.failed_count += 1;
                        }
                    }
                }
                Ok(summary)
            })
            .await
    }

    /// Refresh one artist: fetch every linked platform, merge what
    /// answered, persist the derived stats and run release detection.
    ///
    /// A platform whose fetch fails is dropped from the aggregation input
    /// with a warning; its stored stats keep their last fetched values.
    /// No placeholder numbers are fabricated for it.
    pub async fn refresh_artist(&self, artist: artist::Model) -> AppResult<artist::Model> {
        let links = self.link_repo.find_by_artist(&artist.id).await?;

        let fetches = join_all(links.iter().map(|link| {
            self.gateway
                .artist_details(link.platform, &link.platform_artist_id)
        }))
        .await;

        let mut stats = Vec::with_capacity(links.len());
        for (link, fetched) in links.iter().zip(fetches) {
            match fetched {
                Ok(Some(detail)) => {
                    stats.push(PlatformStats {
                        followers: detail.followers,
                        popularity: detail.popularity,
                    });
                    self.link_repo
                        .save_stats(link.clone(), detail.followers, detail.popularity)
                        .await?;
                }
                // empty answer: contributes nothing, but is not an error
                Ok(None) => stats.push(PlatformStats {
                    followers: None,
                    popularity: None,
                }),
                Err(e) => {
                    tracing::warn!(
                        artist_id = artist.id,
                        platform = link.platform.as_tag(),
                        error = %e,
                        "Platform fetch failed, omitting from aggregation"
                    );
                }
            }
        }

        let merged = aggregate(&stats);
        let mut artist = self
            .artist_repo
            .save_stats(artist, merged.total_followers, merged.average_popularity)
            .await?;

        let now = Utc::now();
        let mut newest: Option<DateTime<Utc>> = None;
        for link in &links {
            let reported = match self
                .gateway
                .artist_releases(link.platform, &link.platform_artist_id)
                .await
            {
                Ok(reported) => reported,
                Err(e) => {
                    tracing::warn!(
                        artist_id = artist.id,
                        platform = link.platform.as_tag(),
                        error = %e,
                        "Release fetch failed, skipping platform"
                    );
                    continue;
                }
            };

            let outcome = self
                .detector
                .detect_new(&artist, reported, now, self.notification_ttl)
                .await?;

            for release in &outcome.new_releases {
                let released_at = release.released_at.with_timezone(&Utc);
                if newest.is_none_or(|n| released_at > n) {
                    newest = Some(released_at);
                }
            }
        }

        if let Some(newest) = newest {
            let is_newer = artist
                .last_release_at
                .is_none_or(|current| newest > current.with_timezone(&Utc));
            if is_newer {
                artist = self.artist_repo.save_last_release_at(artist, newest).await?;
            }
        }

        Ok(artist)
    }

    /// Load an artist and check the caller owns it.
    async fn get_owned(&self, user_id: &str, artist_id: &str) -> AppResult<artist::Model> {
        let artist = self
            .artist_repo
            .find_by_id(artist_id)
            .await?
            .ok_or_else(|| AppError::ArtistNotFound(artist_id.to_string()))?;

        if artist.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not the owner of this artist".to_string(),
            ));
        }

        Ok(artist)
    }
}

fn stats_from_links(links: &[platform_link::Model]) -> Vec<PlatformStats> {
    links
        .iter()
        .map(|link| PlatformStats {
            followers: link.followers,
            popularity: link.popularity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::InMemoryPlatformGateway;
    use encore_db::repositories::{JobLockRepository, NotificationRepository, ReleaseRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: Arc<DatabaseConnection>, gateway: Arc<InMemoryPlatformGateway>) -> ArtistService {
        let detector = ReleaseDetector::new(
            ReleaseRepository::new(Arc::clone(&db)),
            NotificationRepository::new(Arc::clone(&db)),
        );
        let coordinator = UpdateCoordinator::new(JobLockRepository::new(Arc::clone(&db)), 600);
        ArtistService::new(
            ArtistRepository::new(Arc::clone(&db)),
            PlatformLinkRepository::new(db),
            gateway,
            detector,
            coordinator,
            7,
        )
    }

    fn test_artist(id: &str, user_id: &str) -> artist::Model {
        artist::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Artist".to_string(),
            total_followers: 0,
            average_popularity: None,
            last_release_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_follow_unknown_platform_artist_is_bad_request() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let gateway = Arc::new(InMemoryPlatformGateway::new());
        let svc = service(db, gateway);

        let result = svc
            .follow(
                "u1",
                FollowArtistInput {
                    platform: Platform::Spotify,
                    platform_artist_id: "nope".to_string(),
                    name: None,
                },
            )
            .await;

        // no platform record: denied before anything is persisted
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unfollow_checks_ownership() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_artist("a1", "someone-else")]])
                .into_connection(),
        );
        let gateway = Arc::new(InMemoryPlatformGateway::new());
        let svc = service(db, gateway);

        let result = svc.unfollow("u1", "a1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_stats_rejected_while_in_flight() {
        // stale delete, then the lock insert hits an existing row
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0), exec(0)])
                .into_connection(),
        );
        let gateway = Arc::new(InMemoryPlatformGateway::new());
        let svc = service(db, gateway);

        let result = svc.update_stats(UpdateScope::All).await;
        assert!(matches!(result, Err(AppError::AlreadyRunning(_))));
    }

    #[tokio::test]
    async fn test_refresh_survives_one_failing_platform() {
        use crate::platform::PlatformArtistDetail;

        let now = Utc::now();
        let spotify_link = platform_link::Model {
            id: "l1".to_string(),
            artist_id: "a1".to_string(),
            platform: Platform::Spotify,
            platform_artist_id: "sp-1".to_string(),
            followers: None,
            popularity: None,
            fetched_at: None,
            created_at: now.into(),
        };
        let deezer_link = platform_link::Model {
            id: "l2".to_string(),
            artist_id: "a1".to_string(),
            platform: Platform::Deezer,
            platform_artist_id: "dz-1".to_string(),
            followers: Some(50),
            popularity: Some(80),
            fetched_at: Some(now.into()),
            created_at: now.into(),
        };

        let gateway = Arc::new(InMemoryPlatformGateway::new());
        gateway.set_detail(PlatformArtistDetail {
            platform: Platform::Spotify,
            platform_artist_id: "sp-1".to_string(),
            name: "Artist".to_string(),
            followers: Some(100),
            popularity: None,
        });
        gateway.fail_platform(Platform::Deezer);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // links of the artist
                .append_query_results([vec![spotify_link.clone(), deezer_link]])
                // spotify link stats update returning
                .append_query_results([[spotify_link]])
                // artist stats update returning
                .append_query_results([[test_artist("a1", "u1")]])
                // known releases for the spotify detection pass
                .append_query_results([Vec::<encore_db::entities::release::Model>::new()])
                .into_connection(),
        );
        let svc = service(db, gateway);

        // the failing platform is omitted, not fatal and not fabricated
        let result = svc.refresh_artist(test_artist("a1", "u1")).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_scope_lock_keys() {
        assert_eq!(UpdateScope::All.lock_key(), "all-artist-stats");
        assert_eq!(
            UpdateScope::Artist("a1".to_string()).lock_key(),
            "artist-stats:a1"
        );
        assert_eq!(
            UpdateScope::User("u1".to_string()).lock_key(),
            "user-stats:u1"
        );
    }
}
