//! Release detector.
//!
//! Decides which platform-reported releases are new for an artist, stores
//! them and materializes the matching notifications. The native key is
//! (artist, platform, platform release id): a reported item whose key is
//! already known updates the stored row in place and never spawns a
//! duplicate notification, so re-ingesting identical data is a no-op.
//! Platform release ids are only unique within one platform, so the same
//! id string on two platforms names two distinct releases.

use chrono::{DateTime, Duration, Utc};
use encore_common::{AppResult, IdGenerator};
use encore_db::{
    entities::{
        artist, notification,
        notification::{NotificationState, NotificationSubject},
        release,
    },
    repositories::{NotificationRepository, ReleaseRepository},
};
use sea_orm::Set;

use crate::platform::PlatformRelease;

/// Pure diff of reported releases against the known set.
#[derive(Debug, Default)]
pub struct ReleaseDiff {
    /// Reported items with an unknown native key, release date descending.
    pub new: Vec<PlatformRelease>,
    /// Known rows whose reported metadata changed, paired with the report.
    pub changed: Vec<(release::Model, PlatformRelease)>,
}

impl ReleaseDiff {
    /// Compute the diff. No I/O; ordering of `new` is release date
    /// descending so the most recent release is processed first.
    #[must_use]
    pub fn compute(known: &[release::Model], reported: Vec<PlatformRelease>) -> Self {
        let mut diff = Self::default();

        for item in reported {
            match known.iter().find(|k| {
                k.platform == item.platform && k.platform_release_id == item.platform_release_id
            }) {
                None => diff.new.push(item),
                Some(existing) => {
                    if metadata_changed(existing, &item) {
                        diff.changed.push((existing.clone(), item));
                    }
                }
            }
        }

        diff.new
            .sort_by(|a, b| b.released_at.cmp(&a.released_at));
        diff
    }
}

fn metadata_changed(known: &release::Model, reported: &PlatformRelease) -> bool {
    known.name != reported.name
        || known.release_type != reported.release_type
        || known.released_at != reported.released_at
        || known.track_count != reported.track_count
        || known.popularity != reported.popularity
}

/// Persisting half of the detector.
#[derive(Clone)]
pub struct ReleaseDetector {
    release_repo: ReleaseRepository,
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

/// What one detection pass produced.
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    pub new_releases: Vec<release::Model>,
    pub notifications: Vec<notification::Model>,
    pub updated_releases: u64,
}

impl ReleaseDetector {
    /// Create a new release detector.
    #[must_use]
    pub const fn new(
        release_repo: ReleaseRepository,
        notification_repo: NotificationRepository,
    ) -> Self {
        Self {
            release_repo,
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ingest the releases a platform reports for an artist.
    ///
    /// New native keys become stored releases plus exactly one active
    /// notification each; known keys with changed metadata are corrected
    /// in place without a new notification.
    pub async fn detect_new(
        &self,
        artist: &artist::Model,
        reported: Vec<PlatformRelease>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> AppResult<DetectionOutcome> {
        let known = self.release_repo.find_by_artist(&artist.id).await?;
        let diff = ReleaseDiff::compute(&known, reported);

        let mut outcome = DetectionOutcome::default();

        for item in diff.new {
            let stored = self
                .release_repo
                .create(release::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    artist_id: Set(artist.id.clone()),
                    platform: Set(item.platform),
                    platform_release_id: Set(item.platform_release_id),
                    name: Set(item.name),
                    release_type: Set(item.release_type),
                    released_at: Set(item.released_at.into()),
                    track_count: Set(item.track_count),
                    popularity: Set(item.popularity),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                })
                .await?;

            let created = self
                .notification_repo
                .create(notification::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(artist.user_id.clone()),
                    subject: Set(NotificationSubject::ArtistRelease),
                    artist_id: Set(Some(artist.id.clone())),
                    game_id: Set(None),
                    release_id: Set(Some(stored.id.clone())),
                    state: Set(NotificationState::Active),
                    created_at: Set(now.into()),
                    expires_at: Set((now + ttl).into()),
                })
                .await?;

            outcome.new_releases.push(stored);
            outcome.notifications.push(created);
        }

        for (existing, item) in diff.changed {
            let mut active: release::ActiveModel = existing.into();
            active.name = Set(item.name);
            active.release_type = Set(item.release_type);
            active.released_at = Set(item.released_at.into());
            active.track_count = Set(item.track_count);
            active.popularity = Set(item.popularity);
            active.updated_at = Set(Some(now.into()));
            self.release_repo.update(active).await?;
            outcome.updated_releases += 1;
        }

        Ok(outcome)
    }
}
