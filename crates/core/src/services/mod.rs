//! Business logic services.

#![allow(missing_docs)]

pub mod artist;
pub mod game;
pub mod notification_lifecycle;
pub mod release_detector;
pub mod role_gate;
pub mod stats_aggregator;
pub mod update_coordinator;

pub use artist::{ArtistService, FollowArtistInput, UpdateScope, UpdateSummary};
pub use game::{FollowGameInput, GameService};
pub use notification_lifecycle::NotificationLifecycleService;
pub use release_detector::{DetectionOutcome, ReleaseDetector, ReleaseDiff};
pub use role_gate::{authorize, Operation, UserRole};
pub use stats_aggregator::{aggregate, AggregatedStats, PlatformStats};
pub use update_coordinator::{keys, UpdateCoordinator};
