//! Database repositories.

#![allow(missing_docs)]

pub mod artist;
pub mod game;
pub mod job_lock;
pub mod notification;
pub mod platform_link;
pub mod release;
pub mod user;

pub use artist::ArtistRepository;
pub use game::GameRepository;
pub use job_lock::JobLockRepository;
pub use notification::NotificationRepository;
pub use platform_link::PlatformLinkRepository;
pub use release::ReleaseRepository;
pub use user::UserRepository;
