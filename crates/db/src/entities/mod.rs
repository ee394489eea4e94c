//! Database entities.

#![allow(missing_docs)]

pub mod artist;
pub mod game;
pub mod job_lock;
pub mod notification;
pub mod platform_link;
pub mod release;
pub mod user;

pub use artist::Entity as Artist;
pub use game::Entity as Game;
pub use job_lock::Entity as JobLock;
pub use notification::Entity as Notification;
pub use platform_link::Entity as PlatformLink;
pub use release::Entity as Release;
pub use user::Entity as User;
