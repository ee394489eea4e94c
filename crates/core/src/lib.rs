//! Core business logic for encore.
//!
//! The release tracking engine: stats aggregation, release detection,
//! the notification lifecycle sweeps, role gating and the update
//! coordinator, plus the platform gateway collaborator they fetch from.

pub mod platform;
pub mod services;

pub use platform::{
    HttpPlatformGateway, InMemoryPlatformGateway, PlatformArtistDetail, PlatformArtistSummary,
    PlatformGateway, PlatformRelease,
};
pub use services::*;
