//! Platform link entity.
//!
//! One row per (artist, platform) pair: the platform-native artist id plus
//! the stats last fetched from that platform. Followers and popularity are
//! nullable because a platform may not report them; NULL is "unknown",
//! not zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// External platforms providing artist metadata and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[sea_orm(string_value = "spotify")]
    Spotify,
    #[sea_orm(string_value = "youtube")]
    YouTube,
    #[sea_orm(string_value = "deezer")]
    Deezer,
    #[sea_orm(string_value = "bandcamp")]
    Bandcamp,
}

impl Platform {
    /// Wire tag used by the remote function payloads.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::YouTube => "youtube",
            Self::Deezer => "deezer",
            Self::Bandcamp => "bandcamp",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_link")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub artist_id: String,

    pub platform: Platform,

    /// Platform-native artist identifier
    pub platform_artist_id: String,

    #[sea_orm(nullable)]
    pub followers: Option<i64>,

    #[sea_orm(nullable)]
    pub popularity: Option<i32>,

    /// When stats were last fetched from this platform
    #[sea_orm(nullable)]
    pub fetched_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::artist::Entity",
        from = "Column::ArtistId",
        to = "super::artist::Column::Id",
        on_delete = "Cascade"
    )]
    Artist,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
