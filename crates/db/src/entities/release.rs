//! Release entity.
//!
//! One distinct release event reported by a platform for an artist.
//! Uniqueness key is (artist_id, platform_release_id): re-ingesting the
//! same native id updates the row, never duplicates it. Releases are a
//! historical record and are never deleted by the engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::platform_link::Platform;

/// Release types reported by platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    #[sea_orm(string_value = "album")]
    Album,
    #[sea_orm(string_value = "single")]
    Single,
    #[sea_orm(string_value = "ep")]
    Ep,
    #[sea_orm(string_value = "compilation")]
    Compilation,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "release")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub artist_id: String,

    /// Platform that reported this release
    pub platform: Platform,

    /// Platform-native release identifier, unique per artist
    pub platform_release_id: String,

    pub name: String,

    pub release_type: ReleaseType,

    pub released_at: DateTimeWithTimeZone,

    #[sea_orm(default_value = 0)]
    pub track_count: i32,

    #[sea_orm(nullable)]
    pub popularity: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
