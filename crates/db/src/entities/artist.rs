//! Artist entity.
//!
//! The canonical record for one followed artist, merged across every
//! platform the artist is linked to. `total_followers` and
//! `average_popularity` are derived from the platform links; an absent
//! `average_popularity` means no platform reported one, never zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user following this artist
    pub user_id: String,

    pub name: String,

    /// Sum of followers across linked platforms (derived)
    #[sea_orm(default_value = 0)]
    pub total_followers: i64,

    /// Mean popularity across platforms that report one (derived)
    #[sea_orm(nullable)]
    pub average_popularity: Option<f32>,

    /// Release date of the most recent known release
    #[sea_orm(nullable)]
    pub last_release_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(has_many = "super::platform_link::Entity")]
    PlatformLinks,

    #[sea_orm(has_many = "super::release::Entity")]
    Releases,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::platform_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlatformLinks.def()
    }
}

impl Related<super::release::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Releases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
