//! Game entity.
//!
//! A game followed on a storefront. A tracked game whose release date
//! arrives spawns one new-release notification; unfollowing retracts any
//! notification still active.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Storefronts providing game metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum Storefront {
    #[sea_orm(string_value = "steam")]
    Steam,
    #[sea_orm(string_value = "gog")]
    Gog,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user following this game
    pub user_id: String,

    pub name: String,

    pub storefront: Storefront,

    /// Storefront-native game identifier
    pub storefront_game_id: String,

    /// Announced release date, if known
    #[sea_orm(nullable)]
    pub release_date: Option<DateTimeWithTimeZone>,

    /// Whether the release notification for this game was already created
    #[sea_orm(default_value = false)]
    pub notified: bool,

    pub created_at: DateTimeWithTimeZone,
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

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
