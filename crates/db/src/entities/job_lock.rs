//! Job lock entity.
//!
//! Shared exclusivity table keyed by trigger class. A row existing for a
//! key means a job for that key is in flight; acquisition is a conditional
//! insert so the guarantee holds across server instances, not just within
//! one process.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_lock")]
pub struct Model {
    /// Trigger class, e.g. `all-artist-stats` or `artist-stats:<id>`
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    pub locked_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
