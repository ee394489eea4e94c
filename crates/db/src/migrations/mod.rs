//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250801_000001_create_user_table;
mod m20250801_000002_create_artist_table;
mod m20250801_000003_create_platform_link_table;
mod m20250801_000004_create_release_table;
mod m20250801_000005_create_game_table;
mod m20250801_000006_create_notification_table;
mod m20250801_000007_create_job_lock_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_user_table::Migration),
            Box::new(m20250801_000002_create_artist_table::Migration),
            Box::new(m20250801_000003_create_platform_link_table::Migration),
            Box::new(m20250801_000004_create_release_table::Migration),
            Box::new(m20250801_000005_create_game_table::Migration),
            Box::new(m20250801_000006_create_notification_table::Migration),
            Box::new(m20250801_000007_create_job_lock_table::Migration),
        ]
    }
}
