//! Create artist table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Artist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Artist::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Artist::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Artist::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Artist::TotalFollowers)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Artist::AveragePopularity).float())
                    .col(ColumnDef::new(Artist::LastReleaseAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Artist::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Artist::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_user")
                            .from(Artist::Table, Artist::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's artists)
        manager
            .create_index(
                Index::create()
                    .name("idx_artist_user_id")
                    .table(Artist::Table)
                    .col(Artist::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Artist::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Artist {
    Table,
    Id,
    UserId,
    Name,
    TotalFollowers,
    AveragePopularity,
    LastReleaseAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
