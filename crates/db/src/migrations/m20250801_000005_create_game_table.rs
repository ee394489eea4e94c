//! Create game table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Game::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Game::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Game::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Game::Name).string_len(512).not_null())
                    .col(ColumnDef::new(Game::Storefront).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Game::StorefrontGameId)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Game::ReleaseDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Game::Notified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Game::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_user")
                            .from(Game::Table, Game::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (notified, release_date) (for the release scan)
        manager
            .create_index(
                Index::create()
                    .name("idx_game_notified_release_date")
                    .table(Game::Table)
                    .col(Game::Notified)
                    .col(Game::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Game::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Game {
    Table,
    Id,
    UserId,
    Name,
    Storefront,
    StorefrontGameId,
    ReleaseDate,
    Notified,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
