//! Create notification table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notification::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notification::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::Subject)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notification::ArtistId).string_len(32))
                    .col(ColumnDef::new(Notification::GameId).string_len(32))
                    .col(ColumnDef::new(Notification::ReleaseId).string_len(32))
                    .col(ColumnDef::new(Notification::State).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Notification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Notification::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user")
                            .from(Notification::Table, Notification::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_artist")
                            .from(Notification::Table, Notification::ArtistId)
                            .to(Artist::Table, Artist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_game")
                            .from(Notification::Table, Notification::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_release")
                            .from(Notification::Table, Notification::ReleaseId)
                            .to(Release::Table, Release::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, state) (for listing a user's active alerts)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_user_state")
                    .table(Notification::Table)
                    .col(Notification::UserId)
                    .col(Notification::State)
                    .to_owned(),
            )
            .await?;

        // Index: (state, expires_at) (for the expiry sweep)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_state_expires_at")
                    .table(Notification::Table)
                    .col(Notification::State)
                    .col(Notification::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
    UserId,
    Subject,
    ArtistId,
    GameId,
    ReleaseId,
    State,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Artist {
    Table,
    Id,
}

#[derive(Iden)]
enum Game {
    Table,
    Id,
}

#[derive(Iden)]
enum Release {
    Table,
    Id,
}
