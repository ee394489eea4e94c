//! Create platform link table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlatformLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlatformLink::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlatformLink::ArtistId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlatformLink::Platform)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlatformLink::PlatformArtistId)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlatformLink::Followers).big_integer())
                    .col(ColumnDef::new(PlatformLink::Popularity).integer())
                    .col(ColumnDef::new(PlatformLink::FetchedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PlatformLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_platform_link_artist")
                            .from(PlatformLink::Table, PlatformLink::ArtistId)
                            .to(Artist::Table, Artist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (artist_id, platform) - one link per platform
        manager
            .create_index(
                Index::create()
                    .name("idx_platform_link_artist_platform")
                    .table(PlatformLink::Table)
                    .col(PlatformLink::ArtistId)
                    .col(PlatformLink::Platform)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlatformLink::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PlatformLink {
    Table,
    Id,
    ArtistId,
    Platform,
    PlatformArtistId,
    Followers,
    Popularity,
    FetchedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Artist {
    Table,
    Id,
}
