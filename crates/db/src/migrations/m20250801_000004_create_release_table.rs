//! Create release table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Release::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Release::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Release::ArtistId).string_len(32).not_null())
                    .col(ColumnDef::new(Release::Platform).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Release::PlatformReleaseId)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Release::Name).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Release::ReleaseType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Release::ReleasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Release::TrackCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Release::Popularity).integer())
                    .col(
                        ColumnDef::new(Release::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Release::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_release_artist")
                            .from(Release::Table, Release::ArtistId)
                            .to(Artist::Table, Artist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (artist_id, platform, platform_release_id) -
        // native key; release ids are only unique within one platform
        manager
            .create_index(
                Index::create()
                    .name("idx_release_artist_native_key")
                    .table(Release::Table)
                    .col(Release::ArtistId)
                    .col(Release::Platform)
                    .col(Release::PlatformReleaseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (artist_id, released_at) (for newest-first listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_release_artist_released_at")
                    .table(Release::Table)
                    .col(Release::ArtistId)
                    .col(Release::ReleasedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Release::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Release {
    Table,
    Id,
    ArtistId,
    Platform,
    PlatformReleaseId,
    Name,
    ReleaseType,
    ReleasedAt,
    TrackCount,
    Popularity,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Artist {
    Table,
    Id,
}
