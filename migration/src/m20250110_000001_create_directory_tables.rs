use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Venue Table
        let table = table_auto(Venue::Table)
            .col(pk_auto(Venue::Id))
            .col(string(Venue::Name))
            .col(string(Venue::City))
            .col(string(Venue::State))
            .col(string(Venue::Address))
            .col(string_null(Venue::Phone))
            .col(string_null(Venue::ImageLink))
            .col(string_null(Venue::FacebookLink))
            .col(string_null(Venue::Website))
            .col(boolean(Venue::SeekingTalent).default(false))
            .col(string_null(Venue::SeekingDescription))
            .col(array(Venue::Genres, ColumnType::Text))
            .to_owned();
        manager.create_table(table).await?;

        // Create Artist Table
        let table = table_auto(Artist::Table)
            .col(pk_auto(Artist::Id))
            .col(string(Artist::Name))
            .col(string(Artist::City))
            .col(string(Artist::State))
            .col(string_null(Artist::Phone))
            .col(string_null(Artist::ImageLink))
            .col(string_null(Artist::FacebookLink))
            .col(string_null(Artist::Website))
            .col(boolean(Artist::SeekingVenue).default(false))
            .col(string_null(Artist::SeekingDescription))
            .col(array(Artist::Genres, ColumnType::Text))
            .to_owned();
        manager.create_table(table).await?;

        // Create Show Table
        let table = table_auto(Show::Table)
            .col(pk_auto(Show::Id))
            .col(timestamp(Show::StartTime))
            .col(integer(Show::VenueId))
            .col(integer(Show::ArtistId))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_show_venue")
                    .from(Show::Table, Show::VenueId)
                    .to(Venue::Table, Venue::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_show_artist")
                    .from(Show::Table, Show::ArtistId)
                    .to(Artist::Table, Artist::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create indices for common lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_show_venue")
                    .table(Show::Table)
                    .col(Show::VenueId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_show_artist")
                    .table(Show::Table)
                    .col(Show::ArtistId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop all tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Show::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Artist::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Venue::Table).to_owned())
            .await?;

        Ok(())
    }
}
