use sea_orm_migration::prelude::*;

// Define table names
#[derive(DeriveIden)]
pub enum Venue {
    Table,
    Id,
    Name,
    City,
    State,
    Address,
    Phone,
    ImageLink,
    FacebookLink,
    Website,
    SeekingTalent,
    SeekingDescription,
    Genres,
}

#[derive(DeriveIden)]
pub enum Artist {
    Table,
    Id,
    Name,
    City,
    State,
    Phone,
    ImageLink,
    FacebookLink,
    Website,
    SeekingVenue,
    SeekingDescription,
    Genres,
}

#[derive(DeriveIden)]
pub enum Show {
    Table,
    Id,
    StartTime,
    VenueId,
    ArtistId,
}
