//! Display-ready groupings built from plain entity rows. Everything here is
//! a pure function over data the route handlers have already fetched, so the
//! handlers stay thin and the shaping logic is testable without a database.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entities::{artist, show, venue};
use crate::schedule::partition_shows;

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Entities that appear in name listings and search results.
pub trait Named {
    fn id(&self) -> i32;
    fn name(&self) -> &str;
}

impl Named for venue::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for artist::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: i32,
    pub name: String,
}

fn entity_ref<T: Named>(entity: &T) -> EntityRef {
    EntityRef {
        id: entity.id(),
        name: entity.name().to_string(),
    }
}

/// One (city, state) group on the venues page.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntityRef>,
}

/// Groups venues sharing a (city, state) pair, ordered by the first
/// occurrence of each pair in `venues`.
pub fn group_venues_by_location(venues: &[venue::Model]) -> Vec<VenueArea> {
    let mut areas: Vec<VenueArea> = Vec::new();
    for venue in venues {
        match areas
            .iter_mut()
            .find(|area| area.city == venue.city && area.state == venue.state)
        {
            Some(area) => area.venues.push(entity_ref(venue)),
            None => areas.push(VenueArea {
                city: venue.city.clone(),
                state: venue.state.clone(),
                venues: vec![entity_ref(venue)],
            }),
        }
    }
    areas
}

/// Flat id/name listing in input order, as on the artists page.
pub fn name_listing<T: Named>(entities: &[T]) -> Vec<EntityRef> {
    entities.iter().map(entity_ref).collect()
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntityRef>,
}

/// Case-insensitive substring match on entity name. An empty term matches
/// everything; result order follows the input order.
pub fn search_by_name<T: Named>(entities: &[T], term: &str) -> SearchResults {
    let needle = term.to_lowercase();
    let data: Vec<EntityRef> = entities
        .iter()
        .filter(|entity| entity.name().to_lowercase().contains(&needle))
        .map(entity_ref)
        .collect();
    SearchResults {
        count: data.len(),
        data,
    }
}

/// A show row on a venue page, carrying the artist's display fields.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct VenueShowEntry {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct VenuePage {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Merges a venue with its shows, split into past/upcoming at `now` and
/// joined with artist display fields.
pub fn build_venue_page(
    venue: venue::Model,
    shows: Vec<show::Model>,
    artists_by_id: &HashMap<i32, artist::Model>,
    now: NaiveDateTime,
) -> VenuePage {
    let partition = partition_shows(shows, now);
    VenuePage {
        id: venue.id,
        name: venue.name,
        city: venue.city,
        state: venue.state,
        address: venue.address,
        phone: venue.phone,
        image_link: venue.image_link,
        facebook_link: venue.facebook_link,
        website: venue.website,
        seeking_talent: venue.seeking_talent,
        seeking_description: venue.seeking_description,
        genres: venue.genres,
        past_shows_count: partition.past_count(),
        upcoming_shows_count: partition.upcoming_count(),
        past_shows: venue_show_entries(&partition.past, artists_by_id),
        upcoming_shows: venue_show_entries(&partition.upcoming, artists_by_id),
    }
}

fn venue_show_entries(
    shows: &[show::Model],
    artists_by_id: &HashMap<i32, artist::Model>,
) -> Vec<VenueShowEntry> {
    shows
        .iter()
        .filter_map(|show| {
            let Some(artist) = artists_by_id.get(&show.artist_id) else {
                tracing::warn!(
                    show_id = show.id,
                    artist_id = show.artist_id,
                    "show references a missing artist, skipping entry"
                );
                return None;
            };
            Some(VenueShowEntry {
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: show.start_time.format(START_TIME_FORMAT).to_string(),
            })
        })
        .collect()
}

/// A show row on an artist page, carrying the venue's display fields.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ArtistShowEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistPage {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub fn build_artist_page(
    artist: artist::Model,
    shows: Vec<show::Model>,
    venues_by_id: &HashMap<i32, venue::Model>,
    now: NaiveDateTime,
) -> ArtistPage {
    let partition = partition_shows(shows, now);
    ArtistPage {
        id: artist.id,
        name: artist.name,
        city: artist.city,
        state: artist.state,
        phone: artist.phone,
        image_link: artist.image_link,
        facebook_link: artist.facebook_link,
        website: artist.website,
        seeking_venue: artist.seeking_venue,
        seeking_description: artist.seeking_description,
        genres: artist.genres,
        past_shows_count: partition.past_count(),
        upcoming_shows_count: partition.upcoming_count(),
        past_shows: artist_show_entries(&partition.past, venues_by_id),
        upcoming_shows: artist_show_entries(&partition.upcoming, venues_by_id),
    }
}

fn artist_show_entries(
    shows: &[show::Model],
    venues_by_id: &HashMap<i32, venue::Model>,
) -> Vec<ArtistShowEntry> {
    shows
        .iter()
        .filter_map(|show| {
            let Some(venue) = venues_by_id.get(&show.venue_id) else {
                tracing::warn!(
                    show_id = show.id,
                    venue_id = show.venue_id,
                    "show references a missing venue, skipping entry"
                );
                return None;
            };
            Some(ArtistShowEntry {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                venue_image_link: venue.image_link.clone(),
                start_time: show.start_time.format(START_TIME_FORMAT).to_string(),
            })
        })
        .collect()
}

/// One row on the shows board, enriched with both parents' display fields.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub artist_id: i32,
    pub venue_name: String,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// Joins every show with its venue and artist. Rows referencing a missing
/// parent are dropped with a warning; referential integrity should make that
/// impossible, but a stale read must not take the page down.
pub fn build_show_board(
    shows: &[show::Model],
    venues_by_id: &HashMap<i32, venue::Model>,
    artists_by_id: &HashMap<i32, artist::Model>,
) -> Vec<ShowListing> {
    shows
        .iter()
        .filter_map(|show| {
            let venue = venues_by_id.get(&show.venue_id);
            let artist = artists_by_id.get(&show.artist_id);
            let (Some(venue), Some(artist)) = (venue, artist) else {
                tracing::warn!(show_id = show.id, "show references a missing parent, skipping");
                return None;
            };
            Some(ShowListing {
                venue_id: venue.id,
                artist_id: artist.id,
                venue_name: venue.name.clone(),
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: show.start_time.format(START_TIME_FORMAT).to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn venue(id: i32, name: &str, city: &str, state: &str) -> venue::Model {
        venue::Model {
            id,
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            address: "123 Main St".to_string(),
            phone: None,
            image_link: Some(format!("https://img.example/venue/{id}")),
            facebook_link: None,
            website: None,
            seeking_talent: false,
            seeking_description: None,
            genres: vec!["Jazz".to_string()],
        }
    }

    fn artist(id: i32, name: &str) -> artist::Model {
        artist::Model {
            id,
            name: name.to_string(),
            city: "SF".to_string(),
            state: "CA".to_string(),
            phone: None,
            image_link: Some(format!("https://img.example/artist/{id}")),
            facebook_link: None,
            website: None,
            seeking_venue: false,
            seeking_description: None,
            genres: vec![],
        }
    }

    fn show(id: i32, venue_id: i32, artist_id: i32, y: i32) -> show::Model {
        show::Model {
            id,
            start_time: NaiveDate::from_ymd_opt(y, 5, 21)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap(),
            venue_id,
            artist_id,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn venues_in_same_city_and_state_share_one_group() {
        let venues = vec![
            venue(1, "The Musical Hop", "SF", "CA"),
            venue(2, "Park Square", "SF", "CA"),
        ];

        let areas = group_venues_by_location(&venues);

        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].city, "SF");
        assert_eq!(areas[0].state, "CA");
        assert_eq!(
            areas[0].venues,
            vec![
                EntityRef {
                    id: 1,
                    name: "The Musical Hop".to_string()
                },
                EntityRef {
                    id: 2,
                    name: "Park Square".to_string()
                },
            ]
        );
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let venues = vec![
            venue(1, "A", "NYC", "NY"),
            venue(2, "B", "SF", "CA"),
            venue(3, "C", "NYC", "NY"),
        ];

        let areas = group_venues_by_location(&venues);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "NYC");
        assert_eq!(areas[1].city, "SF");
        assert_eq!(areas[0].venues.len(), 2);
    }

    #[test]
    fn empty_search_term_matches_everything() {
        let venues = vec![venue(1, "A", "SF", "CA"), venue(2, "B", "SF", "CA")];
        let results = search_by_name(&venues, "");
        assert_eq!(results.count, 2);
        assert_eq!(results.data.len(), 2);
    }

    #[test]
    fn unmatched_term_returns_empty_results() {
        let venues = vec![venue(1, "The Musical Hop", "SF", "CA")];
        let results = search_by_name(&venues, "zz");
        assert_eq!(results.count, 0);
        assert!(results.data.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let artists = vec![artist(1, "Guns N Petals"), artist(2, "The Wild Saxes")];

        let results = search_by_name(&artists, "WILD");

        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, 2);
    }

    #[test]
    fn venue_page_splits_and_counts_shows() {
        let artists_by_id: HashMap<i32, artist::Model> =
            [(7, artist(7, "Guns N Petals"))].into_iter().collect();
        let shows = vec![show(1, 1, 7, 2019), show(2, 1, 7, 2035)];

        let page = build_venue_page(venue(1, "The Musical Hop", "SF", "CA"), shows, &artists_by_id, now());

        assert_eq!(page.past_shows_count, 1);
        assert_eq!(page.upcoming_shows_count, 1);
        assert_eq!(page.past_shows[0].artist_name, "Guns N Petals");
        assert_eq!(page.past_shows[0].start_time, "2019-05-21 21:30");
        assert_eq!(page.upcoming_shows[0].artist_id, 7);
    }

    #[test]
    fn artist_page_carries_venue_display_fields() {
        let venues_by_id: HashMap<i32, venue::Model> =
            [(3, venue(3, "Park Square", "SF", "CA"))].into_iter().collect();
        let shows = vec![show(1, 3, 1, 2019)];

        let page = build_artist_page(artist(1, "Guns N Petals"), shows, &venues_by_id, now());

        assert_eq!(page.past_shows_count, 1);
        assert_eq!(page.upcoming_shows_count, 0);
        assert_eq!(page.past_shows[0].venue_name, "Park Square");
        assert_eq!(
            page.past_shows[0].venue_image_link.as_deref(),
            Some("https://img.example/venue/3")
        );
    }

    #[test]
    fn show_board_joins_both_parents() {
        let venues_by_id: HashMap<i32, venue::Model> =
            [(1, venue(1, "The Musical Hop", "SF", "CA"))].into_iter().collect();
        let artists_by_id: HashMap<i32, artist::Model> =
            [(2, artist(2, "Guns N Petals"))].into_iter().collect();

        let board = build_show_board(&[show(1, 1, 2, 2025)], &venues_by_id, &artists_by_id);

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].venue_name, "The Musical Hop");
        assert_eq!(board[0].artist_name, "Guns N Petals");
    }

    #[test]
    fn search_results_serialize_with_count_and_data() {
        let venues = vec![venue(1, "The Musical Hop", "SF", "CA")];
        let results = search_by_name(&venues, "hop");

        let value = serde_json::to_value(&results).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["data"][0]["id"], 1);
        assert_eq!(value["data"][0]["name"], "The Musical Hop");
    }

    #[test]
    fn show_board_drops_rows_with_missing_parents() {
        let venues_by_id: HashMap<i32, venue::Model> =
            [(1, venue(1, "The Musical Hop", "SF", "CA"))].into_iter().collect();
        let artists_by_id = HashMap::new();

        let board = build_show_board(&[show(1, 1, 99, 2025)], &venues_by_id, &artists_by_id);

        assert!(board.is_empty());
    }
}
