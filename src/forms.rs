//! Form payloads for the create/edit endpoints. Field names mirror the HTML
//! form inputs; `genres` arrives as a repeated field and `seeking_*` as a
//! checkbox that is simply absent when unchecked.

use chrono::NaiveDateTime;
use sea_orm::ActiveValue::Set;
use serde::Deserialize;

use crate::entities::{artist, venue};
use crate::error::AppError;

const START_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct VenueForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub seeking_talent: Option<String>,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl VenueForm {
    /// Builds an insert-ready model, validating required fields first.
    pub fn into_active_model(self) -> Result<venue::ActiveModel, AppError> {
        Ok(venue::ActiveModel {
            name: Set(require(&self.name, "name")?),
            city: Set(require(&self.city, "city")?),
            state: Set(require(&self.state, "state")?),
            address: Set(require(&self.address, "address")?),
            phone: Set(none_if_empty(self.phone)),
            image_link: Set(none_if_empty(self.image_link)),
            facebook_link: Set(none_if_empty(self.facebook_link)),
            website: Set(none_if_empty(self.website_link)),
            seeking_talent: Set(self.seeking_talent.is_some()),
            seeking_description: Set(none_if_empty(self.seeking_description)),
            genres: Set(self.genres),
            ..Default::default()
        })
    }

    /// Builds an update targeting the row with `id` for an edit submission.
    pub fn apply(self, id: i32) -> Result<venue::ActiveModel, AppError> {
        let mut model = self.into_active_model()?;
        model.id = Set(id);
        Ok(model)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub seeking_venue: Option<String>,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn into_active_model(self) -> Result<artist::ActiveModel, AppError> {
        Ok(artist::ActiveModel {
            name: Set(require(&self.name, "name")?),
            city: Set(require(&self.city, "city")?),
            state: Set(require(&self.state, "state")?),
            phone: Set(none_if_empty(self.phone)),
            image_link: Set(none_if_empty(self.image_link)),
            facebook_link: Set(none_if_empty(self.facebook_link)),
            website: Set(none_if_empty(self.website_link)),
            seeking_venue: Set(self.seeking_venue.is_some()),
            seeking_description: Set(none_if_empty(self.seeking_description)),
            genres: Set(self.genres),
            ..Default::default()
        })
    }

    pub fn apply(self, id: i32) -> Result<artist::ActiveModel, AppError> {
        let mut model = self.into_active_model()?;
        model.id = Set(id);
        Ok(model)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowForm {
    #[serde(default)]
    pub venue_id: String,
    #[serde(default)]
    pub artist_id: String,
    #[serde(default)]
    pub start_time: String,
}

/// A show submission with its fields parsed and checked for shape. Whether
/// the referenced venue and artist exist is decided later, inside the
/// insert transaction.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedShow {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: NaiveDateTime,
}

impl ShowForm {
    pub fn parse(&self) -> Result<ParsedShow, AppError> {
        let venue_id = parse_id(&self.venue_id, "venue_id")?;
        let artist_id = parse_id(&self.artist_id, "artist_id")?;
        let start_time = parse_start_time(&self.start_time)?;
        Ok(ParsedShow {
            venue_id,
            artist_id,
            start_time,
        })
    }
}

fn parse_id(value: &str, field: &str) -> Result<i32, AppError> {
    require(value, field)?
        .parse()
        .map_err(|_| AppError::Validation(format!("{field} must be a number")))
}

fn parse_start_time(value: &str) -> Result<NaiveDateTime, AppError> {
    let trimmed = require(value, "start_time")?;
    START_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&trimmed, format).ok())
        .ok_or_else(|| AppError::Validation("start_time is not a valid date and time".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn venue_form() -> VenueForm {
        VenueForm {
            name: "The Musical Hop".to_string(),
            city: "SF".to_string(),
            state: "CA".to_string(),
            address: "1015 Folsom Street".to_string(),
            website_link: Some("https://themusicalhop.example".to_string()),
            genres: vec!["Jazz".to_string(), "Folk".to_string()],
            seeking_talent: Some("y".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn venue_form_maps_fields_onto_the_model() {
        let model = venue_form().into_active_model().unwrap();
        assert_eq!(model.name.clone().unwrap(), "The Musical Hop");
        assert_eq!(
            model.website.clone().unwrap().as_deref(),
            Some("https://themusicalhop.example")
        );
        assert!(model.seeking_talent.clone().unwrap());
        assert_eq!(model.genres.clone().unwrap().len(), 2);
    }

    #[test]
    fn missing_name_is_a_validation_error() {
        let form = VenueForm {
            name: "  ".to_string(),
            ..venue_form()
        };
        let err = form.into_active_model().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn apply_targets_the_given_row() {
        let model = venue_form().apply(5).unwrap();
        assert_eq!(model.id.clone().unwrap(), 5);
    }

    #[test]
    fn unchecked_seeking_box_maps_to_false() {
        let form = VenueForm {
            seeking_talent: None,
            ..venue_form()
        };
        let model = form.into_active_model().unwrap();
        assert!(!model.seeking_talent.clone().unwrap());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let form = VenueForm {
            phone: Some("   ".to_string()),
            ..venue_form()
        };
        let model = form.into_active_model().unwrap();
        assert_eq!(model.phone.clone().unwrap(), None);
    }

    #[test]
    fn show_form_parses_datetime_local_input() {
        let form = ShowForm {
            venue_id: "3".to_string(),
            artist_id: "7".to_string(),
            start_time: "2035-04-01T20:00".to_string(),
        };
        let parsed = form.parse().unwrap();
        assert_eq!(parsed.venue_id, 3);
        assert_eq!(parsed.artist_id, 7);
        assert_eq!(
            parsed.start_time,
            NaiveDate::from_ymd_opt(2035, 4, 1)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn show_form_rejects_garbage_ids_and_dates() {
        let form = ShowForm {
            venue_id: "three".to_string(),
            artist_id: "7".to_string(),
            start_time: "2035-04-01T20:00".to_string(),
        };
        assert!(matches!(form.parse(), Err(AppError::Validation(_))));

        let form = ShowForm {
            venue_id: "3".to_string(),
            artist_id: "7".to_string(),
            start_time: "soon".to_string(),
        };
        assert!(matches!(form.parse(), Err(AppError::Validation(_))));
    }
}
