pub mod artists;
pub mod shows;
pub mod venues;

use serde::Deserialize;

/// Payload of the venue/artist search forms.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}
