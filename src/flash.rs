//! Flash-style notices carried across redirects in a query parameter. The
//! target page reads the `flash` field and hands it to its template.

use axum::response::Redirect;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FlashParams {
    pub flash: Option<String>,
}

/// Redirects to `to` with `message` attached as the `flash` query parameter.
pub fn redirect_with_flash(to: &str, message: &str) -> Redirect {
    let encoded = utf8_percent_encode(message, NON_ALPHANUMERIC);
    let separator = if to.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{to}{separator}flash={encoded}"))
}
