use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

const BAD_REQUEST_PAGE: &str = include_str!("../templates/errors/400.html");
const NOT_FOUND_PAGE: &str = include_str!("../templates/errors/404.html");
const SERVER_ERROR_PAGE: &str = include_str!("../templates/errors/500.html");

// Error messages are built from fixed text and parsed ids, never raw input.
fn bad_request_page(message: &str) -> String {
    BAD_REQUEST_PAGE.replace("{{ message }}", message)
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing form field, caught before anything is persisted.
    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    /// A show referenced a venue or artist that does not exist.
    #[error("{0}")]
    ReferentialIntegrity(String),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
            }
            AppError::Validation(message) | AppError::ReferentialIntegrity(message) => {
                (StatusCode::BAD_REQUEST, Html(bad_request_page(&message))).into_response()
            }
            AppError::Persistence(err) => {
                tracing::error!(error = %err, "database error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
            AppError::Template(err) => {
                tracing::error!(error = %err, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_page_carries_the_message_in_the_layout() {
        let body = bad_request_page("name is required");
        assert!(body.contains("name is required"));
        assert!(body.contains("/static/css/main.css"));
        assert!(!body.contains("{{ message }}"));
    }

    #[test]
    fn validation_errors_map_to_a_styled_400() {
        let response = AppError::Validation("state is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
