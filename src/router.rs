use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::{get, get_service},
};
use minijinja::Environment;
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    error::AppError,
    flash::FlashParams,
    routes::{artists, shows, venues},
};

#[cfg_attr(not(test), derive(Clone))]
pub struct AppState {
    pub db: DatabaseConnection,
    pub templates: Arc<Environment<'static>>,
}

// In test builds sea-orm's `mock` feature is enabled, which removes the
// `Clone` impl from `DatabaseConnection`. The mock variant wraps an `Arc`,
// so cloning it by hand shares the same mocker and transaction log.
#[cfg(test)]
impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            db: clone_connection(&self.db),
            templates: self.templates.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn clone_connection(db: &DatabaseConnection) -> DatabaseConnection {
    match db {
        DatabaseConnection::MockDatabaseConnection(conn) => {
            DatabaseConnection::MockDatabaseConnection(conn.clone())
        }
        DatabaseConnection::SqlxPostgresPoolConnection(conn) => {
            DatabaseConnection::SqlxPostgresPoolConnection(conn.clone())
        }
        DatabaseConnection::Disconnected => DatabaseConnection::Disconnected,
    }
}

pub fn create_router(db: DatabaseConnection) -> Router {
    let state = AppState {
        db,
        templates: Arc::new(setup_templates()),
    };

    Router::new()
        .route("/", get(index))
        .nest("/venues", venues::routes())
        .nest("/artists", artists::routes())
        .nest("/shows", shows::routes())
        .fallback(not_found)
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(TraceLayer::new_for_http())
}

fn setup_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader("templates"));
    env
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<FlashParams>,
) -> Result<impl IntoResponse, AppError> {
    let tmpl = state.templates.get_template("pages/home.html")?;
    let html = tmpl.render(minijinja::context! { flash => params.flash })?;
    Ok(Html(html))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
