use std::collections::HashMap;

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::Form;
use minijinja::context;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, QueryOrder,
    TransactionTrait,
};

use crate::{
    entities::{artist, show, venue},
    error::AppError,
    flash::{FlashParams, redirect_with_flash},
    forms::ShowForm,
    listings::build_show_board,
    router::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shows))
        .route("/create", get(new_show_form).post(create_show))
}

async fn list_shows(State(state): State<AppState>) -> Result<Response, AppError> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await?;

    let venues_by_id: HashMap<i32, venue::Model> = venue::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let artists_by_id: HashMap<i32, artist::Model> = artist::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let board = build_show_board(&shows, &venues_by_id, &artists_by_id);

    let tmpl = state.templates.get_template("pages/shows.html")?;
    let html = tmpl.render(context! { shows => board })?;
    Ok(Html(html).into_response())
}

async fn new_show_form(
    State(state): State<AppState>,
    Query(params): Query<FlashParams>,
) -> Result<Response, AppError> {
    let tmpl = state.templates.get_template("forms/new_show.html")?;
    let html = tmpl.render(context! { flash => params.flash })?;
    Ok(Html(html).into_response())
}

async fn create_show(
    State(state): State<AppState>,
    Form(form): Form<ShowForm>,
) -> Result<Response, AppError> {
    let parsed = match form.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            return Ok(redirect_with_flash("/shows/create", &err.to_string()).into_response());
        }
    };

    // Parent checks and the insert share one transaction, so a venue or
    // artist deleted mid-request cannot leave a dangling show behind.
    let txn = state.db.begin().await?;

    if let Err(err) = ensure_parents_exist(&txn, parsed.venue_id, parsed.artist_id).await {
        let _ = txn.rollback().await;
        return match err {
            AppError::ReferentialIntegrity(message) => {
                tracing::warn!(
                    venue_id = parsed.venue_id,
                    artist_id = parsed.artist_id,
                    "rejected show referencing a missing parent"
                );
                Ok(redirect_with_flash("/shows/create", &message).into_response())
            }
            other => Err(other),
        };
    }

    let new_show = show::ActiveModel {
        start_time: Set(parsed.start_time),
        venue_id: Set(parsed.venue_id),
        artist_id: Set(parsed.artist_id),
        ..Default::default()
    };

    if let Err(err) = new_show.insert(&txn).await {
        let _ = txn.rollback().await;
        tracing::error!(error = %err, "failed to create show");
        return Ok(
            redirect_with_flash("/shows/create", "Show wasn't successfully listed!")
                .into_response(),
        );
    }

    txn.commit().await?;

    Ok(redirect_with_flash("/", "Show was successfully listed!").into_response())
}

async fn ensure_parents_exist<C: ConnectionTrait>(
    conn: &C,
    venue_id: i32,
    artist_id: i32,
) -> Result<(), AppError> {
    if venue::Entity::find_by_id(venue_id).one(conn).await?.is_none() {
        return Err(AppError::ReferentialIntegrity(format!(
            "No venue with id {venue_id} exists."
        )));
    }
    if artist::Entity::find_by_id(artist_id).one(conn).await?.is_none() {
        return Err(AppError::ReferentialIntegrity(format!(
            "No artist with id {artist_id} exists."
        )));
    }
    Ok(())
}
