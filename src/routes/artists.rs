use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::Form;
use chrono::Utc;
use minijinja::context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::{
    entities::{artist, show, venue},
    error::AppError,
    flash::{FlashParams, redirect_with_flash},
    forms::ArtistForm,
    listings::{build_artist_page, name_listing, search_by_name},
    router::AppState,
    routes::SearchForm,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artists))
        .route("/search", post(search_artists))
        .route("/create", get(new_artist_form).post(create_artist))
        .route("/{id}", get(artist_detail))
        .route("/{id}/delete", get(delete_artist))
        .route("/{id}/edit", get(edit_artist_form).post(edit_artist))
}

async fn list_artists(State(state): State<AppState>) -> Result<Response, AppError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?;
    // The artists page is a flat name listing, unlike the grouped venues page.
    let listing = name_listing(&artists);

    let tmpl = state.templates.get_template("pages/artists.html")?;
    let html = tmpl.render(context! { artists => listing })?;
    Ok(Html(html).into_response())
}

async fn search_artists(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?;
    let results = search_by_name(&artists, &form.search_term);

    let tmpl = state.templates.get_template("pages/search_artists.html")?;
    let html = tmpl.render(context! {
        results => results,
        search_term => form.search_term,
    })?;
    Ok(Html(html).into_response())
}

async fn artist_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let artist = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let shows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await?;

    let venues_by_id: HashMap<i32, venue::Model> = venue::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    let page = build_artist_page(artist, shows, &venues_by_id, Utc::now().naive_utc());

    let tmpl = state.templates.get_template("pages/show_artist.html")?;
    let html = tmpl.render(context! { artist => page })?;
    Ok(Html(html).into_response())
}

async fn new_artist_form(
    State(state): State<AppState>,
    Query(params): Query<FlashParams>,
) -> Result<Response, AppError> {
    let tmpl = state.templates.get_template("forms/new_artist.html")?;
    let html = tmpl.render(context! { flash => params.flash })?;
    Ok(Html(html).into_response())
}

async fn create_artist(
    State(state): State<AppState>,
    Form(form): Form<ArtistForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim().to_string();
    let new_artist = match form.into_active_model() {
        Ok(model) => model,
        Err(err) => {
            return Ok(redirect_with_flash("/artists/create", &err.to_string()).into_response());
        }
    };

    match new_artist.insert(&state.db).await {
        Ok(_) => Ok(redirect_with_flash(
            "/",
            &format!("Artist {name} was successfully listed!"),
        )
        .into_response()),
        Err(err) => {
            tracing::error!(error = %err, "failed to create artist");
            Ok(redirect_with_flash(
                "/artists/create",
                &format!("Artist {name} could not be listed."),
            )
            .into_response())
        }
    }
}

async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let artist = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let txn = state.db.begin().await?;

    if let Err(err) = show::Entity::delete_many()
        .filter(show::Column::ArtistId.eq(id))
        .exec(&txn)
        .await
    {
        let _ = txn.rollback().await;
        tracing::error!(error = %err, artist_id = id, "failed to delete shows for artist");
        return Ok(redirect_with_flash(
            &format!("/artists/{id}"),
            &format!("Artist {} could not be deleted.", artist.name),
        )
        .into_response());
    }

    if let Err(err) = artist::Entity::delete_by_id(id).exec(&txn).await {
        let _ = txn.rollback().await;
        tracing::error!(error = %err, artist_id = id, "failed to delete artist");
        return Ok(redirect_with_flash(
            &format!("/artists/{id}"),
            &format!("Artist {} could not be deleted.", artist.name),
        )
        .into_response());
    }

    txn.commit().await?;

    Ok(redirect_with_flash(
        "/",
        &format!("Artist {} was successfully deleted!", artist.name),
    )
    .into_response())
}

async fn edit_artist_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<FlashParams>,
) -> Result<Response, AppError> {
    let artist = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = state.templates.get_template("forms/edit_artist.html")?;
    let html = tmpl.render(context! { artist => artist, flash => params.flash })?;
    Ok(Html(html).into_response())
}

async fn edit_artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ArtistForm>,
) -> Result<Response, AppError> {
    if artist::Entity::find_by_id(id).one(&state.db).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let updated = match form.apply(id) {
        Ok(model) => model,
        Err(err) => {
            return Ok(
                redirect_with_flash(&format!("/artists/{id}/edit"), &err.to_string())
                    .into_response(),
            );
        }
    };

    match updated.update(&state.db).await {
        Ok(_) => Ok(Redirect::to(&format!("/artists/{id}")).into_response()),
        Err(err) => {
            tracing::error!(error = %err, artist_id = id, "failed to update artist");
            Ok(redirect_with_flash(
                &format!("/artists/{id}/edit"),
                "Artist could not be updated.",
            )
            .into_response())
        }
    }
}
