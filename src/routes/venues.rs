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
    forms::VenueForm,
    listings::{build_venue_page, group_venues_by_location, search_by_name},
    router::AppState,
    routes::SearchForm,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_venues))
        .route("/search", post(search_venues))
        .route("/create", get(new_venue_form).post(create_venue))
        .route("/{id}", get(venue_detail))
        .route("/{id}/delete", get(delete_venue))
        .route("/{id}/edit", get(edit_venue_form).post(edit_venue))
}

async fn list_venues(State(state): State<AppState>) -> Result<Response, AppError> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::Id)
        .all(&state.db)
        .await?;
    let areas = group_venues_by_location(&venues);

    let tmpl = state.templates.get_template("pages/venues.html")?;
    let html = tmpl.render(context! { areas => areas })?;
    Ok(Html(html).into_response())
}

async fn search_venues(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::Id)
        .all(&state.db)
        .await?;
    let results = search_by_name(&venues, &form.search_term);

    let tmpl = state.templates.get_template("pages/search_venues.html")?;
    let html = tmpl.render(context! {
        results => results,
        search_term => form.search_term,
    })?;
    Ok(Html(html).into_response())
}

async fn venue_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let venue = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let shows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await?;

    let artists_by_id: HashMap<i32, artist::Model> = artist::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let page = build_venue_page(venue, shows, &artists_by_id, Utc::now().naive_utc());

    let tmpl = state.templates.get_template("pages/show_venue.html")?;
    let html = tmpl.render(context! { venue => page })?;
    Ok(Html(html).into_response())
}

async fn new_venue_form(
    State(state): State<AppState>,
    Query(params): Query<FlashParams>,
) -> Result<Response, AppError> {
    let tmpl = state.templates.get_template("forms/new_venue.html")?;
    let html = tmpl.render(context! { flash => params.flash })?;
    Ok(Html(html).into_response())
}

async fn create_venue(
    State(state): State<AppState>,
    Form(form): Form<VenueForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim().to_string();
    let new_venue = match form.into_active_model() {
        Ok(model) => model,
        Err(err) => {
            return Ok(redirect_with_flash("/venues/create", &err.to_string()).into_response());
        }
    };

    match new_venue.insert(&state.db).await {
        Ok(_) => Ok(redirect_with_flash(
            "/",
            &format!("Venue {name} was successfully listed!"),
        )
        .into_response()),
        Err(err) => {
            tracing::error!(error = %err, "failed to create venue");
            Ok(redirect_with_flash(
                "/venues/create",
                &format!("Venue {name} could not be listed."),
            )
            .into_response())
        }
    }
}

async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let venue = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    // Shows belong to the venue; remove them in the same transaction so a
    // failure leaves both intact.
    let txn = state.db.begin().await?;

    if let Err(err) = show::Entity::delete_many()
        .filter(show::Column::VenueId.eq(id))
        .exec(&txn)
        .await
    {
        let _ = txn.rollback().await;
        tracing::error!(error = %err, venue_id = id, "failed to delete shows for venue");
        return Ok(redirect_with_flash(
            &format!("/venues/{id}"),
            &format!("Venue {} could not be deleted.", venue.name),
        )
        .into_response());
    }

    if let Err(err) = venue::Entity::delete_by_id(id).exec(&txn).await {
        let _ = txn.rollback().await;
        tracing::error!(error = %err, venue_id = id, "failed to delete venue");
        return Ok(redirect_with_flash(
            &format!("/venues/{id}"),
            &format!("Venue {} could not be deleted.", venue.name),
        )
        .into_response());
    }

    txn.commit().await?;

    Ok(redirect_with_flash(
        "/",
        &format!("Venue {} was successfully deleted!", venue.name),
    )
    .into_response())
}

async fn edit_venue_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<FlashParams>,
) -> Result<Response, AppError> {
    let venue = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = state.templates.get_template("forms/edit_venue.html")?;
    let html = tmpl.render(context! { venue => venue, flash => params.flash })?;
    Ok(Html(html).into_response())
}

async fn edit_venue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<VenueForm>,
) -> Result<Response, AppError> {
    if venue::Entity::find_by_id(id).one(&state.db).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let updated = match form.apply(id) {
        Ok(model) => model,
        Err(err) => {
            return Ok(
                redirect_with_flash(&format!("/venues/{id}/edit"), &err.to_string())
                    .into_response(),
            );
        }
    };

    match updated.update(&state.db).await {
        Ok(_) => Ok(Redirect::to(&format!("/venues/{id}")).into_response()),
        Err(err) => {
            tracing::error!(error = %err, venue_id = id, "failed to update venue");
            Ok(redirect_with_flash(
                &format!("/venues/{id}/edit"),
                "Venue could not be updated.",
            )
            .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use minijinja::Environment;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn venue_model(id: i32) -> venue::Model {
        venue::Model {
            id,
            name: "The Musical Hop".to_string(),
            city: "SF".to_string(),
            state: "CA".to_string(),
            address: "1015 Folsom Street".to_string(),
            phone: None,
            image_link: None,
            facebook_link: None,
            website: None,
            seeking_talent: false,
            seeking_description: None,
            genres: vec!["Jazz".to_string()],
        }
    }

    #[tokio::test]
    async fn delete_removes_shows_before_the_venue() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![venue_model(5)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let state = AppState {
            db: crate::router::clone_connection(&db),
            templates: Arc::new(Environment::new()),
        };

        let response = delete_venue(State(state), Path(5)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let log = format!("{:?}", db.into_transaction_log());
        let show_delete = log.find(r#"DELETE FROM \"show\""#);
        let venue_delete = log.find(r#"DELETE FROM \"venue\""#);
        assert!(show_delete.is_some());
        assert!(venue_delete.is_some());
        assert!(show_delete < venue_delete);
    }

    #[tokio::test]
    async fn deleting_a_missing_venue_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();
        let state = AppState {
            db,
            templates: Arc::new(Environment::new()),
        };

        let err = delete_venue(State(state), Path(9)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
