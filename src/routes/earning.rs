//! Routes for earnings. The handler logic lives in
//! [transaction](super::transaction); these handlers bind it to the earning
//! store and the earning sums.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use crate::{AppState, Error, auth::AuthUser, models::Earning, routes::transaction};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/latestFiveEntries/{month}/{year}", get(latest_five))
        .route("/{id}", get(fetch).patch(patch).delete(remove))
        .route("/{month}/{year}", get(list_for_month))
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, Error> {
    transaction::list(state.earnings.as_ref(), &user_id)
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Earning>), Error> {
    let created = transaction::create(
        state.earnings.as_ref(),
        state.earning_sums.as_ref(),
        &state.summary_guard,
        &user_id,
        &body,
    )?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn fetch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Earning>, Error> {
    transaction::fetch(state.earnings.as_ref(), &user_id, &id).map(Json)
}

async fn patch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    transaction::patch(
        state.earnings.as_ref(),
        state.earning_sums.as_ref(),
        &state.summary_guard,
        &user_id,
        &id,
        &body,
    )
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    transaction::remove(
        state.earnings.as_ref(),
        state.earning_sums.as_ref(),
        &state.summary_guard,
        &user_id,
        &id,
    )
}

async fn list_for_month(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Value>, Error> {
    let results = transaction::list_for_month(state.earnings.as_ref(), &user_id, &month, &year)?;

    Ok(Json(json!({ "results": results })))
}

async fn latest_five(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Value>, Error> {
    let results = transaction::latest_five(state.earnings.as_ref(), &user_id, &month, &year)?;

    Ok(Json(json!({ "results": results })))
}
