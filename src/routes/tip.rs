//! Routes for savings tips.
//!
//! The tip list and individual tips are public reads; creating, editing,
//! and deleting tips requires a signed-in user.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::AuthUser,
    models::{NewTip, Tip},
    routes::{body_text, require_text},
    stores::{Filter, Patch, Record, RecordStore},
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).patch(patch).delete(remove))
}

/// All tips, from every user.
async fn list(State(state): State<AppState>) -> Result<Json<Value>, Error> {
    let results = state.tips.find_all(&Filter::new())?;

    Ok(Json(json!({ "results": results })))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Tip>), Error> {
    let category = require_text(&body, "category")?;
    let text = require_text(&body, "text")?;

    let tip = state.tips.create(NewTip {
        user_id,
        category,
        text,
        finance_id: body_text(&body, "financeId"),
    })?;

    Ok((StatusCode::CREATED, Json(tip)))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tip>, Error> {
    state
        .tips
        .find_one(&Filter::by_id(&id))?
        .map(Json)
        .ok_or(Error::NotFound)
}

/// Edit one of the caller's own tips.
async fn patch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    let existing = state
        .tips
        .find_one(&Filter::new().field("id", &id).field("userId", &user_id))?
        .ok_or(Error::NotFound)?;

    let mut patch = Patch::new();
    if let Some(text) = body_text(&body, "text") {
        patch = patch.field("text", text);
    }
    if let Some(category) = body_text(&body, "category") {
        patch = patch.field("category", category);
    }

    if patch.is_empty() {
        return Ok(());
    }

    state.tips.update(existing.id(), &patch)
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let Some(existing) = state
        .tips
        .find_one(&Filter::new().field("id", &id).field("userId", &user_id))?
    else {
        return Ok(());
    };

    state.tips.delete(existing.id())
}
