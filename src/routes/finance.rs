//! Routes for finance overviews: the record grouping a month's budgets
//! under one budgeting style.

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
    models::{BudgetingStyle, Finance, NewFinance, validate_month, validate_year},
    routes::{body_text, require_text},
    stores::{Filter, Patch, Record, RecordStore},
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).patch(patch).delete(remove))
        .route("/{month}/{year}", get(fetch_for_month))
}

fn owned_by(id: &str, user_id: &str) -> Filter {
    Filter::new().field("id", id).field("userId", user_id)
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, Error> {
    let results = state
        .finances
        .find_all(&Filter::new().field("userId", &user_id))?;

    Ok(Json(json!({ "results": results })))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Finance>), Error> {
    let title = require_text(&body, "title")?;
    let month = require_text(&body, "month")?;
    validate_month(&month)?;
    let year = require_text(&body, "year")?;
    validate_year(&year)?;
    let budgeting_style = BudgetingStyle::parse(&require_text(&body, "budgetingStyle")?)?;

    let finance = state.finances.create(NewFinance {
        user_id,
        title,
        month,
        year,
        budgeting_style,
    })?;

    Ok((StatusCode::CREATED, Json(finance)))
}

async fn fetch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Finance>, Error> {
    state
        .finances
        .find_one(&owned_by(&id, &user_id))?
        .map(Json)
        .ok_or(Error::NotFound)
}

async fn patch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    let existing = state
        .finances
        .find_one(&owned_by(&id, &user_id))?
        .ok_or(Error::NotFound)?;

    let mut patch = Patch::new();
    if let Some(title) = body_text(&body, "title") {
        patch = patch.field("title", title);
    }
    if let Some(month) = body_text(&body, "month") {
        validate_month(&month)?;
        patch = patch.field("month", month);
    }
    if let Some(year) = body_text(&body, "year") {
        validate_year(&year)?;
        patch = patch.field("year", year);
    }
    if let Some(text) = body_text(&body, "budgetingStyle") {
        patch = patch.field("budgetingStyle", BudgetingStyle::parse(&text)?.as_str());
    }

    if patch.is_empty() {
        return Ok(());
    }

    state.finances.update(existing.id(), &patch)
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let Some(existing) = state.finances.find_one(&owned_by(&id, &user_id))? else {
        return Ok(());
    };

    state.finances.delete(existing.id())
}

/// The user's finance overview for one month; at most one is expected.
async fn fetch_for_month(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Finance>, Error> {
    validate_month(&month)?;
    validate_year(&year)?;

    state
        .finances
        .find_one(
            &Filter::new()
                .field("userId", &user_id)
                .field("month", &month)
                .field("year", &year),
        )?
        .map(Json)
        .ok_or(Error::NotFound)
}
