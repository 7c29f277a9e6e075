//! Routes for the two monthly sum resources.
//!
//! Reading a month with no stored row never 404s: the response is an
//! all-zero sum synthesized at the read boundary, and no row is written.
//! The handlers are generic over the sum kind; the two routers bind them to
//! the earning and expenditure sum stores.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch as patch_route, post},
};
use serde_json::Value;

use crate::{
    AppState, Error,
    auth::AuthUser,
    models::{
        Amount, MonthlyEarningSum, MonthlyExpenditureSum, MonthlySummary, validate_month,
        validate_year,
    },
    routes::{amount_or_zero, body_text, require_text},
    stores::{Filter, Patch, RecordStore, from_document},
    summary::zero_document,
};

pub(crate) fn earnings_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_earning_sum))
        .route("/{id}", patch_route(patch_earning_sum).delete(remove_earning_sum))
        .route("/{month}/{year}", get(fetch_earning_sum))
}

pub(crate) fn expenditures_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_expenditure_sum))
        .route(
            "/{id}",
            patch_route(patch_expenditure_sum).delete(remove_expenditure_sum),
        )
        .route("/{month}/{year}", get(fetch_expenditure_sum))
}

/// The stored sum row for the month, or the synthesized zero sum when none
/// exists yet.
fn fetch_for_month<S: MonthlySummary>(
    store: &dyn RecordStore<S>,
    user_id: &str,
    month: &str,
    year: &str,
) -> Result<Json<Value>, Error> {
    validate_month(month)?;
    validate_year(year)?;

    let filter = Filter::new()
        .field("userId", user_id)
        .field("month", month)
        .field("year", year);

    match store.find_one(&filter)? {
        Some(row) => Ok(Json(serde_json::to_value(row)?)),
        None => Ok(Json(Value::Object(zero_document::<S>(user_id, month, year)))),
    }
}

fn create<S: MonthlySummary>(
    store: &dyn RecordStore<S>,
    user_id: &str,
    body: &Value,
) -> Result<S, Error> {
    let month = require_text(body, "month")?;
    validate_month(&month)?;
    let year = require_text(body, "year")?;
    validate_year(&year)?;

    let mut doc = zero_document::<S>(user_id, &month, &year);
    doc.insert(
        "totalSum".to_string(),
        Value::String(amount_or_zero(body, "totalSum")?.to_string()),
    );
    for bucket in S::BUCKETS {
        doc.insert(
            (*bucket).to_string(),
            Value::String(amount_or_zero(body, bucket)?.to_string()),
        );
    }

    store.create(from_document::<S::Draft>(doc)?)
}

fn patch<S: MonthlySummary>(
    store: &dyn RecordStore<S>,
    user_id: &str,
    id: &str,
    body: &Value,
) -> Result<(), Error> {
    let existing = store
        .find_one(&Filter::new().field("id", id).field("userId", user_id))?
        .ok_or(Error::NotFound)?;

    let mut patch = Patch::new();
    if let Some(text) = body_text(body, "totalSum") {
        patch = patch.field("totalSum", Amount::parse(&text)?.to_string());
    }
    for bucket in S::BUCKETS {
        if let Some(text) = body_text(body, bucket) {
            patch = patch.field(*bucket, Amount::parse(&text)?.to_string());
        }
    }

    if patch.is_empty() {
        return Ok(());
    }

    store.update(existing.id(), &patch)
}

fn remove<S: MonthlySummary>(
    store: &dyn RecordStore<S>,
    user_id: &str,
    id: &str,
) -> Result<(), Error> {
    let Some(existing) = store
        .find_one(&Filter::new().field("id", id).field("userId", user_id))?
    else {
        return Ok(());
    };

    store.delete(existing.id())
}

async fn fetch_earning_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Value>, Error> {
    fetch_for_month(state.earning_sums.as_ref(), &user_id, &month, &year)
}

async fn create_earning_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<MonthlyEarningSum>), Error> {
    let created = create(state.earning_sums.as_ref(), &user_id, &body)?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn patch_earning_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    patch(state.earning_sums.as_ref(), &user_id, &id, &body)
}

async fn remove_earning_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    remove(state.earning_sums.as_ref(), &user_id, &id)
}

async fn fetch_expenditure_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Value>, Error> {
    fetch_for_month(state.expenditure_sums.as_ref(), &user_id, &month, &year)
}

async fn create_expenditure_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<MonthlyExpenditureSum>), Error> {
    let created = create(state.expenditure_sums.as_ref(), &user_id, &body)?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn patch_expenditure_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    patch(state.expenditure_sums.as_ref(), &user_id, &id, &body)
}

async fn remove_expenditure_sum(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    remove(state.expenditure_sums.as_ref(), &user_id, &id)
}

#[cfg(test)]
mod summary_route_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        routes::test_utils::{register_test_user, test_server},
        stores::{Filter, RecordStore},
    };

    #[tokio::test]
    async fn absent_month_reads_as_zeros_without_storing_a_row() {
        let (server, state) = test_server();
        register_test_user(&server).await;

        let response = server.get("/api/sumsUserMonthEarnings/04/2022").await;
        response.assert_status_ok();

        let sum = response.json::<Value>();
        assert_eq!(sum["month"], "04");
        assert_eq!(sum["year"], "2022");
        assert_eq!(sum["totalSum"], "0.00");
        assert_eq!(sum["salary"], "0.00");
        assert_eq!(sum["other"], "0.00");

        // The zero response is synthesized, never materialized.
        assert!(
            state
                .earning_sums
                .find_all(&Filter::new())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn invalid_month_or_year_is_a_bad_request() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        server
            .get("/api/sumsUserMonthEarnings/13/2022")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/sumsUserMonthEarnings/04/22")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn created_sum_reads_back_for_its_month() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        server
            .post("/api/sumsUserMonthExpenditures")
            .json(&json!({
                "month": "04",
                "year": "2022",
                "totalSum": "20.00",
                "health": "20.00",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let sum = server
            .get("/api/sumsUserMonthExpenditures/04/2022")
            .await
            .json::<Value>();

        assert_eq!(sum["totalSum"], "20.00");
        assert_eq!(sum["health"], "20.00");
        assert_eq!(sum["rent"], "0.00");
    }

    #[tokio::test]
    async fn creating_a_sum_requires_month_and_year() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        server
            .post("/api/sumsUserMonthEarnings")
            .json(&json!({ "totalSum": "41.00" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_overwrites_the_given_buckets() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        let created = server
            .post("/api/sumsUserMonthEarnings")
            .json(&json!({
                "month": "04",
                "year": "2022",
                "totalSum": "41.00",
                "salary": "41.00",
            }))
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();

        server
            .patch(&format!("/api/sumsUserMonthEarnings/{id}"))
            .json(&json!({ "totalSum": "12.00", "salary": "12.00" }))
            .await
            .assert_status_ok();

        let sum = server
            .get("/api/sumsUserMonthEarnings/04/2022")
            .await
            .json::<Value>();
        assert_eq!(sum["totalSum"], "12.00");
        assert_eq!(sum["salary"], "12.00");
    }

    #[tokio::test]
    async fn patching_an_unknown_id_is_not_found() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        server
            .patch("/api/sumsUserMonthEarnings/no-such-id")
            .json(&json!({ "totalSum": "12.00" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleted_sum_reads_as_zeros_again() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        let created = server
            .post("/api/sumsUserMonthEarnings")
            .json(&json!({
                "month": "04",
                "year": "2022",
                "totalSum": "41.00",
                "salary": "41.00",
            }))
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();

        server
            .delete(&format!("/api/sumsUserMonthEarnings/{id}"))
            .await
            .assert_status_ok();

        let sum = server
            .get("/api/sumsUserMonthEarnings/04/2022")
            .await
            .json::<Value>();
        assert_eq!(sum["totalSum"], "0.00");
    }
}
