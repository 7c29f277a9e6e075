//! Routes for budgets.
//!
//! A stored budget only caches `target` and `funds` as of its last write;
//! every read recomputes the projection from the current monthly sums, so
//! responses always reflect what has actually been earned and spent.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::AuthUser,
    budget::BudgetProjection,
    models::{
        Amount, Budget, BudgetingStyle, ExpenditureCategory, NewBudget, validate_month,
        validate_year,
    },
    routes::{body_text, require_text},
    stores::{Filter, Patch, Record, RecordStore},
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).patch(patch).delete(remove))
        .route("/{month}/{year}", get(list_for_month))
}

/// A budget as returned to the client: the stored record with its
/// projection recomputed from the current sums.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetView {
    #[serde(flatten)]
    budget: Budget,
    expenses: Amount,
    funds_remaining: Amount,
}

/// What the current monthly sums say about a budget's month: total
/// earnings, and spending in the budget's category.
fn current_totals(
    state: &AppState,
    user_id: &str,
    month: &str,
    year: &str,
    category: ExpenditureCategory,
) -> Result<(Amount, Amount), Error> {
    let filter = Filter::new()
        .field("userId", user_id)
        .field("month", month)
        .field("year", year);

    let earnings_total = state
        .earning_sums
        .find_one(&filter)?
        .map(|row| row.total_sum)
        .unwrap_or(Amount::ZERO);
    let expenses = state
        .expenditure_sums
        .find_one(&filter)?
        .map(|row| row.category_total(category))
        .unwrap_or(Amount::ZERO);

    Ok((earnings_total, expenses))
}

fn project(state: &AppState, mut budget: Budget) -> Result<BudgetView, Error> {
    let (earnings_total, expenses) = current_totals(
        state,
        &budget.user_id,
        &budget.month,
        &budget.year,
        budget.category,
    )?;

    let projection = BudgetProjection::compute(
        budget.budgeting_style,
        budget.category,
        earnings_total,
        expenses,
    );
    budget.target = projection.target;
    budget.funds = projection.funds;

    Ok(BudgetView {
        budget,
        expenses: projection.expenses,
        funds_remaining: projection.funds_remaining,
    })
}

fn owned_by(id: &str, user_id: &str) -> Filter {
    Filter::new().field("id", id).field("userId", user_id)
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, Error> {
    let budgets = state
        .budgets
        .find_all(&Filter::new().field("userId", &user_id))?;
    let results = budgets
        .into_iter()
        .map(|budget| project(&state, budget))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(json!({ "results": results })))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<BudgetView>), Error> {
    let category = ExpenditureCategory::parse(&require_text(&body, "category")?)?;
    let month = require_text(&body, "month")?;
    validate_month(&month)?;
    let year = require_text(&body, "year")?;
    validate_year(&year)?;
    let budgeting_style = BudgetingStyle::parse(&require_text(&body, "budgetingStyle")?)?;
    let text = body_text(&body, "text").unwrap_or_default();

    let (earnings_total, expenses) = current_totals(&state, &user_id, &month, &year, category)?;
    let projection =
        BudgetProjection::compute(budgeting_style, category, earnings_total, expenses);

    let budget = state.budgets.create(NewBudget {
        user_id,
        category,
        text,
        target: projection.target,
        funds: projection.funds,
        month,
        year,
        budgeting_style,
    })?;

    Ok((StatusCode::CREATED, Json(project(&state, budget)?)))
}

async fn fetch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BudgetView>, Error> {
    let budget = state
        .budgets
        .find_one(&owned_by(&id, &user_id))?
        .ok_or(Error::NotFound)?;

    Ok(Json(project(&state, budget)?))
}

/// Merge the submitted fields and refresh the cached `target`/`funds` for
/// the budget's resulting category, style, and month.
async fn patch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    let existing = state
        .budgets
        .find_one(&owned_by(&id, &user_id))?
        .ok_or(Error::NotFound)?;

    let mut patch = Patch::new();
    let mut category = existing.category;
    let mut month = existing.month.clone();
    let mut year = existing.year.clone();
    let mut budgeting_style = existing.budgeting_style;

    if let Some(text) = body_text(&body, "text") {
        patch = patch.field("text", text);
    }
    if let Some(text) = body_text(&body, "category") {
        category = ExpenditureCategory::parse(&text)?;
        patch = patch.field("category", category.as_str());
    }
    if let Some(text) = body_text(&body, "month") {
        validate_month(&text)?;
        month = text.clone();
        patch = patch.field("month", text);
    }
    if let Some(text) = body_text(&body, "year") {
        validate_year(&text)?;
        year = text.clone();
        patch = patch.field("year", text);
    }
    if let Some(text) = body_text(&body, "budgetingStyle") {
        budgeting_style = BudgetingStyle::parse(&text)?;
        patch = patch.field("budgetingStyle", budgeting_style.as_str());
    }

    let (earnings_total, expenses) = current_totals(&state, &user_id, &month, &year, category)?;
    let projection =
        BudgetProjection::compute(budgeting_style, category, earnings_total, expenses);
    patch = patch
        .field("target", projection.target.to_string())
        .field("funds", projection.funds.to_string());

    state.budgets.update(existing.id(), &patch)
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let Some(existing) = state.budgets.find_one(&owned_by(&id, &user_id))? else {
        return Ok(());
    };

    state.budgets.delete(existing.id())
}

async fn list_for_month(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Value>, Error> {
    validate_month(&month)?;
    validate_year(&year)?;

    let budgets = state.budgets.find_all(
        &Filter::new()
            .field("userId", &user_id)
            .field("month", &month)
            .field("year", &year),
    )?;
    let results = budgets
        .into_iter()
        .map(|budget| project(&state, budget))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(json!({ "results": results })))
}

#[cfg(test)]
mod budget_route_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        routes::test_utils::{register_test_user, test_server},
        stores::{Filter, RecordStore},
    };

    async fn create_budget(server: &axum_test::TestServer, category: &str, style: &str) -> Value {
        let response = server
            .post("/api/budgets")
            .json(&json!({
                "category": category,
                "month": "04",
                "year": "2022",
                "budgetingStyle": style,
                "text": "Keep it modest",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        response.json::<Value>()
    }

    async fn create_earning(server: &axum_test::TestServer, amount: &str) {
        server
            .post("/api/earnings")
            .json(&json!({
                "title": "Pay day",
                "category": "salary",
                "amount": amount,
                "creationDate": "2022-04-12",
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn budget_funds_follow_the_monthly_earnings() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        create_earning(&server, "2000").await;
        let budget = create_budget(&server, "rent", "balanced").await;

        assert_eq!(budget["target"], "0.30");
        assert_eq!(budget["funds"], "600.00");
        assert_eq!(budget["expenses"], "0.00");
        assert_eq!(budget["fundsRemaining"], "600.00");
    }

    #[tokio::test]
    async fn reads_recompute_instead_of_trusting_the_cache() {
        let (server, state) = test_server();
        register_test_user(&server).await;

        // Created before any earnings, so the stored cache says zero funds.
        let budget = create_budget(&server, "rent", "balanced").await;
        let id = budget["id"].as_str().unwrap().to_string();
        assert_eq!(budget["funds"], "0.00");

        create_earning(&server, "1000").await;

        let read_back = server
            .get(&format!("/api/budgets/{id}"))
            .await
            .json::<Value>();
        assert_eq!(read_back["funds"], "300.00");
        assert_eq!(read_back["fundsRemaining"], "300.00");

        // The stored record still carries the stale cache; only the
        // response was recomputed.
        let stored = state.budgets.find_one(&Filter::by_id(&id)).unwrap().unwrap();
        assert_eq!(stored.funds.to_string(), "0.00");
    }

    #[tokio::test]
    async fn expenses_reduce_funds_remaining() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        create_earning(&server, "1000").await;
        server
            .post("/api/expenditures")
            .json(&json!({
                "title": "Groceries",
                "category": "food",
                "amount": "50.40",
                "creationDate": "2022-04-13",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let budget = create_budget(&server, "food", "balanced").await;

        // 15% of 1000 = 150.00; 150.00 − 50.40 rounds to 100.
        assert_eq!(budget["funds"], "150.00");
        assert_eq!(budget["expenses"], "50.40");
        assert_eq!(budget["fundsRemaining"], "100.00");
    }

    #[tokio::test]
    async fn style_patch_refreshes_the_cached_projection() {
        let (server, state) = test_server();
        register_test_user(&server).await;

        create_earning(&server, "1000").await;
        let budget = create_budget(&server, "rent", "balanced").await;
        let id = budget["id"].as_str().unwrap().to_string();

        server
            .patch(&format!("/api/budgets/{id}"))
            .json(&json!({ "budgetingStyle": "saver" }))
            .await
            .assert_status_ok();

        let stored = state.budgets.find_one(&Filter::by_id(&id)).unwrap().unwrap();
        assert_eq!(stored.target.to_string(), "0.25");
        assert_eq!(stored.funds.to_string(), "250.00");
    }

    #[tokio::test]
    async fn create_validates_category_and_style() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        server
            .post("/api/budgets")
            .json(&json!({
                "category": "yachts",
                "month": "04",
                "year": "2022",
                "budgetingStyle": "balanced",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/budgets")
            .json(&json!({
                "category": "rent",
                "month": "04",
                "year": "2022",
                "budgetingStyle": "reckless",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn month_listing_returns_projected_budgets() {
        let (server, _state) = test_server();
        register_test_user(&server).await;

        create_earning(&server, "1000").await;
        create_budget(&server, "rent", "balanced").await;
        create_budget(&server, "food", "balanced").await;

        let response = server.get("/api/budgets/04/2022").await;
        response.assert_status_ok();

        let results = response.json::<Value>();
        let budgets = results["results"].as_array().unwrap();
        assert_eq!(budgets.len(), 2);
        assert!(
            budgets
                .iter()
                .all(|budget| budget["funds"].as_str().is_some())
        );
    }
}
