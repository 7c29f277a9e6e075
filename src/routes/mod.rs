//! The REST API: one module per resource, assembled under `/api/...`.
//!
//! Handlers parse and validate the request body before touching the stores,
//! so the core only ever sees well-formed values. Write bodies are read as
//! plain JSON values rather than typed payloads; the helpers below turn a
//! missing or empty required field into a 400 instead of a deserialization
//! rejection.

mod budget;
mod earning;
mod expenditure;
mod finance;
mod summary;
mod tip;
mod transaction;
mod user;

use axum::Router;
use serde_json::Value;

use crate::{AppState, Error, models::Amount};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/users", user::router())
        .nest("/api/earnings", earning::router())
        .nest("/api/expenditures", expenditure::router())
        .nest("/api/sumsUserMonthEarnings", summary::earnings_router())
        .nest(
            "/api/sumsUserMonthExpenditures",
            summary::expenditures_router(),
        )
        .nest("/api/budgets", budget::router())
        .nest("/api/finances", finance::router())
        .nest("/api/tips", tip::router())
        .with_state(state)
}

/// A body field as text, if present and non-empty. Numbers are accepted and
/// rendered, since clients historically sent amounts and years both ways.
fn body_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

/// A required body field; missing or empty maps to a 400.
fn require_text(body: &Value, field: &'static str) -> Result<String, Error> {
    body_text(body, field).ok_or(Error::MissingField(field))
}

/// A required decimal amount field.
fn require_amount(body: &Value, field: &'static str) -> Result<Amount, Error> {
    Amount::parse(&require_text(body, field)?)
}

/// An optional decimal amount field; absent means zero.
fn amount_or_zero(body: &Value, field: &str) -> Result<Amount, Error> {
    match body_text(body, field) {
        Some(text) => Amount::parse(&text),
        None => Ok(Amount::ZERO),
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::AppState;

    use super::build_router;

    /// A test server over a fresh in-memory state, remembering cookies so
    /// the auth cookie set at registration carries to later requests.
    pub fn test_server() -> (TestServer, AppState) {
        let state = AppState::in_memory("foobar");
        let server = TestServer::builder()
            .save_cookies()
            .build(build_router(state.clone()));

        (server, state)
    }

    /// Register the default test user and return their profile.
    pub async fn register_test_user(server: &TestServer) -> Value {
        let response = server
            .post("/api/users")
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "averysafeandsecurepassword",
                "passwordCheck": "averysafeandsecurepassword",
                "goal": "Save for a bicycle",
            }))
            .await;

        response.assert_status_ok();

        response.json::<Value>()
    }
}

#[cfg(test)]
mod body_helper_tests {
    use serde_json::json;

    use super::{amount_or_zero, body_text, require_amount, require_text};
    use crate::Error;

    #[test]
    fn empty_strings_count_as_missing() {
        let body = json!({ "title": "" });

        assert_eq!(body_text(&body, "title"), None);
        assert_eq!(
            require_text(&body, "title"),
            Err(Error::MissingField("title"))
        );
    }

    #[test]
    fn numbers_are_read_as_text() {
        let body = json!({ "year": 2022, "amount": 41 });

        assert_eq!(body_text(&body, "year"), Some("2022".to_string()));
        assert_eq!(
            require_amount(&body, "amount").unwrap().to_string(),
            "41.00"
        );
    }

    #[test]
    fn absent_amounts_default_to_zero() {
        let body = json!({});

        assert_eq!(
            amount_or_zero(&body, "salary").unwrap().to_string(),
            "0.00"
        );
    }
}
