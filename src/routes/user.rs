//! Routes for account management: registration, sign-in/out, profile, and
//! account deletion.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::CookieJar;
use bcrypt::DEFAULT_COST;
use serde_json::Value;

use crate::{
    AppState, Error,
    auth::{self, AuthUser},
    models::{NewUser, UserProfile},
    routes::{body_text, require_text},
    stores::{Filter, Patch, RecordStore},
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).delete(delete_account))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", delete(sign_out))
        .route("/{id}", get(profile).patch(patch_profile))
}

/// Create an account and sign the new user in.
///
/// The password is stored as a bcrypt hash; responses never include it.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Result<(CookieJar, Json<UserProfile>), Error> {
    let name = require_text(&body, "name")?;
    let email = require_text(&body, "email")?;
    let password = require_text(&body, "password")?;
    let password_check = require_text(&body, "passwordCheck")?;

    if password != password_check {
        return Err(Error::PasswordMismatch);
    }

    if state
        .users
        .find_one(&Filter::new().field("email", &email))?
        .is_some()
    {
        return Err(Error::DuplicateEmail);
    }

    let user = state.users.create(NewUser {
        name,
        email,
        password: bcrypt::hash(&password, DEFAULT_COST)?,
        goal: body_text(&body, "goal"),
    })?;

    let token = state.auth_keys.issue_token(&user.id)?;

    Ok((jar.add(auth::auth_cookie(token)), Json(user.into())))
}

async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>), Error> {
    let email = require_text(&body, "email")?;
    let password = require_text(&body, "password")?;

    let Some(user) = state
        .users
        .find_one(&Filter::new().field("email", &email))?
    else {
        return Err(Error::InvalidCredentials);
    };

    if !bcrypt::verify(&password, &user.password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = state.auth_keys.issue_token(&user.id)?;

    Ok((
        StatusCode::CREATED,
        jar.add(auth::auth_cookie(token)),
        Json(user.into()),
    ))
}

async fn sign_out(jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::OK, jar.add(auth::removal_cookie()))
}

/// The signed-in user's profile. The path id is accepted for compatibility;
/// the token decides whose profile is returned.
async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(_id): Path<String>,
) -> Result<Json<UserProfile>, Error> {
    let user = state
        .users
        .find_one(&Filter::by_id(&user_id))?
        .ok_or(Error::NotFound)?;

    Ok(Json(user.into()))
}

async fn patch_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(), Error> {
    let mut patch = Patch::new();

    if let Some(name) = body_text(&body, "name") {
        patch = patch.field("name", name);
    }
    if let Some(email) = body_text(&body, "email") {
        patch = patch.field("email", email);
    }
    if let Some(goal) = body_text(&body, "goal") {
        patch = patch.field("goal", goal);
    }
    if let Some(password) = body_text(&body, "password") {
        patch = patch.field("password", bcrypt::hash(&password, DEFAULT_COST)?);
    }

    if patch.is_empty() {
        return Ok(());
    }

    state.users.update(&user_id, &patch)
}

/// Delete the account and every record it owns, then clear the auth cookie.
async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), Error> {
    let owned = Filter::new().field("userId", &user_id);

    state.users.delete(&user_id)?;
    state.earnings.delete_all(&owned)?;
    state.expenditures.delete_all(&owned)?;
    state.earning_sums.delete_all(&owned)?;
    state.expenditure_sums.delete_all(&owned)?;
    state.budgets.delete_all(&owned)?;
    state.finances.delete_all(&owned)?;
    state.tips.delete_all(&owned)?;

    Ok((StatusCode::OK, jar.add(auth::removal_cookie())))
}
