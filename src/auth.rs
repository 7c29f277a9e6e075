//! Cookie-based JWT authentication.
//!
//! Registration and sign-in issue an HS256 token carrying the user id,
//! delivered in an HTTP-only cookie; sign-out replaces it with a removal
//! cookie. Protected routes resolve the caller through the [AuthUser]
//! extractor, which rejects requests without a valid token as 401.

// Adapted from https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{AppState, Error};

/// The name of the cookie carrying the auth token.
pub const AUTH_COOKIE: &str = "jwt-token";

/// How long an issued token stays valid.
const TOKEN_DURATION: Duration = Duration::hours(1);

/// The contents of a JSON Web Token.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The id of the authenticated user.
    pub sub: String,
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
}

/// The signing and verification keys derived from the server secret.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `user_id`, valid for [TOKEN_DURATION].
    ///
    /// # Errors
    /// Returns [Error::TokenCreation] if the token cannot be signed.
    pub fn issue_token(&self, user_id: &str) -> Result<String, Error> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + TOKEN_DURATION).unix_timestamp() as usize,
            iat: now.unix_timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if the token is malformed, has a bad
    /// signature, or has expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Unauthorized)
    }
}

/// The auth cookie carrying `token`.
pub fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

/// A cookie that instructs the client to drop the auth cookie.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = auth_cookie(String::new());
    cookie.make_removal();

    cookie
}

/// The authenticated caller, resolved from the auth cookie.
///
/// Handlers taking this extractor only run for signed-in users; everything
/// else is rejected with 401 before the handler is reached.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let cookie = jar.get(AUTH_COOKIE).ok_or(Error::Unauthorized)?;
        let claims = state.auth_keys.verify_token(cookie.value())?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod auth_tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use time::{Duration, OffsetDateTime};

    use super::{AuthKeys, Claims};
    use crate::Error;

    #[test]
    fn token_round_trips_the_user_id() {
        let keys = AuthKeys::new("foobar");

        let token = keys.issue_token("user-1").unwrap();
        let claims = keys.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = AuthKeys::new("foobar");

        assert_eq!(
            keys.verify_token("not.a.token"),
            Err(Error::Unauthorized)
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let keys = AuthKeys::new("foobar");
        let other = AuthKeys::new("different secret");

        let token = other.issue_token("user-1").unwrap();

        assert_eq!(keys.verify_token(&token), Err(Error::Unauthorized));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = AuthKeys::new("foobar");

        let long_expired = OffsetDateTime::now_utc() - Duration::hours(2);
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: long_expired.unix_timestamp() as usize,
            iat: (long_expired - Duration::hours(1)).unix_timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("foobar".as_bytes()),
        )
        .unwrap();

        assert_eq!(keys.verify_token(&token), Err(Error::Unauthorized));
    }
}
