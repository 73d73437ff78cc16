use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{error::AppError, models::Session, routes::documents::AppState};

pub const SESSION_COOKIE: &str = "flatdoc_session";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub user: Option<String>,
    pub flash: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// A TTL that does not fit in a timestamp is an `AppError::Internal`.
pub fn encode_session(session: &Session, secret: &str, ttl_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = TimeDelta::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::Internal(format!("session TTL out of range: {}h", ttl_hours)))?;

    let claims = SessionClaims {
        user: session.username.clone(),
        flash: session.flash.clone(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Tampered, expired or otherwise unreadable tokens yield `None`.
pub fn decode_session(token: &str, secret: &str) -> Option<Session> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| Session {
        username: data.claims.user,
        flash: data.claims.flash,
    })
    .map_err(|e| tracing::debug!("Discarding session cookie: {}", e))
    .ok()
}

/// The request's session plus what is needed to write it back.
pub struct SessionContext {
    pub session: Session,
    jar: CookieJar,
    secret: String,
    ttl_hours: i64,
}

impl SessionContext {
    fn from_parts(parts: &Parts, state: &AppState) -> Self {
        let jar = CookieJar::from_headers(&parts.headers);
        let session = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| decode_session(cookie.value(), &state.session_secret))
            .unwrap_or_default();

        Self {
            session,
            jar,
            secret: state.session_secret.clone(),
            ttl_hours: state.session_ttl_hours,
        }
    }

    /// Returns the jar carrying `session` as the response cookie.
    pub fn commit(self, session: &Session) -> Result<CookieJar, AppError> {
        let token = encode_session(session, &self.secret, self.ttl_hours)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        Ok(self.jar.add(cookie))
    }

    /// Commits `session` and redirects to `to`.
    pub fn redirect(self, session: &Session, to: &str) -> Result<Response, AppError> {
        Ok((self.commit(session)?, Redirect::to(to)).into_response())
    }
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state))
    }
}

/// Guard for mutating routes. Anonymous requests are redirected to `/`
/// with a flash explaining that signing in is required.
pub struct SignedIn {
    pub username: String,
    pub ctx: SessionContext,
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_parts(parts, state);

        let rejected = match ctx.session.require_signed_in() {
            Ok(username) => {
                let username = username.to_string();
                return Ok(SignedIn { username, ctx });
            }
            Err(rejected) => rejected,
        };

        tracing::info!("Rejected anonymous {} {}", parts.method, parts.uri.path());
        Err(ctx
            .redirect(&rejected, "/")
            .unwrap_or_else(IntoResponse::into_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_survives_token_round_trip() {
        let session = Session::default().sign_in("admin").with_flash("Welcome!");
        let token = encode_session(&session, "secret", 1).unwrap();
        assert_eq!(decode_session(&token, "secret"), Some(session));
    }

    #[test]
    fn wrong_secret_yields_no_session() {
        let session = Session::default().sign_in("admin");
        let token = encode_session(&session, "secret", 1).unwrap();
        assert_eq!(decode_session(&token, "other"), None);
        assert_eq!(decode_session("garbage", "secret"), None);
    }

    #[test]
    fn expired_token_yields_no_session() {
        let session = Session::default().sign_in("admin");
        // Validation::default() allows 60s of leeway.
        let token = encode_session(&session, "secret", -1).unwrap();
        assert_eq!(decode_session(&token, "secret"), None);
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        let result = encode_session(&Session::default(), "secret", i64::MAX);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
