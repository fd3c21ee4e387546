use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use uuid::Uuid;

use crate::{
    AppState,
    config::{AppConfig, Env},
    error::ApiError,
    gate::{self, AccessRequirement, Decision, Session},
    models::User,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the bearer tokens this service accepts. Only the subject is
/// trusted; the role is looked up on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the id of a known user.
    pub sub: Uuid,
    /// Expiration time (seconds since the epoch). Always validated.
    pub exp: usize,
    /// Issued at.
    pub iat: usize,
}

/// issue_token
///
/// Signs a token for `user_id` valid for `ttl`.
pub fn issue_token(
    user_id: Uuid,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + ttl.as_secs()) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// resolve_user
///
/// Works out who sent the request, if anyone:
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming a known user.
/// 2. A valid `Authorization: Bearer` token whose subject is a known user.
///
/// Any failure along the way yields `None`.
pub async fn resolve_user(parts: &Parts, repo: &RepositoryState, config: &AppConfig) -> Option<User> {
    if config.env == Env::Local {
        let bypass_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|id| Uuid::parse_str(id).ok());

        if let Some(user_id) = bypass_id {
            if let Some(user) = repo.get_user(user_id).await {
                return Some(user);
            }
        }
    }

    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))?;

    let mut validation = Validation::default();
    validation.validate_exp = true;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let claims = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = ?e.kind(), "rejected bearer token");
            return None;
        }
    };

    // A valid token for a user that no longer exists grants nothing.
    repo.get_user(claims.sub).await
}

/// resolve_session
///
/// Turns the request credentials into a `Session`. The server resolves
/// credentials synchronously per request, so it never produces `Pending`.
pub async fn resolve_session(parts: &Parts, repo: &RepositoryState, config: &AppConfig) -> Session {
    match resolve_user(parts, repo, config).await {
        Some(user) => Session::Authenticated { user: user.into() },
        None => Session::Anonymous,
    }
}

/// Session Extractor
///
/// Never rejects: missing or invalid credentials simply produce `Anonymous`.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        Ok(resolve_session(parts, &repo, &config).await)
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request, for handlers that act on
/// behalf of the viewer (submitting, voting).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
}

/// AuthUser Extractor
///
/// Rejects with 401 when no user can be resolved.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let user = resolve_user(parts, &repo, &config)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            id: user.id,
            display_name: user.display_name,
            role: user.role,
        })
    }
}

/// GateState
///
/// State handed to `access_gate`: the application state plus the requirement
/// of the route group the middleware wraps.
#[derive(Clone)]
pub struct GateState {
    pub app: AppState,
    pub requirement: AccessRequirement,
}

/// access_gate
///
/// Middleware guarding a route group. Resolves the session fresh for every
/// request and lets it through only when `authorize` allows it.
pub async fn access_gate(State(gate): State<GateState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let session = resolve_session(&parts, &gate.app.repo, &gate.app.config).await;

    match gate::authorize(&session, &gate.requirement) {
        Decision::Allow => next.run(Request::from_parts(parts, body)).await,
        Decision::Deny(screen) => {
            tracing::info!(
                uri = %parts.uri,
                requirement = ?gate.requirement,
                redirect = screen.path(),
                "access denied"
            );
            ApiError::Denied(screen).into_response()
        }
        Decision::Await => ApiError::SessionPending.into_response(),
    }
}
