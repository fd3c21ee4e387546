use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use interview_prep::{
    AppState, InMemoryRepository,
    auth::{AuthUser, Claims, issue_token},
    config::{AppConfig, Env},
    gate::{Role, Session},
    models::User,
    repository::SeedData,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn known_user(id: Uuid, role: &str) -> User {
    User {
        id,
        display_name: format!("{} user", role),
        role: role.to_string(),
    }
}

fn create_app_state(env: Env, users: Vec<User>) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    let repo = InMemoryRepository::new(SeedData {
        users,
        ..SeedData::default()
    });

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// Builds a token whose `exp` is `exp_offset` seconds away from now (negative = expired).
fn create_token(user_id: Uuid, exp_offset: i64, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

fn with_bypass(user_id: Uuid) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user_id.to_string()).unwrap(),
    );
    parts
}

async fn session_for(parts: &mut Parts, state: &AppState) -> Session {
    match Session::from_request_parts(parts, state).await {
        Ok(session) => session,
        Err(never) => match never {},
    }
}

// --- AuthUser ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "standard")]);
    let mut parts = with_bearer(&create_token(TEST_USER_ID, 3600, TEST_JWT_SECRET));

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, "standard");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "standard")]);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "standard")]);
    // Well past the default 60s leeway.
    let mut parts = with_bearer(&create_token(TEST_USER_ID, -3600, TEST_JWT_SECRET));

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "standard")]);
    let mut parts = with_bearer(&create_token(TEST_USER_ID, 3600, "some-other-secret"));

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_for_unknown_subject() {
    let state = create_app_state(Env::Production, vec![]);
    let mut parts = with_bearer(&create_token(TEST_USER_ID, 3600, TEST_JWT_SECRET));

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_issued_token_is_accepted() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "admin")]);
    let token = issue_token(TEST_USER_ID, TEST_JWT_SECRET, Duration::from_secs(600)).unwrap();
    let mut parts = with_bearer(&token);

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();

    assert_eq!(user.role, "admin");
}

// --- Local Bypass ---

#[tokio::test]
async fn test_local_bypass_success() {
    let user_id = Uuid::new_v4();
    let state = create_app_state(Env::Local, vec![known_user(user_id, "admin")]);
    let mut parts = with_bypass(user_id);

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.role, "admin");
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let user_id = Uuid::new_v4();
    let state = create_app_state(Env::Production, vec![known_user(user_id, "admin")]);
    let mut parts = with_bypass(user_id);

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

// --- Session ---

#[tokio::test]
async fn test_session_is_anonymous_without_credentials() {
    let state = create_app_state(Env::Production, vec![]);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    assert_eq!(session_for(&mut parts, &state).await, Session::Anonymous);
}

#[tokio::test]
async fn test_session_is_anonymous_with_garbage_token() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "standard")]);
    let mut parts = with_bearer("not-a-jwt");

    assert_eq!(session_for(&mut parts, &state).await, Session::Anonymous);
}

#[tokio::test]
async fn test_session_carries_user_role() {
    let state = create_app_state(Env::Production, vec![known_user(TEST_USER_ID, "admin")]);
    let mut parts = with_bearer(&create_token(TEST_USER_ID, 3600, TEST_JWT_SECRET));

    let session = session_for(&mut parts, &state).await;
    let user = session.user().expect("session should be authenticated");

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role(), Some(Role::Admin));
}
