use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    gate::{self, NavItem, Role, Session},
    models::{
        AdminDashboardStats, CategorySet, CreateQuestionRequest, Question, RegisterUserRequest,
        RegisterUserResponse, UpdateQuestionRequest, UpvoteCount, UpvoteResponse, User,
        UserProfile,
    },
    query::{self, QueryResult, QuerySpec},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Lifetime of tokens issued at registration.
const TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24);

// --- Filter Structs ---

/// SearchParams
///
/// Query parameters for the keyword search endpoint (GET /questions/search).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SearchParams {
    /// Keyword matched case-insensitively against text, company and topic.
    pub q: Option<String>,
}

// --- Public Handlers ---

/// get_questions
///
/// [Public Route] Lists questions matching the filter, sort and page parameters.
#[utoipa::path(
    get,
    path = "/questions",
    params(QuerySpec),
    responses(
        (status = 200, description = "Matching questions", body = QueryResult),
        (status = 400, description = "Invalid pagination or sort, or a malformed parameter")
    )
)]
pub async fn get_questions(
    State(state): State<AppState>,
    spec: Result<Query<QuerySpec>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Query(spec) = spec.inspect_err(|e| {
        tracing::warn!(error = %e.body_text(), "malformed question query");
    })?;
    let questions = state.repo.all_questions().await;

    let result = query::query(&questions, &spec).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected question query");
    })?;

    tracing::debug!(
        total_matched = result.total_matched,
        returned = result.items.len(),
        "question query served"
    );
    Ok(Json(result))
}

/// search_questions
///
/// [Public Route] Keyword search, newest first. A missing or blank keyword
/// returns everything.
#[utoipa::path(
    get,
    path = "/questions/search",
    params(SearchParams),
    responses((status = 200, description = "Matching questions", body = QueryResult))
)]
pub async fn search_questions(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Query(params) = params?;
    let spec = QuerySpec {
        keyword: params.q,
        ..QuerySpec::default()
    };
    let questions = state.repo.all_questions().await;
    Ok(Json(query::query(&questions, &spec)?))
}

/// get_question
///
/// [Public Route] Retrieves a single question by id.
#[utoipa::path(
    get,
    path = "/questions/{id}",
    params(("id" = String, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Found", body = Question),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Question>, ApiError> {
    match state.repo.get_question(&id).await {
        Some(question) => Ok(Json(question)),
        None => Err(ApiError::NotFound(id)),
    }
}

/// get_upvotes
///
/// [Public Route] Current upvote count of a question.
#[utoipa::path(
    get,
    path = "/questions/{id}/upvotes",
    params(("id" = String, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Upvote count", body = UpvoteCount),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_upvotes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpvoteCount>, ApiError> {
    let question = state
        .repo
        .get_question(&id)
        .await
        .ok_or(ApiError::NotFound(id))?;

    Ok(Json(UpvoteCount {
        question_id: question.id,
        upvotes: question.upvotes,
    }))
}

/// get_categories
///
/// [Public Route] Filter choices. Served from the independent catalog when one
/// was seeded, otherwise derived from the current collection.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Companies, topics and roles", body = CategorySet))
)]
pub async fn get_categories(State(state): State<AppState>) -> Json<CategorySet> {
    if let Some(catalog) = state.repo.category_catalog().await {
        return Json(catalog);
    }
    let questions = state.repo.all_questions().await;
    Json(query::categories(&questions))
}

/// get_nav
///
/// [Public Route] Navigation items appropriate to the caller's session.
#[utoipa::path(
    get,
    path = "/nav",
    responses((status = 200, description = "Visible navigation items", body = [NavItem]))
)]
pub async fn get_nav(session: Session) -> Json<Vec<NavItem>> {
    Json(gate::visible_nav_items(&session))
}

/// register_user
///
/// [Public Route] Creates a standard-role profile and returns a bearer token
/// for it. The role is never taken from the request.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterUserResponse),
        (status = 422, description = "Empty display name")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), ApiError> {
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::Validation("'display_name' must not be empty".to_string()));
    }

    let user = state
        .repo
        .create_user(User {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            role: Role::Standard.as_str().to_string(),
        })
        .await;

    let token = auth::issue_token(user.id, &state.config.jwt_secret, TOKEN_TTL).map_err(|e| {
        tracing::error!(error = %e, "failed to sign registration token");
        ApiError::Internal("could not issue a token".to_string())
    })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(RegisterUserResponse { user, token })))
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The viewer's own profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    AuthUser {
        id,
        display_name,
        role,
    }: AuthUser,
) -> Json<UserProfile> {
    Json(UserProfile {
        id,
        display_name,
        role,
    })
}

/// create_question
///
/// [Authenticated Route] Submits a new question.
#[utoipa::path(
    post,
    path = "/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Created", body = Question),
        (status = 422, description = "Empty field")
    )
)]
pub async fn create_question(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let question = state.repo.create_question(payload).await;
    tracing::info!(question_id = %question.id, %user_id, "question submitted");

    Ok((StatusCode::CREATED, Json(question)))
}

/// toggle_upvote
///
/// [Authenticated Route] Adds the caller's vote, or removes it if they had
/// already voted. Each viewer holds at most one vote per question.
#[utoipa::path(
    post,
    path = "/questions/{id}/upvote",
    params(("id" = String, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Vote toggled", body = UpvoteResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn toggle_upvote(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpvoteResponse>, ApiError> {
    let response = state
        .repo
        .toggle_upvote(&id, user_id)
        .await
        .ok_or(ApiError::NotFound(id))?;

    tracing::debug!(
        question_id = %response.question_id,
        %user_id,
        upvoted = response.upvoted,
        "vote toggled"
    );
    Ok(Json(response))
}

// --- Admin Handlers ---

/// update_question
///
/// [Admin Route] Edits the text, topic or difficulty of a question.
#[utoipa::path(
    put,
    path = "/admin/questions/{id}",
    params(("id" = String, Path, description = "Question ID")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Updated", body = Question),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Empty field")
    )
)]
pub async fn update_question(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<Json<Question>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let question = state
        .repo
        .update_question(&id, payload)
        .await
        .ok_or(ApiError::NotFound(id))?;

    tracing::info!(question_id = %question.id, %admin_id, "question updated");
    Ok(Json(question))
}

/// delete_question
///
/// [Admin Route] Removes a question and every vote recorded on it.
#[utoipa::path(
    delete,
    path = "/admin/questions/{id}",
    params(("id" = String, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_question(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.repo.delete_question(&id).await {
        tracing::info!(question_id = %id, %admin_id, "question deleted");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_admin_stats
///
/// [Admin Route] Totals for the administrative dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Json<AdminDashboardStats> {
    Json(state.repo.get_stats().await)
}
