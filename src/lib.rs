use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Pure core: question queries and access decisions. No I/O, no logging.
pub mod gate;
pub mod query;

// Service layer around the core.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Route tiers (Public, Authenticated, Admin).
pub mod routes;
use auth::{GateState, access_gate};
use gate::{AccessRequirement, Role};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every handler and schema, served at
/// `/api-docs/openapi.json` and rendered by the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_questions, handlers::search_questions, handlers::get_question,
        handlers::get_upvotes, handlers::get_categories, handlers::get_nav,
        handlers::register_user, handlers::get_me, handlers::create_question,
        handlers::toggle_upvote, handlers::update_question, handlers::delete_question,
        handlers::get_admin_stats
    ),
    components(
        schemas(
            models::Question, models::Difficulty, models::CategorySet, models::User,
            models::CreateQuestionRequest, models::UpdateQuestionRequest,
            models::UpvoteResponse, models::UpvoteCount, models::UserProfile,
            models::AdminDashboardStats, models::RegisterUserRequest,
            models::RegisterUserResponse, query::QueryResult, gate::NavItem,
        )
    ),
    tags(
        (name = "interview-prep", description = "Interview question browsing API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request handler may need, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    /// Question, vote and user storage.
    pub repo: RepositoryState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the three route tiers, each behind the access gate for its
/// requirement, then applies the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let gated = |requirement: AccessRequirement| {
        middleware::from_fn_with_state(
            GateState {
                app: state.clone(),
                requirement,
            },
            access_gate,
        )
    };

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes().route_layer(gated(AccessRequirement::Public)))
        .merge(
            authenticated::authenticated_routes()
                .route_layer(gated(AccessRequirement::AuthenticatedOnly)),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(gated(AccessRequirement::RequiresRole(Role::Admin))),
        )
        .with_state(state.clone());

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` generated above
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
