use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Read-only browsing plus registration. Guarded by `AccessRequirement::Public`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Creates a standard-role profile and hands back a bearer token.
        .route("/register", post(handlers::register_user))
        // GET /questions?company=...&topic=...&sort=...&page=...&pageSize=...
        // Filtered, sorted and optionally paginated listing.
        .route("/questions", get(handlers::get_questions))
        // GET /questions/search?q=...
        // Keyword search across text, company and topic.
        .route("/questions/search", get(handlers::search_questions))
        // GET /questions/{id}
        .route("/questions/{id}", get(handlers::get_question))
        // GET /questions/{id}/upvotes
        .route("/questions/{id}/upvotes", get(handlers::get_upvotes))
        // GET /categories
        // Company, topic and role choices for the filter form.
        .route("/categories", get(handlers::get_categories))
        // GET /nav
        // Navigation items for whoever is asking.
        .route("/nav", get(handlers::get_nav))
}
