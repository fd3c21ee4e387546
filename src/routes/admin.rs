use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Moderation endpoints, nested under `/admin` and guarded by
/// `AccessRequirement::RequiresRole(Role::Admin)`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        .route("/stats", get(handlers::get_admin_stats))
        // PUT/DELETE /admin/questions/{id}
        // Edit or remove any question.
        .route(
            "/questions/{id}",
            put(handlers::update_question).delete(handlers::delete_question),
        )
}
