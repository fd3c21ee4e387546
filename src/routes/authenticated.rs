use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Actions taken on behalf of a signed-in viewer. Guarded by
/// `AccessRequirement::AuthenticatedOnly`; handlers additionally extract
/// `AuthUser` to learn who is acting.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The viewer's own profile.
        .route("/me", get(handlers::get_me))
        // POST /questions
        // Submits a new question.
        .route("/questions", post(handlers::create_question))
        // POST /questions/{id}/upvote
        // Toggles the viewer's single vote on a question.
        .route("/questions/{id}/upvote", post(handlers::toggle_upvote))
}
