use axum::{
    extract::{Request, State},
    middleware,
    response::Response,
    routing::{any, delete, get},
    Router,
};

use crate::api::{self, skills};
use crate::middleware::log_requests;
use crate::state::AppState;

/// Build the application router.
///
/// Anything not matched by method and path, including known API paths with
/// an unregistered method, falls through to the front-end delivery.
/// Every request passes through the logging middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/skill",
            get(skills::list_skills)
                .post(skills::create_skill)
                .fallback(frontend_fallback),
        )
        .route(
            "/api/skill/{skill_id}",
            delete(skills::delete_skill).fallback(frontend_fallback),
        )
        .route("/api/something", any(api::something))
        .fallback(frontend_fallback)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn frontend_fallback(State(state): State<AppState>, request: Request) -> Response {
    state.frontend.serve(request).await
}
