use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/saved", get(handlers::saved))
        .route("/calculate", post(handlers::calculate))
        .route("/:tab/scenarios/:id/view", post(handlers::view_scenario))
        .route("/:tab/modal/close", post(handlers::close_modal))
        .route("/:tab/scenarios/:id/delete", post(handlers::request_delete))
        .route("/:tab/delete/confirm", post(handlers::confirm_delete))
        .route("/:tab/delete/cancel", post(handlers::cancel_delete))
        .route("/api/state", get(handlers::get_state))
        .with_state(state)
}
