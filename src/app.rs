use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login_form))
        .route("/refresh", post(handlers::refresh_form))
        .route("/logout", post(handlers::logout_form))
        .route("/api/session", get(handlers::get_session))
        .route("/api/login", post(handlers::login))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/logout", post(handlers::logout))
        .with_state(state)
}
