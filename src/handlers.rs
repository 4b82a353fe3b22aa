use crate::errors::AppError;
use crate::models::{LoginRequest, SessionState};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.controller.current()))
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.controller.current())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<SessionState>), AppError> {
    state
        .controller
        .submit(&payload.username, &payload.password)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(state.controller.current())))
}

pub async fn refresh(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionState>), AppError> {
    state.controller.refresh().await?;
    Ok((StatusCode::ACCEPTED, Json(state.controller.current())))
}

pub async fn logout(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.controller.logout().await)
}

pub async fn login_form(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> Redirect {
    if let Err(err) = state
        .controller
        .submit(&payload.username, &payload.password)
        .await
    {
        warn!("login form rejected: {err}");
    }
    Redirect::to("/")
}

pub async fn refresh_form(State(state): State<AppState>) -> Redirect {
    if let Err(err) = state.controller.refresh().await {
        warn!("refresh rejected: {err}");
    }
    Redirect::to("/")
}

pub async fn logout_form(State(state): State<AppState>) -> Redirect {
    state.controller.logout().await;
    Redirect::to("/")
}
