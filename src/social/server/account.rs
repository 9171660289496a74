//! 账号相关 handler：注册、登录、退出

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::social::auth::{LoginRequest, SignupRequest};
use crate::social::server::response::{reply, session_token};
use crate::social::server::SharedState;

pub async fn signup_handler(
    State(state): State<SharedState>,
    Json(req): Json<SignupRequest>,
) -> Response {
    match state.sessions.signup(&req).await {
        Ok(user) => reply(user),
        Err(e) => e.into_response(),
    }
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Response {
    match state.sessions.login(&req).await {
        Ok(data) => reply(data),
        Err(e) => e.into_response(),
    }
}

pub async fn logout_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.sessions.logout(token).await {
            return e.into_response();
        }
    }
    reply(())
}
