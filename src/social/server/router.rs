//! Axum 路由

use axum::routing::{get, post};
use axum::Router;

use crate::social::server::{account, friend, health, SharedState};

/// 构建包含所有接口的路由
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // 账号
        .route("/account/signup", post(account::signup_handler))
        .route("/account/login", post(account::login_handler))
        .route("/account/logout", post(account::logout_handler))
        // 搜索
        .route("/users/search", get(friend::search_handler))
        // 好友申请
        .route(
            "/friend/send_request/:user_id",
            post(friend::send_request_handler),
        )
        .route(
            "/friend/accept_request/:request_id",
            post(friend::accept_request_handler),
        )
        .route(
            "/friend/reject_request/:request_id",
            post(friend::reject_request_handler),
        )
        .route(
            "/friend/pending_requests",
            get(friend::pending_requests_handler),
        )
        .route("/friend/friends", get(friend::friends_handler))
        .route(
            "/friend/rejected_requests",
            get(friend::rejected_requests_handler),
        )
        .with_state(state)
}
