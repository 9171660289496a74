//! 统一响应构造

use crate::social::error::SocialError;
use crate::social::identity::Identity;
use crate::social::server::SharedState;
use crate::social::types::ApiResponse;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// 会话 token 所在的请求头
pub const TOKEN_HEADER: &str = "token";

/// 成功响应
pub fn reply<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

/// 成功响应并附带提示
pub fn reply_with_notice<T: Serialize>(data: T, notice: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok_with_notice(data, notice))).into_response()
}

impl IntoResponse for SocialError {
    fn into_response(self) -> Response {
        let status = match &self {
            SocialError::Unauthenticated => StatusCode::UNAUTHORIZED,
            SocialError::Database(_) | SocialError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // 业务提示照常返回 200，由 errCode 区分
            _ => StatusCode::OK,
        };

        let message = if self.is_notice() || status == StatusCode::UNAUTHORIZED {
            self.to_string()
        } else {
            error!("[HTTP] 内部错误: {:?}", self);
            "internal error".to_string()
        };

        (status, Json(ApiResponse::<()>::error(self.code(), message))).into_response()
    }
}

/// 读取请求头中的 token
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 解析当前登录用户
pub async fn authenticate(state: &SharedState, headers: &HeaderMap) -> Result<Identity, Response> {
    let token = session_token(headers).ok_or_else(|| SocialError::Unauthenticated.into_response())?;
    state
        .sessions
        .resolve(token)
        .await
        .map_err(|e| e.into_response())
}
