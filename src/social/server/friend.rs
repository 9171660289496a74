//! 好友相关 handler：搜索、发送/接受/拒绝申请以及各类列表

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use crate::social::friend::{RejectOutcome, RejectRequestResp, SendOutcome, SendRequestResp};
use crate::social::server::response::{authenticate, reply, reply_with_notice};
use crate::social::server::SharedState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    search: String,
    page: Option<String>,
}

pub async fn search_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(q): Query<SearchQuery>,
) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };
    match state
        .search
        .search(viewer.id, &q.search, q.page.as_deref())
        .await
    {
        Ok(page) => reply(page),
        Err(e) => e.into_response(),
    }
}

pub async fn send_request_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };

    let sent = match state.workflow.send(viewer.id, user_id, Utc::now()).await {
        Ok(sent) => sent,
        Err(e) => return e.into_response(),
    };

    let notice = match sent.outcome {
        SendOutcome::Created => format!("Friend request sent to {}.", sent.target.name),
        SendOutcome::Resent => format!("Friend request sent again to {}.", sent.target.name),
    };
    reply_with_notice(
        SendRequestResp {
            outcome: sent.outcome,
            request: sent.request,
        },
        notice,
    )
}

pub async fn accept_request_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(request_id): Path<i64>,
) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };
    match state.workflow.accept(viewer.id, request_id).await {
        Ok(request) => reply(request),
        Err(e) => e.into_response(),
    }
}

pub async fn reject_request_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(request_id): Path<i64>,
) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };
    match state.workflow.reject(viewer.id, request_id).await {
        Ok(RejectOutcome::Rejected(request)) => reply_with_notice(
            RejectRequestResp {
                rejected: true,
                request: Some(request),
            },
            "Friend request has been rejected.",
        ),
        Ok(RejectOutcome::NothingToReject) => reply_with_notice(
            RejectRequestResp {
                rejected: false,
                request: None,
            },
            "No pending friend request to reject.",
        ),
        Err(e) => e.into_response(),
    }
}

pub async fn pending_requests_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };
    match state.workflow.list_pending(viewer.id).await {
        Ok(list) => reply(list),
        Err(e) => e.into_response(),
    }
}

pub async fn friends_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };
    match state.workflow.list_friends(viewer.id).await {
        Ok(list) => reply(list),
        Err(e) => e.into_response(),
    }
}

pub async fn rejected_requests_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let viewer = match authenticate(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(resp) => return resp,
    };
    match state.workflow.list_rejected(viewer.id).await {
        Ok(list) => reply(list),
        Err(e) => e.into_response(),
    }
}
