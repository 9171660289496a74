//! 好友模块对外 DTO

use crate::social::friend::models::{FriendRequest, SendOutcome};
use crate::social::identity::Identity;
use serde::{Deserialize, Serialize};

/// 搜索结果中的一个候选用户，附带与当前用户的关系
///
/// 三个标记分别独立计算，互不排斥。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRelation {
    pub user: Identity,
    /// 当前用户发给对方、仍待处理
    pub has_sent_request: bool,
    /// 对方发给当前用户、仍待处理
    pub has_received_request: bool,
    /// 任一方向存在已接受的申请
    pub is_friend: bool,
}

/// 发送好友申请响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestResp {
    pub outcome: SendOutcome,
    pub request: FriendRequest,
}

/// 拒绝好友申请响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequestResp {
    pub rejected: bool,
    pub request: Option<FriendRequest>,
}
