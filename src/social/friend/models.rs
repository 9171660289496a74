//! 好友申请模型定义

use crate::social::identity::Identity;
use serde::{Deserialize, Serialize};

/// 好友申请状态（数据库中以单字符存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_code(self) -> &'static str {
        match self {
            RequestStatus::Pending => "P",
            RequestStatus::Accepted => "A",
            RequestStatus::Rejected => "R",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(RequestStatus::Pending),
            "A" => Some(RequestStatus::Accepted),
            "R" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// 好友申请记录（from -> to 的有向边）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(rename = "requestID")]
    pub id: i64,
    #[serde(rename = "fromUserID")]
    pub from_user_id: i64,
    #[serde(rename = "toUserID")]
    pub to_user_id: i64,
    pub status: RequestStatus,
    /// 创建时间（毫秒），重新发送时不会更新
    pub created_at: i64,
}

/// 好友申请及对方用户信息（待处理列表展示发送者，被拒列表展示接收者）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithPeer {
    pub request: FriendRequest,
    pub peer: Identity,
}

/// 发送好友申请的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendOutcome {
    /// 新建了一条待处理申请
    Created,
    /// 被拒绝的申请重新变为待处理
    Resent,
}

/// 发送成功后的申请及接收者
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub outcome: SendOutcome,
    pub request: FriendRequest,
    pub target: Identity,
}

/// 拒绝好友申请的结果（找不到待处理申请时只是提示，不算错误）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectOutcome {
    Rejected(FriendRequest),
    NothingToReject,
}
