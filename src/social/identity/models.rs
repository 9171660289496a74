//! 用户本地模型定义

use serde::{Deserialize, Serialize};

/// 用户（注册账号）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "userID")]
    pub id: i64,
    /// 已统一转为小写
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    /// 创建时间（毫秒）
    pub created_at: i64,
}

/// 带密码哈希的用户记录，只在登录校验时使用，不对外序列化
#[derive(Debug, Clone)]
pub(crate) struct IdentityRecord {
    pub identity: Identity,
    pub password_hash: String,
}

/// 统一邮箱格式：去掉首尾空白并转为小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
