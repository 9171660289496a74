//! 业务错误定义
//!
//! 校验类错误（密码不一致、邮箱重复、搜索词非法、给自己发申请、频率限制等）
//! 都属于“提示”，会通过统一响应结构返回给调用方，而不是让请求失败。

use thiserror::Error;

/// 业务层统一错误类型
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Please enter a valid name, not an email.")]
    InvalidSearchTerm,

    #[error("You cannot send a friend request to yourself.")]
    SelfRequest,

    #[error("You have reached the limit for sending friend requests.")]
    RateLimited,

    #[error("You have already sent a friend request.")]
    AlreadyRequested,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Friend request already exists")]
    DuplicateRequest,

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type SocialResult<T> = Result<T, SocialError>;

impl SocialError {
    /// 对外错误码（写入响应的 errCode 字段）
    pub fn code(&self) -> i32 {
        match self {
            SocialError::PasswordMismatch => 1001,
            SocialError::DuplicateEmail => 1002,
            SocialError::EmailRequired => 1003,
            SocialError::InvalidCredential => 1004,
            SocialError::Unauthenticated => 1005,
            SocialError::InvalidSearchTerm => 1101,
            SocialError::SelfRequest => 1201,
            SocialError::RateLimited => 1202,
            SocialError::AlreadyRequested => 1203,
            SocialError::NotFound(_) => 1204,
            SocialError::DuplicateRequest => 1205,
            SocialError::Database(_) | SocialError::Internal(_) => 500,
        }
    }

    /// 是否为面向用户的提示（非基础设施故障）
    pub fn is_notice(&self) -> bool {
        !matches!(
            self,
            SocialError::Unauthenticated | SocialError::Database(_) | SocialError::Internal(_)
        )
    }
}

/// 判断 sqlx 错误是否来自唯一约束冲突
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}
