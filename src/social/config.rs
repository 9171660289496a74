//! 服务配置

use crate::social::identity::PasswordParams;
use std::time::Duration;

/// 默认每页条数（搜索结果）
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 好友申请频率限制配置（滑动窗口，每次检查时重新统计）
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// 窗口内允许发送的最大申请数
    pub max_requests: i64,
    /// 窗口长度
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window: Duration::from_secs(60),
        }
    }
}

/// 应用配置
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP 监听地址
    pub bind_addr: String,
    /// SQLite 数据库 URL，例如：`sqlite://friendbook.db`
    pub db_url: String,
    /// 搜索结果每页条数
    pub page_size: u32,
    pub rate_limit: RateLimitConfig,
    /// 密码哈希参数
    pub password: PasswordParams,
}

impl AppConfig {
    /// 创建默认配置
    pub fn new(db_url: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            db_url: db_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            rate_limit: RateLimitConfig::default(),
            password: PasswordParams::default(),
        }
    }
}
