pub mod social;

// 重新导出常用类型，方便外部使用
pub use social::{
    app::SocialApp,
    config::{AppConfig, RateLimitConfig},
    error::{SocialError, SocialResult},
    friend::{RelationshipQuery, RequestWorkflow},
    identity::{Identity, IdentityStore, PasswordParams},
};
