//! 用户身份模块
//!
//! 注册、邮箱密码校验、好友关系读写以及发送好友申请的频率限制。

pub mod dao;
pub mod models;
pub mod password;
pub mod service;

pub use dao::IdentityDao;
pub use models::Identity;
pub use password::{PasswordHasher, PasswordParams};
pub use service::IdentityStore;
