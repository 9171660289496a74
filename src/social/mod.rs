pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod friend;
pub mod identity;
pub mod server;
pub mod types;
pub mod validation;

pub use app::SocialApp;
pub use config::{AppConfig, RateLimitConfig};
pub use error::{SocialError, SocialResult};
