//! 应用组装：连接数据库并创建各服务

use crate::social::auth::SessionStore;
use crate::social::config::AppConfig;
use crate::social::db::create_sqlite_pool_with_migration;
use crate::social::friend::{RelationshipQuery, RequestWorkflow};
use crate::social::identity::{IdentityStore, PasswordHasher};
use anyhow::Result;
use sqlx::{Pool, Sqlite};
use tracing::info;

/// 所有业务服务的集合，各服务共享同一个连接池
#[derive(Clone)]
pub struct SocialApp {
    pub config: AppConfig,
    pub pool: Pool<Sqlite>,
    pub identities: IdentityStore,
    pub workflow: RequestWorkflow,
    pub search: RelationshipQuery,
    pub sessions: SessionStore,
}

impl SocialApp {
    /// 连接配置中的数据库（执行迁移）并创建服务
    pub async fn connect(config: AppConfig) -> Result<Self> {
        let pool = create_sqlite_pool_with_migration(&config.db_url).await?;
        Self::with_pool(config, pool)
    }

    /// 使用已有连接池创建服务
    pub fn with_pool(config: AppConfig, pool: Pool<Sqlite>) -> Result<Self> {
        let hasher = PasswordHasher::new(config.password)?;
        let identities = IdentityStore::new(pool.clone(), hasher, config.rate_limit.clone());
        let workflow = RequestWorkflow::new(pool.clone(), config.rate_limit.clone());
        let search = RelationshipQuery::new(pool.clone(), config.page_size);
        let sessions = SessionStore::new(pool.clone(), identities.clone());

        info!(
            "[App] 服务已创建，每页 {} 条，频率限制 {} 次 / {:?}",
            config.page_size, config.rate_limit.max_requests, config.rate_limit.window
        );
        Ok(Self {
            config,
            pool,
            identities,
            workflow,
            search,
            sessions,
        })
    }
}
