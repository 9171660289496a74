//! 用户身份服务层

use crate::social::config::RateLimitConfig;
use crate::social::error::{is_unique_violation, SocialError, SocialResult};
use crate::social::friend::dao::FriendRequestDao;
use crate::social::identity::dao::IdentityDao;
use crate::social::identity::models::{normalize_email, Identity};
use crate::social::identity::password::PasswordHasher;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{debug, info, warn};

/// 用户存储：注册、登录校验、好友关系读取与发送频率限制
#[derive(Clone)]
pub struct IdentityStore {
    db: Pool<Sqlite>,
    dao: IdentityDao,
    hasher: PasswordHasher,
    rate_limit: RateLimitConfig,
}

impl IdentityStore {
    pub fn new(db: Pool<Sqlite>, hasher: PasswordHasher, rate_limit: RateLimitConfig) -> Self {
        Self {
            db,
            dao: IdentityDao::new(),
            hasher,
            rate_limit,
        }
    }

    /// 注册普通用户
    pub async fn create(&self, email: &str, name: &str, password: &str) -> SocialResult<Identity> {
        self.create_with_role(email, name, password, false).await
    }

    /// 注册管理员用户
    pub async fn create_staff(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> SocialResult<Identity> {
        self.create_with_role(email, name, password, true).await
    }

    async fn create_with_role(
        &self,
        email: &str,
        name: &str,
        password: &str,
        is_staff: bool,
    ) -> SocialResult<Identity> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(SocialError::EmailRequired);
        }

        let mut conn = self.db.acquire().await?;
        if self.dao.email_exists(&mut conn, &email).await? {
            debug!("[IdentityStore] 邮箱已存在: {}", email);
            return Err(SocialError::DuplicateEmail);
        }

        let password_hash = self.hasher.spawn_hash(password).await?;
        let created_at = Utc::now().timestamp_millis();

        // 并发注册同一邮箱时由唯一约束兜底
        let id = match self
            .dao
            .insert(&mut conn, &email, name, &password_hash, is_staff, created_at)
            .await
        {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => return Err(SocialError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        };

        info!(
            "[IdentityStore] 新用户注册: id={}, email={}, staff={}",
            id, email, is_staff
        );
        Ok(Identity {
            id,
            email,
            name: name.to_string(),
            is_active: true,
            is_staff,
            created_at,
        })
    }

    /// 校验邮箱和密码，邮箱忽略大小写；停用账号视为校验失败
    pub async fn verify(&self, email: &str, password: &str) -> SocialResult<Identity> {
        let email = normalize_email(email);
        let mut conn = self.db.acquire().await?;
        let record = match self.dao.find_by_email(&mut conn, &email).await? {
            Some(record) => record,
            None => {
                // 用户不存在时同样计算一次哈希，使耗时一致
                let _ = self.hasher.spawn_hash(password).await;
                return Err(SocialError::InvalidCredential);
            }
        };

        if !self.hasher.spawn_verify(password, &record.password_hash).await? {
            warn!("[IdentityStore] 密码错误: {}", email);
            return Err(SocialError::InvalidCredential);
        }
        if !record.identity.is_active {
            warn!("[IdentityStore] 账号已停用: {}", email);
            return Err(SocialError::InvalidCredential);
        }
        Ok(record.identity)
    }

    pub async fn get(&self, id: i64) -> SocialResult<Identity> {
        let mut conn = self.db.acquire().await?;
        self.dao
            .get(&mut conn, id)
            .await?
            .ok_or(SocialError::NotFound("user"))
    }

    /// 是否还能发送好友申请：窗口内已发送数量小于上限
    pub async fn can_send_friend_request(
        &self,
        identity_id: i64,
        now: DateTime<Utc>,
    ) -> SocialResult<bool> {
        let mut conn = self.db.acquire().await?;
        can_send_friend_request_with(&mut conn, &self.rate_limit, identity_id, now).await
    }

    /// 好友关系表中的好友 ID
    pub async fn friend_ids(&self, identity_id: i64) -> SocialResult<Vec<i64>> {
        let mut conn = self.db.acquire().await?;
        Ok(self.dao.friend_ids(&mut conn, identity_id).await?)
    }
}

/// 在给定连接（或事务）上执行频率检查，每次重新统计，不保存状态
pub(crate) async fn can_send_friend_request_with(
    conn: &mut SqliteConnection,
    rate_limit: &RateLimitConfig,
    identity_id: i64,
    now: DateTime<Utc>,
) -> SocialResult<bool> {
    let window_ms = i64::try_from(rate_limit.window.as_millis()).unwrap_or(i64::MAX);
    let since = now.timestamp_millis().saturating_sub(window_ms);
    let recent = FriendRequestDao::new()
        .count_sent_since(conn, identity_id, since)
        .await?;
    debug!(
        "[IdentityStore] 用户 {} 窗口内已发送 {} 个申请（上限 {}）",
        identity_id, recent, rate_limit.max_requests
    );
    Ok(recent < rate_limit.max_requests)
}
