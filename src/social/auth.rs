//! 注册、登录与会话
//!
//! 登录成功后签发一个随机 token，之后的请求通过 `token` 头携带。

use crate::social::error::{SocialError, SocialResult};
use crate::social::identity::{Identity, IdentityStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: Identity,
}

/// 会话存储
#[derive(Clone)]
pub struct SessionStore {
    db: Pool<Sqlite>,
    identities: IdentityStore,
}

impl SessionStore {
    pub fn new(db: Pool<Sqlite>, identities: IdentityStore) -> Self {
        Self { db, identities }
    }

    /// 注册：两次密码必须一致
    pub async fn signup(&self, req: &SignupRequest) -> SocialResult<Identity> {
        if req.password != req.confirm_password {
            return Err(SocialError::PasswordMismatch);
        }
        self.identities
            .create(&req.email, &req.name, &req.password)
            .await
    }

    /// 登录：校验邮箱密码并签发新 token
    pub async fn login(&self, req: &LoginRequest) -> SocialResult<LoginData> {
        let user = self.identities.verify(&req.email, &req.password).await?;
        let token = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user.id)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.db)
            .await?;

        info!("[Auth] 用户 {} 登录成功", user.id);
        Ok(LoginData { token, user })
    }

    /// 根据 token 找到当前用户；token 无效或账号已停用时返回 `Unauthenticated`
    pub async fn resolve(&self, token: &str) -> SocialResult<Identity> {
        let row = sqlx::query("SELECT user_id FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.db)
            .await?;
        let Some(row) = row else {
            debug!("[Auth] 未知的 token");
            return Err(SocialError::Unauthenticated);
        };

        let user_id: i64 = row.get("user_id");
        match self.identities.get(user_id).await {
            Ok(user) if user.is_active => Ok(user),
            Ok(_) | Err(SocialError::NotFound(_)) => Err(SocialError::Unauthenticated),
            Err(e) => Err(e),
        }
    }

    /// 退出登录；未知 token 直接忽略
    pub async fn logout(&self, token: &str) -> SocialResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.db)
            .await?;
        debug!("[Auth] 退出登录，删除会话 {} 条", result.rows_affected());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::test_util::{init_test_logger, test_app};

    fn signup_req(email: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: "Dana".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[tokio::test]
    async fn signup_requires_matching_passwords() -> anyhow::Result<()> {
        init_test_logger();
        let app = test_app().await?;
        assert!(matches!(
            app.sessions.signup(&signup_req("d@x.com", "a", "b")).await,
            Err(SocialError::PasswordMismatch)
        ));
        let user = app.sessions.signup(&signup_req("D@X.com", "a", "a")).await?;
        assert_eq!(user.email, "d@x.com");
        assert!(matches!(
            app.sessions.signup(&signup_req("d@x.com", "a", "a")).await,
            Err(SocialError::DuplicateEmail)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn login_resolve_logout_round_trip() -> anyhow::Result<()> {
        let app = test_app().await?;
        let user = app.sessions.signup(&signup_req("d@x.com", "pw", "pw")).await?;

        let login = app
            .sessions
            .login(&LoginRequest {
                email: "D@x.com".to_string(),
                password: "pw".to_string(),
            })
            .await?;
        assert_eq!(login.user.id, user.id);
        assert_eq!(app.sessions.resolve(&login.token).await?.id, user.id);

        app.sessions.logout(&login.token).await?;
        assert!(matches!(
            app.sessions.resolve(&login.token).await,
            Err(SocialError::Unauthenticated)
        ));
        // 重复退出不报错
        app.sessions.logout(&login.token).await?;
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credential() -> anyhow::Result<()> {
        let app = test_app().await?;
        app.sessions.signup(&signup_req("d@x.com", "pw", "pw")).await?;
        assert!(matches!(
            app.sessions
                .login(&LoginRequest {
                    email: "d@x.com".to_string(),
                    password: "nope".to_string(),
                })
                .await,
            Err(SocialError::InvalidCredential)
        ));
        Ok(())
    }
}
