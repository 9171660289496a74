//! 好友申请流程服务层
//!
//! 状态流转：
//! - Pending -> Accepted：仅接收者
//! - Pending -> Rejected：仅接收者
//! - Rejected -> Pending：仅原发送者（重新发送，复用同一条记录）
//!
//! 每个写操作都在单个 `BEGIN IMMEDIATE` 事务中完成，并发写者在 busy_timeout 内排队。

use crate::social::config::RateLimitConfig;
use crate::social::db::begin_immediate;
use crate::social::error::{SocialError, SocialResult};
use crate::social::friend::dao::FriendRequestDao;
use crate::social::friend::models::{
    FriendRequest, RejectOutcome, RequestStatus, RequestWithPeer, SendOutcome, SentRequest,
};
use crate::social::identity::service::can_send_friend_request_with;
use crate::social::identity::{Identity, IdentityDao};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info, warn};

/// 好友申请流程控制器
#[derive(Clone)]
pub struct RequestWorkflow {
    db: Pool<Sqlite>,
    request_dao: FriendRequestDao,
    identity_dao: IdentityDao,
    rate_limit: RateLimitConfig,
}

impl RequestWorkflow {
    pub fn new(db: Pool<Sqlite>, rate_limit: RateLimitConfig) -> Self {
        Self {
            db,
            request_dao: FriendRequestDao::new(),
            identity_dao: IdentityDao::new(),
            rate_limit,
        }
    }

    /// 发送好友申请
    ///
    /// 已被拒绝的申请会重新变为待处理（不更新创建时间）；
    /// 待处理或已接受时返回 `AlreadyRequested`。
    pub async fn send(
        &self,
        viewer_id: i64,
        target_id: i64,
        now: DateTime<Utc>,
    ) -> SocialResult<SentRequest> {
        if viewer_id == target_id {
            return Err(SocialError::SelfRequest);
        }

        let mut tx = begin_immediate(&self.db).await?;

        let Some(target) = self.identity_dao.get(&mut tx, target_id).await? else {
            return Err(SocialError::NotFound("user"));
        };

        if !can_send_friend_request_with(&mut tx, &self.rate_limit, viewer_id, now).await? {
            info!("[Workflow] 用户 {} 发送好友申请过于频繁", viewer_id);
            return Err(SocialError::RateLimited);
        }

        let (outcome, request) = match self.request_dao.find(&mut tx, viewer_id, target_id).await? {
            None => {
                let created = match self
                    .request_dao
                    .create(&mut tx, viewer_id, target_id, now.timestamp_millis())
                    .await
                {
                    Ok(request) => request,
                    Err(SocialError::DuplicateRequest) => {
                        return Err(SocialError::AlreadyRequested)
                    }
                    Err(e) => return Err(e),
                };
                (SendOutcome::Created, created)
            }
            Some(existing) if existing.status == RequestStatus::Rejected => {
                self.request_dao
                    .set_status(&mut tx, existing.id, RequestStatus::Pending)
                    .await?;
                (
                    SendOutcome::Resent,
                    FriendRequest {
                        status: RequestStatus::Pending,
                        ..existing
                    },
                )
            }
            Some(existing) => {
                debug!(
                    "[Workflow] 申请 {} 已存在，状态 {:?}",
                    existing.id, existing.status
                );
                return Err(SocialError::AlreadyRequested);
            }
        };

        tx.commit().await?;
        info!(
            "[Workflow] 好友申请 {:?}: {} -> {} (id={})",
            outcome, viewer_id, target_id, request.id
        );
        Ok(SentRequest {
            outcome,
            request,
            target,
        })
    }

    /// 接受好友申请：状态改为已接受并双向写入好友关系，两者在同一事务中提交
    pub async fn accept(&self, viewer_id: i64, request_id: i64) -> SocialResult<FriendRequest> {
        let mut tx = begin_immediate(&self.db).await?;

        let request = self
            .request_dao
            .find_addressed(&mut tx, request_id, viewer_id, RequestStatus::Pending)
            .await?
            .ok_or_else(|| {
                warn!(
                    "[Workflow] 用户 {} 没有可接受的申请 {}",
                    viewer_id, request_id
                );
                SocialError::NotFound("friend request")
            })?;

        self.request_dao
            .set_status(&mut tx, request.id, RequestStatus::Accepted)
            .await?;
        self.identity_dao
            .add_friends(&mut tx, request.from_user_id, request.to_user_id)
            .await?;

        tx.commit().await?;
        info!(
            "[Workflow] 好友申请 {} 已接受: {} <-> {}",
            request.id, request.from_user_id, request.to_user_id
        );
        Ok(FriendRequest {
            status: RequestStatus::Accepted,
            ..request
        })
    }

    /// 拒绝好友申请；找不到待处理申请时返回 `NothingToReject`
    pub async fn reject(&self, viewer_id: i64, request_id: i64) -> SocialResult<RejectOutcome> {
        let mut tx = begin_immediate(&self.db).await?;

        let Some(request) = self
            .request_dao
            .find_addressed(&mut tx, request_id, viewer_id, RequestStatus::Pending)
            .await?
        else {
            debug!(
                "[Workflow] 用户 {} 没有可拒绝的申请 {}",
                viewer_id, request_id
            );
            return Ok(RejectOutcome::NothingToReject);
        };

        self.request_dao
            .set_status(&mut tx, request.id, RequestStatus::Rejected)
            .await?;
        tx.commit().await?;

        info!("[Workflow] 好友申请 {} 已拒绝", request.id);
        Ok(RejectOutcome::Rejected(FriendRequest {
            status: RequestStatus::Rejected,
            ..request
        }))
    }

    /// 发给当前用户的待处理申请
    pub async fn list_pending(&self, viewer_id: i64) -> SocialResult<Vec<RequestWithPeer>> {
        let mut conn = self.db.acquire().await?;
        Ok(self
            .request_dao
            .list_to_user(&mut conn, viewer_id, RequestStatus::Pending)
            .await?)
    }

    /// 任一方向存在已接受申请的用户
    pub async fn list_friends(&self, viewer_id: i64) -> SocialResult<Vec<Identity>> {
        let mut conn = self.db.acquire().await?;
        Ok(self
            .request_dao
            .list_accepted_peers(&mut conn, viewer_id)
            .await?)
    }

    /// 当前用户发出、被对方拒绝的申请
    pub async fn list_rejected(&self, viewer_id: i64) -> SocialResult<Vec<RequestWithPeer>> {
        let mut conn = self.db.acquire().await?;
        Ok(self
            .request_dao
            .list_from_user(&mut conn, viewer_id, RequestStatus::Rejected)
            .await?)
    }

    /// 按 ID 读取申请
    pub async fn get(&self, request_id: i64) -> SocialResult<FriendRequest> {
        let mut conn = self.db.acquire().await?;
        self.request_dao
            .get(&mut conn, request_id)
            .await?
            .ok_or(SocialError::NotFound("friend request"))
    }
}
