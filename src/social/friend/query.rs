//! 关系查询：按名称前缀搜索用户，并标注当前用户与每个候选人的关系

use crate::social::error::{SocialError, SocialResult};
use crate::social::friend::dao::FriendRequestDao;
use crate::social::friend::models::RequestStatus;
use crate::social::friend::types::CandidateRelation;
use crate::social::identity::{Identity, IdentityDao};
use crate::social::types::{Page, PageWindow};
use crate::social::validation::is_valid_email;
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{debug, info};

/// 关系查询引擎
#[derive(Clone)]
pub struct RelationshipQuery {
    db: Pool<Sqlite>,
    identity_dao: IdentityDao,
    request_dao: FriendRequestDao,
    page_size: u32,
}

impl RelationshipQuery {
    pub fn new(db: Pool<Sqlite>, page_size: u32) -> Self {
        Self {
            db,
            identity_dao: IdentityDao::new(),
            request_dao: FriendRequestDao::new(),
            page_size,
        }
    }

    /// 按名称前缀（忽略大小写）搜索用户
    ///
    /// 空查询返回空页；邮箱格式的查询直接拒绝，只允许按名称搜索。
    pub async fn search(
        &self,
        viewer_id: i64,
        query: &str,
        page: Option<&str>,
    ) -> SocialResult<Page<CandidateRelation>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(PageWindow::resolve(page, 0, self.page_size).into_page(Vec::new(), 0));
        }
        if is_valid_email(query) {
            info!("[Search] 用户 {} 使用邮箱搜索，已拒绝", viewer_id);
            return Err(SocialError::InvalidSearchTerm);
        }

        let mut conn = self.db.acquire().await?;
        let total = self
            .identity_dao
            .count_by_name_prefix(&mut conn, query)
            .await?;
        let window = PageWindow::resolve(page, total, self.page_size);
        let candidates = self
            .identity_dao
            .search_by_name_prefix(&mut conn, query, window.offset, window.limit)
            .await?;

        let mut items = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            items.push(self.annotate(&mut conn, viewer_id, candidate).await?);
        }

        debug!(
            "[Search] 用户 {} 搜索 {:?}：共 {} 个结果，第 {}/{} 页",
            viewer_id, query, total, window.number, window.num_pages
        );
        Ok(window.into_page(items, total))
    }

    /// 计算单个候选人的三个关系标记（各自独立查询）
    async fn annotate(
        &self,
        conn: &mut SqliteConnection,
        viewer_id: i64,
        candidate: Identity,
    ) -> SocialResult<CandidateRelation> {
        let has_sent_request = self
            .request_dao
            .exists_with_status(conn, viewer_id, candidate.id, RequestStatus::Pending)
            .await?;
        let has_received_request = self
            .request_dao
            .exists_with_status(conn, candidate.id, viewer_id, RequestStatus::Pending)
            .await?;
        let is_friend = self
            .request_dao
            .accepted_between(conn, viewer_id, candidate.id)
            .await?;

        Ok(CandidateRelation {
            user: candidate,
            has_sent_request,
            has_received_request,
            is_friend,
        })
    }
}
