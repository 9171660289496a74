//! 好友申请数据访问层（DAO）
//!
//! 只负责读写 `friend_requests` 表，不做状态流转校验；
//! 流转规则在 service 层。

use crate::social::error::{is_unique_violation, SocialError, SocialResult};
use crate::social::friend::models::{FriendRequest, RequestStatus, RequestWithPeer};
use crate::social::identity::dao::row_to_identity;
use crate::social::identity::Identity;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, warn};

/// 好友申请 DAO（基于 sqlx）
#[derive(Clone, Copy, Debug, Default)]
pub struct FriendRequestDao;

fn row_to_request(m: &SqliteRow) -> Result<FriendRequest, sqlx::Error> {
    let code: String = m.get("status");
    let status = RequestStatus::from_code(&code).ok_or_else(|| {
        warn!("[FriendDAO] 未知的申请状态: {}", code);
        sqlx::Error::Decode(format!("unknown friend request status {:?}", code).into())
    })?;
    Ok(FriendRequest {
        id: m.get("id"),
        from_user_id: m.get("from_user_id"),
        to_user_id: m.get("to_user_id"),
        status,
        created_at: m.get("created_at"),
    })
}

/// 申请 + 对方用户（列的前缀为 `peer_`）
fn row_to_request_with_peer(m: &SqliteRow) -> Result<RequestWithPeer, sqlx::Error> {
    let is_active: i64 = m.get("peer_is_active");
    let is_staff: i64 = m.get("peer_is_staff");
    Ok(RequestWithPeer {
        request: row_to_request(m)?,
        peer: Identity {
            id: m.get("peer_id"),
            email: m.get("peer_email"),
            name: m.get("peer_name"),
            is_active: is_active != 0,
            is_staff: is_staff != 0,
            created_at: m.get("peer_created_at"),
        },
    })
}

const REQUEST_COLUMNS: &str = "fr.id, fr.from_user_id, fr.to_user_id, fr.status, fr.created_at";

const PEER_COLUMNS: &str = "u.id AS peer_id, u.email AS peer_email, u.name AS peer_name, \
     u.is_active AS peer_is_active, u.is_staff AS peer_is_staff, u.created_at AS peer_created_at";

impl FriendRequestDao {
    pub fn new() -> Self {
        Self
    }

    /// 查找有序对 (from, to) 的申请
    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        from_user_id: i64,
        to_user_id: i64,
    ) -> Result<Option<FriendRequest>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM friend_requests fr WHERE fr.from_user_id = ? AND fr.to_user_id = ?",
            REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(from_user_id)
            .bind(to_user_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(row_to_request).transpose()
    }

    pub async fn get(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<FriendRequest>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM friend_requests fr WHERE fr.id = ?",
            REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(row_to_request).transpose()
    }

    /// 查找发给 `to_user_id` 且处于指定状态的申请（接受/拒绝时的权限校验）
    pub async fn find_addressed(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        to_user_id: i64,
        status: RequestStatus,
    ) -> Result<Option<FriendRequest>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM friend_requests fr WHERE fr.id = ? AND fr.to_user_id = ? AND fr.status = ?",
            REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(to_user_id)
            .bind(status.as_code())
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(row_to_request).transpose()
    }

    /// 新建待处理申请；有序对已存在时返回唯一约束错误
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        from_user_id: i64,
        to_user_id: i64,
        created_at: i64,
    ) -> SocialResult<FriendRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO friend_requests (from_user_id, to_user_id, status, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(RequestStatus::Pending.as_code())
        .bind(created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                SocialError::DuplicateRequest
            } else {
                SocialError::Database(e)
            }
        })?;

        let request = FriendRequest {
            id: result.last_insert_rowid(),
            from_user_id,
            to_user_id,
            status: RequestStatus::Pending,
            created_at,
        };
        debug!(
            "[FriendDAO] 新建好友申请 {}: {} -> {}",
            request.id, from_user_id, to_user_id
        );
        Ok(request)
    }

    /// 更新申请状态（不校验状态流转）
    pub async fn set_status(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        status: RequestStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE friend_requests SET status = ? WHERE id = ?")
            .bind(status.as_code())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        debug!("[FriendDAO] 好友申请 {} 状态更新为 {:?}", id, status);
        Ok(())
    }

    /// `from_user_id` 自 `since`（含）以来创建的申请数量
    pub async fn count_sent_since(
        &self,
        conn: &mut SqliteConnection,
        from_user_id: i64,
        since: i64,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM friend_requests
            WHERE from_user_id = ? AND created_at >= ?
            "#,
        )
        .bind(from_user_id)
        .bind(since)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.get("total"))
    }

    /// 发给某用户、处于指定状态的申请，附带发送者信息
    pub async fn list_to_user(
        &self,
        conn: &mut SqliteConnection,
        to_user_id: i64,
        status: RequestStatus,
    ) -> Result<Vec<RequestWithPeer>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}, {}
            FROM friend_requests fr
            JOIN users u ON u.id = fr.from_user_id
            WHERE fr.to_user_id = ? AND fr.status = ?
            ORDER BY fr.id
            "#,
            REQUEST_COLUMNS, PEER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(to_user_id)
            .bind(status.as_code())
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(row_to_request_with_peer).collect()
    }

    /// 某用户发出、处于指定状态的申请，附带接收者信息
    pub async fn list_from_user(
        &self,
        conn: &mut SqliteConnection,
        from_user_id: i64,
        status: RequestStatus,
    ) -> Result<Vec<RequestWithPeer>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}, {}
            FROM friend_requests fr
            JOIN users u ON u.id = fr.to_user_id
            WHERE fr.from_user_id = ? AND fr.status = ?
            ORDER BY fr.id
            "#,
            REQUEST_COLUMNS, PEER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(from_user_id)
            .bind(status.as_code())
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(row_to_request_with_peer).collect()
    }

    /// 是否存在 `from -> to` 且处于指定状态的申请
    pub async fn exists_with_status(
        &self,
        conn: &mut SqliteConnection,
        from_user_id: i64,
        to_user_id: i64,
        status: RequestStatus,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS hit FROM friend_requests
            WHERE from_user_id = ? AND to_user_id = ? AND status = ?
            LIMIT 1
            "#,
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(status.as_code())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.is_some())
    }

    /// 两个用户之间任一方向是否存在已接受的申请
    pub async fn accepted_between(
        &self,
        conn: &mut SqliteConnection,
        a: i64,
        b: i64,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS hit FROM friend_requests
            WHERE ((from_user_id = ? AND to_user_id = ?) OR (from_user_id = ? AND to_user_id = ?))
              AND status = ?
            LIMIT 1
            "#,
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .bind(RequestStatus::Accepted.as_code())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.is_some())
    }

    /// 任一方向存在已接受申请的所有用户（去重）
    pub async fn list_accepted_peers(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Vec<Identity>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT u.id, u.email, u.name, u.is_active, u.is_staff, u.created_at
            FROM users u
            JOIN friend_requests fr
              ON (fr.from_user_id = u.id AND fr.to_user_id = ?)
              OR (fr.to_user_id = u.id AND fr.from_user_id = ?)
            WHERE fr.status = ?
            ORDER BY u.id
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(RequestStatus::Accepted.as_code())
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(row_to_identity).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::test_util::test_app;

    #[tokio::test]
    async fn second_create_for_same_pair_is_duplicate() -> anyhow::Result<()> {
        let app = test_app().await?;
        let a = app.identities.create("a@x.com", "A", "pw").await?;
        let b = app.identities.create("b@x.com", "B", "pw").await?;
        let dao = FriendRequestDao::new();
        let mut conn = app.pool.acquire().await?;

        let first = dao.create(&mut conn, a.id, b.id, 1_000).await?;
        assert_eq!(first.status, RequestStatus::Pending);
        assert!(matches!(
            dao.create(&mut conn, a.id, b.id, 2_000).await,
            Err(SocialError::DuplicateRequest)
        ));
        // 反方向是另一条记录
        dao.create(&mut conn, b.id, a.id, 3_000).await?;

        assert_eq!(dao.count_sent_since(&mut conn, a.id, 1_000).await?, 1);
        assert_eq!(dao.count_sent_since(&mut conn, a.id, 1_001).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn accepted_between_checks_both_directions() -> anyhow::Result<()> {
        let app = test_app().await?;
        let a = app.identities.create("a@x.com", "A", "pw").await?;
        let b = app.identities.create("b@x.com", "B", "pw").await?;
        let dao = FriendRequestDao::new();
        let mut conn = app.pool.acquire().await?;

        let req = dao.create(&mut conn, b.id, a.id, 1_000).await?;
        assert!(!dao.accepted_between(&mut conn, a.id, b.id).await?);
        dao.set_status(&mut conn, req.id, RequestStatus::Accepted)
            .await?;
        assert!(dao.accepted_between(&mut conn, a.id, b.id).await?);
        assert!(dao.accepted_between(&mut conn, b.id, a.id).await?);

        let peers = dao.list_accepted_peers(&mut conn, a.id).await?;
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].id, b.id);
        Ok(())
    }
}
