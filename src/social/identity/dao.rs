//! 用户数据访问层（DAO）
//!
//! 所有方法都接收 `&mut SqliteConnection`，既可以直接使用连接池中的连接，
//! 也可以在业务层的事务里调用（`&mut *tx`）。

use crate::social::identity::models::{Identity, IdentityRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

/// 用户 DAO（基于 sqlx）
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityDao;

pub(crate) fn row_to_identity(m: &SqliteRow) -> Identity {
    let is_active: i64 = m.get("is_active");
    let is_staff: i64 = m.get("is_staff");
    Identity {
        id: m.get("id"),
        email: m.get("email"),
        name: m.get("name"),
        is_active: is_active != 0,
        is_staff: is_staff != 0,
        created_at: m.get("created_at"),
    }
}

/// 转义 LIKE 通配符，使搜索词按字面匹配
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl IdentityDao {
    pub fn new() -> Self {
        Self
    }

    /// 插入新用户，返回自增 ID
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        email: &str,
        name: &str,
        password_hash: &str,
        is_staff: bool,
        created_at: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, is_active, is_staff, created_at)
            VALUES (?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(if is_staff { 1 } else { 0 })
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// 邮箱是否已存在（忽略大小写）
    pub async fn email_exists(
        &self,
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 AS hit FROM users WHERE email = ? COLLATE NOCASE LIMIT 1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn get(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Identity>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, is_active, is_staff, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.as_ref().map(row_to_identity))
    }

    /// 按邮箱查询（含密码哈希）
    pub(crate) async fn find_by_email(
        &self,
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<IdentityRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, is_active, is_staff, created_at, password_hash
            FROM users
            WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|m| IdentityRecord {
            identity: row_to_identity(&m),
            password_hash: m.get("password_hash"),
        }))
    }

    /// 名称前缀匹配的用户总数（忽略大小写）
    pub async fn count_by_name_prefix(
        &self,
        conn: &mut SqliteConnection,
        prefix: &str,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM users
            WHERE name LIKE ? || '%' ESCAPE '\'
            "#,
        )
        .bind(escape_like(prefix))
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.get("total"))
    }

    /// 名称前缀匹配的一页用户，按 ID 排序
    pub async fn search_by_name_prefix(
        &self,
        conn: &mut SqliteConnection,
        prefix: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Identity>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, name, is_active, is_staff, created_at
            FROM users
            WHERE name LIKE ? || '%' ESCAPE '\'
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(escape_like(prefix))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let users: Vec<Identity> = rows.iter().map(row_to_identity).collect();
        debug!(
            "[IdentityDAO] 名称前缀 {:?} 匹配 {} 个用户（offset={}）",
            prefix,
            users.len(),
            offset
        );
        Ok(users)
    }

    /// 双向写入好友关系（已存在时忽略）
    pub async fn add_friends(
        &self,
        conn: &mut SqliteConnection,
        a: i64,
        b: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_friends (user_id, friend_id)
            VALUES (?, ?), (?, ?)
            "#,
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// 好友关系表中该用户的所有好友 ID
    pub async fn friend_ids(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT friend_id FROM user_friends WHERE user_id = ? ORDER BY friend_id",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows
            .into_iter()
            .map(|m| m.get::<i64, _>("friend_id"))
            .collect())
    }
}
