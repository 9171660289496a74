//! SQLite 数据库工具：统一创建连接池并执行 sqlx 迁移
//!
//! 约定：本 crate 根目录下存在 `migrations/` 目录，存放所有迁移 SQL 文件。
//! 通过 `sqlx::migrate!()` 自动管理 schema 升级。

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, Transaction};
use std::str::FromStr;
use tracing::info;

/// 创建 SQLite 连接池并执行所有未执行的迁移
///
/// `db_url` 形如 `sqlite://friendbook.db`，文件不存在时自动创建。
pub async fn create_sqlite_pool_with_migration(db_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(db_url)
        .context(format!("无效的数据库 URL: {}", db_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context(format!("连接SQLite数据库失败: {}", db_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("执行数据库迁移失败")?;

    info!("[DB] 数据库已就绪: {}", db_url);
    Ok(pool)
}

/// 创建内存数据库连接池（测试和临时运行使用）
///
/// 内存库随连接存在，所以只保留一个永不过期的连接。
pub async fn create_memory_pool_with_migration() -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("创建内存数据库失败")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("执行数据库迁移失败")?;

    Ok(pool)
}

/// 以 `BEGIN IMMEDIATE` 开启写事务
///
/// 开始时即取得写锁：并发写者在 busy_timeout 内排队，之后能看到先提交的结果，
/// 不会在读锁升级为写锁时得到 `database is locked`。
pub async fn begin_immediate(
    pool: &Pool<Sqlite>,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
