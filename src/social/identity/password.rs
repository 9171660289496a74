//! 密码哈希（Argon2id，随机盐）

use anyhow::{anyhow, Context, Result};
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Argon2 计算参数
#[derive(Clone, Copy, Debug)]
pub struct PasswordParams {
    /// 内存开销（KiB）
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// 密码哈希与校验
///
/// Argon2 计算耗时较长，异步代码中使用 `spawn_hash` / `spawn_verify`，
/// 在 tokio 的阻塞线程池里执行。
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(params: PasswordParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| anyhow!("无效的 Argon2 参数: {}", e))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 生成 PHC 格式的哈希字符串
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("密码哈希失败: {}", e))?;
        Ok(hash.to_string())
    }

    /// 校验密码；哈希格式损坏时视为不匹配
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub async fn spawn_hash(&self, password: &str) -> Result<String> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("密码哈希任务异常退出")?
    }

    pub async fn spawn_verify(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = self.clone();
        let (password, hash) = (password.to_owned(), hash.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .context("密码校验任务异常退出")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_is_salted_and_verifiable() {
        let h = hasher();
        let a = h.hash("s3cret").unwrap();
        let b = h.hash("s3cret").unwrap();
        assert_ne!(a, b);
        assert!(h.verify("s3cret", &a));
        assert!(!h.verify("wrong", &a));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!hasher().verify("s3cret", "not-a-phc-string"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn spawned_hashing_leaves_runtime_free() -> Result<()> {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        // 参数足够大，保证哈希期间调度器有机会运行其它任务
        let h = PasswordHasher::new(PasswordParams {
            memory_kib: 8 * 1024,
            iterations: 3,
            parallelism: 1,
        })?;
        let ticked = Arc::new(AtomicBool::new(false));
        tokio::spawn({
            let ticked = ticked.clone();
            async move { ticked.store(true, Ordering::SeqCst) }
        });

        let hash = h.spawn_hash("s3cret").await?;
        assert!(ticked.load(Ordering::SeqCst));
        assert!(h.spawn_verify("s3cret", &hash).await?);
        assert!(!h.spawn_verify("wrong", &hash).await?);
        Ok(())
    }
}
