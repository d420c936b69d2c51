//! 挑战存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::crypto::Salt;
use crate::error::{Result, StorageError};
use crate::otp::challenge::Challenge;

// ============================================================================
// 存储接口
// ============================================================================

/// 验证尝试的预留结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptReservation {
    /// 已预留，值为计入本次后的尝试次数
    Reserved(u32),
    /// 尝试次数已达上限
    Exhausted,
    /// 记录已被消费或替换
    Gone,
}

/// 挑战存储接口
///
/// 实现此 trait 以提供自定义的存储后端（如 Redis、数据库等）。
/// 每个方法对单个身份必须是原子的；`compare_and_delete` 保证并发验证中
/// 只有一方能消费同一次签发。
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// 获取身份对应的挑战（可能已过期，由调用方判断）
    async fn get(&self, identity: &str) -> Result<Option<Challenge>>;

    /// 保存挑战，覆盖该身份已有的记录
    async fn set(&self, challenge: Challenge) -> Result<()>;

    /// 删除身份对应的挑战，返回是否存在
    async fn delete(&self, identity: &str) -> Result<bool>;

    /// 仅当当前记录属于 `salt` 标识的那次签发时删除
    async fn compare_and_delete(&self, identity: &str, salt: &Salt) -> Result<bool>;

    /// 为 `salt` 标识的那次签发预留一次验证尝试
    ///
    /// 计数未达到 `max` 时原子地加一并返回 `Reserved`；比较验证码之前
    /// 必须先预留，并发请求因此无法越过上限。
    async fn reserve_attempt(
        &self,
        identity: &str,
        salt: &Salt,
        max: u32,
    ) -> Result<AttemptReservation>;

    /// 清理在 `now` 之前过期的挑战
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

// ============================================================================
// 内存存储实现
// ============================================================================

/// 内存存储实现
///
/// 适用于单实例部署或测试环境。锁只在同步代码中持有，不跨越 `.await`。
#[derive(Debug, Clone, Default)]
pub struct InMemoryChallengeStore {
    /// identity -> 挑战
    records: Arc<Mutex<HashMap<String, Challenge>>>,
}

impl InMemoryChallengeStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Challenge>>> {
        self.records
            .lock()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    /// 当前存储的挑战数量（含尚未清理的过期记录）
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn get(&self, identity: &str) -> Result<Option<Challenge>> {
        Ok(self.lock()?.get(identity).cloned())
    }

    async fn set(&self, challenge: Challenge) -> Result<()> {
        self.lock()?.insert(challenge.identity.clone(), challenge);
        Ok(())
    }

    async fn delete(&self, identity: &str) -> Result<bool> {
        Ok(self.lock()?.remove(identity).is_some())
    }

    async fn compare_and_delete(&self, identity: &str, salt: &Salt) -> Result<bool> {
        let mut records = self.lock()?;
        match records.get(identity) {
            Some(record) if record.is_issuance(salt) => {
                records.remove(identity);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reserve_attempt(
        &self,
        identity: &str,
        salt: &Salt,
        max: u32,
    ) -> Result<AttemptReservation> {
        let mut records = self.lock()?;
        let Some(record) = records
            .get_mut(identity)
            .filter(|record| record.is_issuance(salt))
        else {
            return Ok(AttemptReservation::Gone);
        };
        if record.attempts >= max {
            return Ok(AttemptReservation::Exhausted);
        }
        record.attempts += 1;
        Ok(AttemptReservation::Reserved(record.attempts))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        Ok(before - records.len())
    }
}
