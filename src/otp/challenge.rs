//! 挑战记录与签发结果

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::crypto::{CodeHash, Salt};

/// 存储中的待验证挑战
///
/// 每个身份最多一条。原始验证码不在其中，只有加盐摘要。
/// 可序列化，供外部存储后端持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// 身份标识（通常是邮箱）
    pub identity: String,

    /// `HMAC-SHA256(salt, code)`
    pub code_hash: CodeHash,

    /// 本次签发的盐值
    pub salt: Salt,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 过期时间（签发时确定，不再变化）
    pub expires_at: DateTime<Utc>,

    /// 已预留的验证次数，比较验证码前计入
    pub attempts: u32,
}

impl Challenge {
    /// 检查在给定时刻是否已过期
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// 检查是否已过期
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// 是否为同一次签发
    pub fn is_issuance(&self, salt: &Salt) -> bool {
        &self.salt == salt
    }
}

/// 投递给 Notifier 的载荷
///
/// 原始验证码唯一的出口。`Debug` 输出中验证码被隐藏。
#[derive(Debug)]
pub struct DeliveryPayload {
    /// 收件身份
    pub identity: String,

    /// 原始验证码
    pub code: SecretString,

    /// 过期时间
    pub expires_at: DateTime<Utc>,
}

impl DeliveryPayload {
    /// 原始验证码
    pub fn code(&self) -> &str {
        self.code.expose_secret()
    }

    /// 剩余有效时间（秒）
    pub fn remaining_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }

    /// 复制一份载荷（outbox 等需要持有所有权的投递方式使用）
    pub fn duplicate(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            code: SecretString::from(self.code.expose_secret().to_owned()),
            expires_at: self.expires_at,
        }
    }
}

/// `begin` 返回给调用方的回执，不包含验证码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReceipt {
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

/// 待验证挑战的状态（不含任何秘密）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeStatus {
    pub expires_at: DateTime<Utc>,

    /// 剩余可尝试次数；未限制次数时为 `None`
    pub remaining_attempts: Option<u32>,
}
