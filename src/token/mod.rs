//! 会话 Token 模块
//!
//! 验证成功后，[`OtpManager`](crate::otp::OtpManager) 通过 [`TokenIssuer`]
//! 为身份签发会话凭证。签名方案由实现决定，但 token 必须明确绑定身份、
//! 带有过期时间，且没有签名密钥无法伪造。
//!
//! ## 子模块
//!
//! - **jwt**: 基于 HMAC 的 JWT 签发与校验（需启用 `jwt` feature）
//!
//! ## 示例
//!
#![cfg_attr(feature = "jwt", doc = "```rust")]
#![cfg_attr(not(feature = "jwt"), doc = "```rust,ignore")]
//! use mailotp::token::{JwtTokenIssuer, TokenIssuer, TokenPolicy};
//! use std::time::Duration;
//!
//! let policy = TokenPolicy::new("my-secret-key-at-least-32-bytes!!")
//!     .with_ttl(Duration::from_secs(3600))
//!     .with_issuer("my-app");
//! let issuer = JwtTokenIssuer::new(policy).unwrap();
//!
//! let session = issuer.mint("user@example.com").unwrap();
//! let claims = issuer.validate(&session.token).unwrap();
//! assert_eq!(claims.sub, "user@example.com");
//! ```

#[cfg(feature = "jwt")]
pub mod jwt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, Result};

#[cfg(feature = "jwt")]
pub use jwt::{JwtAlgorithm, JwtTokenIssuer, SessionClaims};

/// 签名密钥的最小长度（字节）
pub const MIN_SECRET_LENGTH: usize = 32;

/// 默认会话有效期：1 小时
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// 会话有效期上限：30 天
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// 签发给已验证身份的会话凭证
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// 编码后的 token
    pub token: String,

    /// 绑定的身份
    pub identity: String,

    /// 签发时间
    pub issued_at: DateTime<Utc>,

    /// 过期时间
    pub expires_at: DateTime<Utc>,

    /// Token 类型（通常为 "Bearer"）
    pub token_type: String,
}

/// 会话 token 签发接口
pub trait TokenIssuer: Send + Sync {
    /// 为 `identity` 签发会话凭证
    ///
    /// 失败时返回 `Error::SigningFailed`。
    fn mint(&self, identity: &str) -> Result<SessionToken>;
}

/// 签发策略
///
/// 密钥来自配置，有效期必填。
#[derive(Debug)]
pub struct TokenPolicy {
    /// 签名密钥
    pub secret: SecretString,

    /// 会话有效期
    pub ttl: Duration,

    /// 签发者
    pub issuer: Option<String>,

    /// 接收者
    pub audience: Option<String>,

    /// 允许的时钟偏差（秒）
    pub leeway: u64,
}

impl TokenPolicy {
    /// 使用签名密钥创建策略
    pub fn new(secret: impl Into<String>) -> Self {
        Self::from_secret(SecretString::from(secret.into()))
    }

    /// 使用已包装的密钥创建策略
    pub fn from_secret(secret: SecretString) -> Self {
        Self {
            secret,
            ttl: DEFAULT_SESSION_TTL,
            issuer: None,
            audience: None,
            leeway: 0,
        }
    }

    /// 设置会话有效期
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 设置签发者
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// 设置接收者
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// 设置时钟偏差容忍度
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// 校验策略
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.secret.expose_secret().len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::invalid(
                "secret",
                format!("must be at least {} bytes", MIN_SECRET_LENGTH),
            ));
        }
        if self.ttl.as_secs() == 0 {
            return Err(ConfigError::invalid("ttl", "must be at least one second"));
        }
        if self.ttl > MAX_SESSION_TTL {
            return Err(ConfigError::invalid("ttl", "must not exceed 30 days"));
        }
        Ok(())
    }
}
