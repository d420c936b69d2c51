//! OTP 配置

use std::time::Duration;

use crate::crypto::MIN_SALT_LENGTH;
use crate::error::ConfigError;

/// 默认有效期：5 分钟
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// 有效期上限：24 小时
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// OTP 配置
///
/// ```rust
/// use mailotp::otp::OtpConfig;
/// use std::time::Duration;
///
/// let config = OtpConfig::default()
///     .with_code_length(6)                 // 6 位数字
///     .with_ttl(Duration::from_secs(300))  // 5 分钟过期
///     .with_max_attempts(Some(5));         // 最多错 5 次
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpConfig {
    /// 验证码长度（数字位数）
    pub code_length: u32,

    /// 验证码有效期
    pub ttl: Duration,

    /// 盐值长度（字节）
    pub salt_length: usize,

    /// 最大错误次数，达到后挑战作废；`None` 表示不限制（仍受有效期约束）
    pub max_attempts: Option<u32>,

    /// 投递失败时是否撤销刚签发的挑战
    pub revoke_on_delivery_failure: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            ttl: DEFAULT_TTL,
            salt_length: MIN_SALT_LENGTH,
            max_attempts: Some(5),
            revoke_on_delivery_failure: false,
        }
    }
}

impl OtpConfig {
    /// 创建新配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置验证码长度
    pub fn with_code_length(mut self, length: u32) -> Self {
        self.code_length = length;
        self
    }

    /// 设置有效期
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 设置盐值长度
    pub fn with_salt_length(mut self, length: usize) -> Self {
        self.salt_length = length;
        self
    }

    /// 设置最大错误次数
    pub fn with_max_attempts(mut self, max: Option<u32>) -> Self {
        self.max_attempts = max;
        self
    }

    /// 设置投递失败时是否撤销挑战
    pub fn with_revoke_on_delivery_failure(mut self, revoke: bool) -> Self {
        self.revoke_on_delivery_failure = revoke;
        self
    }

    /// 高安全性配置
    ///
    /// - 8 位验证码
    /// - 3 分钟过期
    /// - 最多 3 次错误
    /// - 投递失败即撤销
    pub fn high_security() -> Self {
        Self {
            code_length: 8,
            ttl: Duration::from_secs(3 * 60),
            salt_length: 32,
            max_attempts: Some(3),
            revoke_on_delivery_failure: true,
        }
    }

    /// 宽松配置（适用于开发/测试）
    ///
    /// - 30 分钟过期
    /// - 不限错误次数
    pub fn relaxed() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            max_attempts: None,
            ..Self::default()
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=10).contains(&self.code_length) {
            return Err(ConfigError::invalid(
                "code_length",
                "must be between 4 and 10",
            ));
        }
        if self.ttl.is_zero() {
            return Err(ConfigError::invalid("ttl", "must be greater than zero"));
        }
        if self.ttl > MAX_TTL {
            return Err(ConfigError::invalid("ttl", "must not exceed 24 hours"));
        }
        if self.salt_length < MIN_SALT_LENGTH {
            return Err(ConfigError::invalid(
                "salt_length",
                format!("must be at least {} bytes", MIN_SALT_LENGTH),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::invalid(
                "max_attempts",
                "must be at least 1 (use None for unlimited)",
            ));
        }
        Ok(())
    }
}
