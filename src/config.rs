//! 从环境变量加载配置
//!
//! | 变量 | 默认值 | 说明 |
//! |------|--------|------|
//! | `OTP_TTL_SECS` | `300` | 验证码有效期 |
//! | `OTP_CODE_LENGTH` | `6` | 验证码位数 |
//! | `OTP_MAX_ATTEMPTS` | `5` | 最大错误次数，`0` 或 `none` 表示不限制 |
//! | `SESSION_SECRET` | 必填 | 会话 token 签名密钥，至少 32 字节 |
//! | `SESSION_TTL_SECS` | `3600` | 会话有效期 |
//! | `SESSION_ISSUER` | 无 | `iss` claim |
//! | `SESSION_AUDIENCE` | 无 | `aud` claim |

use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::otp::OtpConfig;
use crate::token::TokenPolicy;

/// 完整配置
#[derive(Debug)]
pub struct Settings {
    pub otp: OtpConfig,
    pub session: TokenPolicy,
}

impl Settings {
    /// 从进程环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut otp = OtpConfig::default();
        if let Some(secs) = parse::<u64>(&lookup, "OTP_TTL_SECS")? {
            otp.ttl = Duration::from_secs(secs);
        }
        if let Some(length) = parse::<u32>(&lookup, "OTP_CODE_LENGTH")? {
            otp.code_length = length;
        }
        if let Some(raw) = non_empty(&lookup, "OTP_MAX_ATTEMPTS") {
            otp.max_attempts = match raw.as_str() {
                "0" | "none" => None,
                value => Some(value.parse().map_err(|_| {
                    ConfigError::invalid("OTP_MAX_ATTEMPTS", "expected a number or 'none'")
                })?),
            };
        }
        otp.validate()?;

        let secret = non_empty(&lookup, "SESSION_SECRET")
            .ok_or_else(|| ConfigError::MissingRequired("SESSION_SECRET".to_string()))?;
        let mut session = TokenPolicy::from_secret(SecretString::from(secret));
        if let Some(secs) = parse::<u64>(&lookup, "SESSION_TTL_SECS")? {
            session.ttl = Duration::from_secs(secs);
        }
        session.issuer = non_empty(&lookup, "SESSION_ISSUER");
        session.audience = non_empty(&lookup, "SESSION_AUDIENCE");
        session.validate().map_err(|e| match e {
            ConfigError::InvalidValue { key, message } => ConfigError::InvalidValue {
                key: format!("SESSION_{}", key.to_uppercase()),
                message,
            },
            other => other,
        })?;

        Ok(Self { otp, session })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    non_empty(lookup, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ConfigError::invalid(key, format!("cannot parse '{}'", raw)))
        })
        .transpose()
}
