//! JWT 会话 token 实现
//!
//! ## 支持的算法
//!
//! - **HS256**: HMAC-SHA256（默认）
//! - **HS384**: HMAC-SHA384
//! - **HS512**: HMAC-SHA512
//!
//! 每个 token 都带有 `sub`（身份）、`iat`、`exp` 和随机 `jti`，
//! `iss`/`aud` 由 [`TokenPolicy`] 决定。
//!
//! ```rust
//! use mailotp::token::{JwtAlgorithm, JwtTokenIssuer, TokenIssuer, TokenPolicy};
//!
//! let issuer = JwtTokenIssuer::new(TokenPolicy::new("my-secret-key-at-least-32-bytes!!"))
//!     .unwrap()
//!     .with_algorithm(JwtAlgorithm::HS512);
//!
//! let session = issuer.mint("user@example.com").unwrap();
//! assert_eq!(session.token.matches('.').count(), 2);
//! ```

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{SessionToken, TokenIssuer, TokenPolicy};
use crate::error::{Error, Result, TokenError};
use crate::random::generate_random_hex;

/// JWT 签名算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JwtAlgorithm {
    /// HMAC-SHA256（默认）
    #[default]
    HS256,
    /// HMAC-SHA384
    HS384,
    /// HMAC-SHA512
    HS512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// 会话 token 的 claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 身份
    pub sub: String,

    /// 签发时间（Unix 时间戳）
    pub iat: i64,

    /// 过期时间（Unix 时间戳）
    pub exp: i64,

    /// JWT ID
    pub jti: String,

    /// 签发者
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub iss: Option<String>,

    /// 接收者
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aud: Option<String>,
}

/// 基于 HMAC JWT 的 [`TokenIssuer`]
pub struct JwtTokenIssuer {
    policy: TokenPolicy,
    algorithm: JwtAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenIssuer {
    /// 使用签发策略创建
    pub fn new(policy: TokenPolicy) -> Result<Self> {
        policy.validate()?;
        let secret = policy.secret.expose_secret().as_bytes();
        let encoding_key = EncodingKey::from_secret(secret);
        let decoding_key = DecodingKey::from_secret(secret);

        Ok(Self {
            policy,
            algorithm: JwtAlgorithm::default(),
            encoding_key,
            decoding_key,
        })
    }

    /// 设置签名算法
    pub fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 获取签发策略
    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// 校验并解码会话 token
    ///
    /// 检查签名、过期时间，以及策略中配置的签发者和接收者。
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let validation = self.build_validation();

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            let error = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    TokenError::InvalidFormat("invalid token structure".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    TokenError::InvalidClaim("invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    TokenError::InvalidClaim("invalid audience".to_string())
                }
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(claim) => {
                    TokenError::MissingClaim(claim.clone())
                }
                _ => TokenError::DecodingFailed(e.to_string()),
            };
            Error::Token(error)
        })?;

        Ok(data.claims)
    }

    fn build_validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm.into());
        validation.leeway = self.policy.leeway;
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(ref iss) = self.policy.issuer {
            validation.set_issuer(&[iss]);
        }
        if let Some(ref aud) = self.policy.audience {
            validation.set_audience(&[aud]);
        }

        validation
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn mint(&self, identity: &str) -> Result<SessionToken> {
        if identity.is_empty() {
            return Err(Error::InvalidIdentity);
        }

        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.policy.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| Error::signing("session ttl out of range"))?;

        let claims = SessionClaims {
            sub: identity.to_string(),
            iat: now,
            exp,
            jti: generate_random_hex(16)?,
            iss: self.policy.issuer.clone(),
            aud: self.policy.audience.clone(),
        };

        let header = Header::new(self.algorithm.into());
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| Error::signing(format!("failed to encode JWT: {}", e)))?;

        let issued_at = DateTime::<Utc>::from_timestamp(now, 0)
            .ok_or_else(|| Error::signing("issued-at out of range"))?;
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| Error::signing("expiry out of range"))?;

        Ok(SessionToken {
            token,
            identity: identity.to_string(),
            issued_at,
            expires_at,
            token_type: "Bearer".to_string(),
        })
    }
}

impl fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenIssuer")
            .field("policy", &self.policy)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
