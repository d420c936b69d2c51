//! 统一错误类型模块
//!
//! 提供 mailotp 库中所有操作的错误类型定义。
//!
//! 认证结果类错误（`InvalidIdentity`、`NotFound`、`Expired`、`InvalidCode`、
//! `AttemptsExhausted`）与投递、签名、基础设施错误分开，传输层可以据此
//! 选择不同的响应状态。任何错误信息都不包含验证码、盐值或摘要。

/// mailotp 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// mailotp 库的错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 身份标识为空
    #[error("identity must not be empty")]
    InvalidIdentity,

    /// 没有待验证的挑战（从未签发、已被消费或已过期清理）
    #[error("no pending challenge for this identity")]
    NotFound,

    /// 挑战已过期
    #[error("challenge has expired")]
    Expired,

    /// 验证码错误
    #[error("invalid code")]
    InvalidCode,

    /// 错误尝试次数达到上限，挑战已作废
    #[error("maximum verification attempts exceeded")]
    AttemptsExhausted,

    /// 验证码投递失败
    #[error("code delivery failed: {0}")]
    DeliveryFailed(String),

    /// 会话 token 签发失败
    #[error("session token signing failed: {0}")]
    SigningFailed(String),

    /// Token 相关错误
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// 存储错误
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 加密错误
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// 配置错误
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// 机器可读的错误原因
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidIdentity => "INVALID_IDENTITY",
            Error::NotFound => "NOT_FOUND",
            Error::Expired => "EXPIRED",
            Error::InvalidCode => "INVALID_CODE",
            Error::AttemptsExhausted => "ATTEMPTS_EXHAUSTED",
            Error::DeliveryFailed(_) => "DELIVERY_FAILED",
            Error::SigningFailed(_) => "SIGNING_FAILED",
            Error::Token(_) => "INVALID_TOKEN",
            Error::Storage(_) => "STORAGE",
            Error::Crypto(_) => "CRYPTO",
            Error::Config(_) => "CONFIG",
        }
    }

    /// 是否为认证失败（调用方输入导致，而非服务端故障）
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidIdentity
                | Error::NotFound
                | Error::Expired
                | Error::InvalidCode
                | Error::AttemptsExhausted
                | Error::Token(_)
        )
    }

    /// 创建一个投递失败错误
    pub fn delivery(msg: impl Into<String>) -> Self {
        Error::DeliveryFailed(msg.into())
    }

    /// 创建一个签名失败错误
    pub fn signing(msg: impl Into<String>) -> Self {
        Error::SigningFailed(msg.into())
    }
}

/// Token 相关错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token 已过期
    #[error("token has expired")]
    Expired,
    /// Token 格式无效
    #[error("invalid token format: {0}")]
    InvalidFormat(String),
    /// Token 签名无效
    #[error("invalid token signature")]
    InvalidSignature,
    /// Token 解码失败
    #[error("token decoding failed: {0}")]
    DecodingFailed(String),
    /// 缺少必需的 claim
    #[error("missing required claim: {0}")]
    MissingClaim(String),
    /// 无效的 claim 值
    #[error("invalid claim value: {0}")]
    InvalidClaim(String),
}

/// 存储相关错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// 锁已中毒（持锁线程 panic）
    #[error("storage lock poisoned")]
    LockPoisoned,
    /// 自定义存储后端的操作失败
    #[error("storage operation failed: {0}")]
    OperationFailed(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// 随机数生成失败
    #[error("random number generation failed: {0}")]
    RngFailed(String),
    /// 密钥无效
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// 缺少必需的配置
    #[error("missing required configuration: {0}")]
    MissingRequired(String),
    /// 无效的配置值
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
