//! OTP 管理器

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::crypto::{CodeHash, Salt};
use crate::error::{ConfigError, Error, Result};
use crate::notify::Notifier;
use crate::otp::challenge::{Challenge, ChallengeStatus, DeliveryPayload, IssueReceipt};
use crate::otp::config::OtpConfig;
use crate::otp::store::{AttemptReservation, ChallengeStore, InMemoryChallengeStore};
use crate::random::generate_numeric_code;
use crate::token::{SessionToken, TokenIssuer};

// ============================================================================
// 验证码生成
// ============================================================================

/// 验证码来源
///
/// 默认使用 [`RandomCodeGenerator`]。任何 `Fn(u32) -> String` 闭包也实现了
/// 此 trait，便于在测试中固定验证码。
pub trait CodeGenerator: Send + Sync {
    /// 生成 `digits` 位数字验证码
    fn generate(&self, digits: u32) -> String;
}

/// CSPRNG 均匀生成验证码
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, digits: u32) -> String {
        generate_numeric_code(digits)
    }
}

impl<F> CodeGenerator for F
where
    F: Fn(u32) -> String + Send + Sync,
{
    fn generate(&self, digits: u32) -> String {
        self(digits)
    }
}

// ============================================================================
// OTP 管理器
// ============================================================================

/// OTP 管理器
///
/// 负责签发、投递和验证一次性验证码，验证成功后签发会话 token。
///
/// ## 示例
///
/// ```rust
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// use mailotp::notify::ChannelNotifier;
/// use mailotp::otp::{OtpConfig, OtpManager};
/// use mailotp::token::{JwtTokenIssuer, TokenPolicy};
/// use std::sync::Arc;
///
/// let (notifier, mut outbox) = ChannelNotifier::new(16);
/// let tokens = JwtTokenIssuer::new(TokenPolicy::new("my-secret-key-at-least-32-bytes!!")).unwrap();
/// let manager = OtpManager::new(OtpConfig::default(), Arc::new(notifier), Arc::new(tokens)).unwrap();
///
/// // 开始挑战：生成验证码并交给 Notifier
/// manager.begin("user@example.com").await.unwrap();
///
/// // 邮件 worker 从 outbox 取出验证码发送
/// let delivery = outbox.recv().await.unwrap();
///
/// // 用户提交验证码
/// let session = manager.verify("user@example.com", delivery.code()).await.unwrap();
/// assert_eq!(session.identity, "user@example.com");
///
/// // 验证码只能使用一次
/// assert!(manager.verify("user@example.com", delivery.code()).await.is_err());
/// # });
/// ```
pub struct OtpManager<S: ChallengeStore = InMemoryChallengeStore> {
    store: S,
    config: OtpConfig,
    codes: Arc<dyn CodeGenerator>,
    notifier: Arc<dyn Notifier>,
    tokens: Arc<dyn TokenIssuer>,
}

impl OtpManager<InMemoryChallengeStore> {
    /// 使用默认内存存储创建管理器
    pub fn new(
        config: OtpConfig,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Result<Self> {
        Self::with_store(InMemoryChallengeStore::new(), config, notifier, tokens)
    }
}

impl<S: ChallengeStore> OtpManager<S> {
    /// 使用自定义存储创建管理器
    pub fn with_store(
        store: S,
        config: OtpConfig,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            codes: Arc::new(RandomCodeGenerator),
            notifier,
            tokens,
        })
    }

    /// 替换验证码来源
    pub fn with_code_generator(mut self, codes: impl CodeGenerator + 'static) -> Self {
        self.codes = Arc::new(codes);
        self
    }

    /// 签发挑战
    ///
    /// 生成验证码与独立的盐值，只保存摘要，覆盖该身份已有的挑战。
    /// 不做任何投递；返回的载荷是原始验证码唯一的出口，应立即交给
    /// Notifier。
    ///
    /// # Errors
    ///
    /// - `InvalidIdentity`：身份为空
    pub async fn issue(&self, identity: &str) -> Result<DeliveryPayload> {
        self.issue_challenge(identity)
            .await
            .map(|(payload, _salt)| payload)
    }

    /// 签发并返回本次签发的盐值，供撤销时只针对这一次签发
    async fn issue_challenge(&self, identity: &str) -> Result<(DeliveryPayload, Salt)> {
        let identity = normalize_identity(identity)?;

        let code = self.codes.generate(self.config.code_length);
        let salt = Salt::generate(self.config.salt_length)?;
        let code_hash = CodeHash::compute(&salt, &code)?;

        let created_at = Utc::now();
        let expires_at = self.expiry_from(created_at)?;

        self.store
            .set(Challenge {
                identity: identity.to_string(),
                code_hash,
                salt: salt.clone(),
                created_at,
                expires_at,
                attempts: 0,
            })
            .await?;

        debug!(identity, %expires_at, "otp challenge issued");

        let payload = DeliveryPayload {
            identity: identity.to_string(),
            code: SecretString::from(code),
            expires_at,
        };
        Ok((payload, salt))
    }

    /// 开始挑战：签发并投递
    ///
    /// 投递失败时返回 `DeliveryFailed`。挑战默认保留，由调用方决定是否
    /// 撤销；`revoke_on_delivery_failure` 打开时会撤销这次签发，期间的
    /// 重新签发不受影响。
    pub async fn begin(&self, identity: &str) -> Result<IssueReceipt> {
        let (payload, salt) = self.issue_challenge(identity).await?;

        if let Err(e) = self.notifier.send(&payload).await {
            warn!(identity = %payload.identity, error = %e, "otp delivery failed");
            if self.config.revoke_on_delivery_failure
                && let Err(revoke_error) = self
                    .store
                    .compare_and_delete(&payload.identity, &salt)
                    .await
            {
                warn!(
                    identity = %payload.identity,
                    error = %revoke_error,
                    "failed to revoke undelivered otp challenge"
                );
            }
            return Err(match e {
                Error::DeliveryFailed(_) => e,
                other => Error::delivery(other.to_string()),
            });
        }

        info!(identity = %payload.identity, "otp delivered");

        Ok(IssueReceipt {
            identity: payload.identity,
            expires_at: payload.expires_at,
        })
    }

    /// 验证挑战
    ///
    /// 成功时消费挑战并签发会话 token。比较使用常量时间。
    ///
    /// # Errors
    ///
    /// - `InvalidIdentity`：身份为空
    /// - `NotFound`：没有待验证的挑战，或并发验证中被其他请求消费
    /// - `Expired`：挑战已过期（同时被清理）
    /// - `InvalidCode`：验证码错误，挑战保留
    /// - `AttemptsExhausted`：尝试次数达到上限（同时被清理）；每次比较前
    ///   都会先预留一次尝试
    /// - `SigningFailed`：挑战已消费，但会话 token 签发失败
    pub async fn verify(&self, identity: &str, submitted: &str) -> Result<SessionToken> {
        let identity = normalize_identity(identity)?;

        let challenge = self.store.get(identity).await?.ok_or(Error::NotFound)?;

        if challenge.is_expired() {
            self.store
                .compare_and_delete(identity, &challenge.salt)
                .await?;
            warn!(identity, expires_at = %challenge.expires_at, "otp challenge expired");
            return Err(Error::Expired);
        }

        // 比较之前先预留一次尝试，并发的猜测不能越过上限
        let reserved = match self.config.max_attempts {
            Some(max) => Some((self.reserve_attempt(identity, &challenge, max).await?, max)),
            None => None,
        };

        if !challenge.code_hash.matches(&challenge.salt, submitted)? {
            return Err(self.reject(identity, &challenge, reserved).await?);
        }

        if !self
            .store
            .compare_and_delete(identity, &challenge.salt)
            .await?
        {
            // 另一个验证请求已消费，或期间被重新签发
            debug!(identity, "otp challenge consumed concurrently");
            return Err(Error::NotFound);
        }

        info!(identity, "otp verified");

        self.tokens.mint(identity).map_err(|e| match e {
            Error::SigningFailed(_) => e,
            other => Error::signing(other.to_string()),
        })
    }

    /// 为这次签发预留一次尝试，返回计入后的次数
    async fn reserve_attempt(&self, identity: &str, challenge: &Challenge, max: u32) -> Result<u32> {
        match self
            .store
            .reserve_attempt(identity, &challenge.salt, max)
            .await?
        {
            AttemptReservation::Reserved(attempts) => Ok(attempts),
            AttemptReservation::Exhausted => {
                self.store
                    .compare_and_delete(identity, &challenge.salt)
                    .await?;
                warn!(identity, "otp attempts exhausted");
                Err(Error::AttemptsExhausted)
            }
            AttemptReservation::Gone => Err(Error::NotFound),
        }
    }

    /// 处理一次错误提交，返回应交给调用方的错误
    ///
    /// `reserved` 为已预留的尝试次数与上限。
    async fn reject(
        &self,
        identity: &str,
        challenge: &Challenge,
        reserved: Option<(u32, u32)>,
    ) -> Result<Error> {
        match reserved {
            Some((attempts, max)) if attempts >= max => {
                self.store
                    .compare_and_delete(identity, &challenge.salt)
                    .await?;
                warn!(identity, "otp attempts exhausted");
                Ok(Error::AttemptsExhausted)
            }
            Some((attempts, max)) => {
                debug!(identity, remaining_attempts = max - attempts, "otp mismatch");
                Ok(Error::InvalidCode)
            }
            None => {
                debug!(identity, "otp mismatch");
                Ok(Error::InvalidCode)
            }
        }
    }

    /// 撤销身份的待验证挑战，返回是否存在
    pub async fn revoke(&self, identity: &str) -> Result<bool> {
        let identity = normalize_identity(identity)?;
        self.store.delete(identity).await
    }

    /// 查询待验证挑战的状态
    ///
    /// 已过期的挑战视为不存在。
    pub async fn pending(&self, identity: &str) -> Result<Option<ChallengeStatus>> {
        let identity = normalize_identity(identity)?;
        Ok(self
            .store
            .get(identity)
            .await?
            .filter(|challenge| !challenge.is_expired())
            .map(|challenge| ChallengeStatus {
                expires_at: challenge.expires_at,
                remaining_attempts: self
                    .config
                    .max_attempts
                    .map(|max| max.saturating_sub(challenge.attempts)),
            }))
    }

    /// 清理过期的挑战
    pub async fn cleanup(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now()).await
    }

    /// 获取配置
    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// 获取存储
    pub fn store(&self) -> &S {
        &self.store
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        Duration::from_std(self.config.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| ConfigError::invalid("ttl", "expiry is out of range").into())
    }
}

impl<S: ChallengeStore + 'static> OtpManager<S> {
    /// 启动后台清理任务
    ///
    /// 过期挑战在查询时就被视为不存在，后台清理只用于回收内存。
    /// 需要在 tokio 运行时中调用。
    pub fn spawn_purge_task(self: Arc<Self>, period: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match self.cleanup().await {
                    Ok(0) => {}
                    Ok(purged) => debug!(purged, "purged expired otp challenges"),
                    Err(e) => warn!(error = %e, "otp purge failed"),
                }
            }
        })
    }
}

fn normalize_identity(identity: &str) -> Result<&str> {
    let identity = identity.trim();
    if identity.is_empty() {
        return Err(Error::InvalidIdentity);
    }
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::StorageError;
    use crate::otp::store::AttemptReservation;
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;

    /// 记录所有投递内容
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, payload: &DeliveryPayload) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((payload.identity.clone(), payload.code().to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _payload: &DeliveryPayload) -> Result<()> {
            Err(Error::delivery("provider unavailable"))
        }
    }

    /// 撤销操作总是失败的存储
    #[derive(Default)]
    struct UnrevokableStore {
        inner: InMemoryChallengeStore,
    }

    #[async_trait]
    impl ChallengeStore for UnrevokableStore {
        async fn get(&self, identity: &str) -> Result<Option<Challenge>> {
            self.inner.get(identity).await
        }

        async fn set(&self, challenge: Challenge) -> Result<()> {
            self.inner.set(challenge).await
        }

        async fn delete(&self, identity: &str) -> Result<bool> {
            self.inner.delete(identity).await
        }

        async fn compare_and_delete(&self, _identity: &str, _salt: &Salt) -> Result<bool> {
            Err(StorageError::OperationFailed("replica unavailable".to_string()).into())
        }

        async fn reserve_attempt(
            &self,
            identity: &str,
            salt: &Salt,
            max: u32,
        ) -> Result<AttemptReservation> {
            self.inner.reserve_attempt(identity, salt, max).await
        }

        async fn purge_expired(&self, now: chrono::DateTime<Utc>) -> Result<usize> {
            self.inner.purge_expired(now).await
        }
    }

    /// 不签名，只回显身份
    struct EchoIssuer;

    impl TokenIssuer for EchoIssuer {
        fn mint(&self, identity: &str) -> Result<SessionToken> {
            let now = Utc::now();
            Ok(SessionToken {
                token: format!("session:{}", identity),
                identity: identity.to_string(),
                issued_at: now,
                expires_at: now + Duration::hours(1),
                token_type: "Bearer".to_string(),
            })
        }
    }

    struct BrokenIssuer;

    impl TokenIssuer for BrokenIssuer {
        fn mint(&self, _identity: &str) -> Result<SessionToken> {
            Err(Error::signing("key unavailable"))
        }
    }

    fn manager(config: OtpConfig) -> OtpManager {
        OtpManager::new(
            config,
            Arc::new(RecordingNotifier::default()),
            Arc::new(EchoIssuer),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let manager = manager(OtpConfig::default());

        let payload = manager.issue("a@x.com").await.unwrap();
        assert_eq!(payload.identity, "a@x.com");
        assert_eq!(payload.code().len(), 6);
        assert!(payload.remaining_seconds() > 295);

        let session = manager.verify("a@x.com", payload.code()).await.unwrap();
        assert_eq!(session.identity, "a@x.com");
        assert_eq!(session.token, "session:a@x.com");
    }

    #[tokio::test]
    async fn test_single_use() {
        let manager = manager(OtpConfig::default());
        let payload = manager.issue("a@x.com").await.unwrap();

        assert!(manager.verify("a@x.com", payload.code()).await.is_ok());
        assert!(matches!(
            manager.verify("a@x.com", payload.code()).await,
            Err(Error::NotFound)
        ));
        assert!(manager.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_store_keeps_only_digest() {
        let manager = manager(OtpConfig::default());
        let payload = manager.issue("a@x.com").await.unwrap();

        let stored = manager.store().get("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.salt.len(), 16);
        assert!(stored.code_hash.matches(&stored.salt, payload.code()).unwrap());
        assert!(!stored.code_hash.to_hex().contains(payload.code()));
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_challenge() {
        let manager = manager(OtpConfig::default().with_code_length(6));
        let manager = manager.with_code_generator(|_: u32| "482913".to_string());
        manager.issue("a@x.com").await.unwrap();

        assert!(matches!(
            manager.verify("a@x.com", "000000").await,
            Err(Error::InvalidCode)
        ));
        assert!(manager.verify("a@x.com", "482913").await.is_ok());
    }

    #[tokio::test]
    async fn test_max_attempts() {
        let manager = manager(OtpConfig::default().with_max_attempts(Some(2)))
            .with_code_generator(|_: u32| "482913".to_string());
        manager.issue("a@x.com").await.unwrap();

        assert!(matches!(
            manager.verify("a@x.com", "000000").await,
            Err(Error::InvalidCode)
        ));
        let status = manager.pending("a@x.com").await.unwrap().unwrap();
        assert_eq!(status.remaining_attempts, Some(1));

        assert!(matches!(
            manager.verify("a@x.com", "000000").await,
            Err(Error::AttemptsExhausted)
        ));

        // 正确的验证码也无效了
        assert!(matches!(
            manager.verify("a@x.com", "482913").await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unbounded_attempts() {
        let manager = manager(OtpConfig::default().with_max_attempts(None))
            .with_code_generator(|_: u32| "482913".to_string());
        manager.issue("a@x.com").await.unwrap();

        for _ in 0..20 {
            assert!(matches!(
                manager.verify("a@x.com", "999999").await,
                Err(Error::InvalidCode)
            ));
        }
        assert_eq!(
            manager.pending("a@x.com").await.unwrap().unwrap().remaining_attempts,
            None
        );
        assert!(manager.verify("a@x.com", "482913").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired() {
        let manager = manager(OtpConfig::default().with_ttl(StdDuration::from_millis(100)));
        let payload = manager.issue("b@x.com").await.unwrap();

        tokio::time::sleep(StdDuration::from_millis(150)).await;

        assert!(manager.pending("b@x.com").await.unwrap().is_none());
        assert!(matches!(
            manager.verify("b@x.com", payload.code()).await,
            Err(Error::Expired)
        ));
        // 过期挑战已被清理
        assert!(matches!(
            manager.verify("b@x.com", payload.code()).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_reissue_replaces() {
        let manager = manager(OtpConfig::default());
        let first = manager.issue("a@x.com").await.unwrap();
        let second = manager.issue("a@x.com").await.unwrap();

        if first.code() != second.code() {
            assert!(matches!(
                manager.verify("a@x.com", first.code()).await,
                Err(Error::InvalidCode)
            ));
        }
        assert!(manager.verify("a@x.com", second.code()).await.is_ok());
    }

    #[tokio::test]
    async fn test_identity_validation() {
        let manager = manager(OtpConfig::default());

        assert!(matches!(manager.issue("").await, Err(Error::InvalidIdentity)));
        assert!(matches!(manager.issue("   ").await, Err(Error::InvalidIdentity)));
        assert!(matches!(
            manager.verify("", "123456").await,
            Err(Error::InvalidIdentity)
        ));
        assert!(manager.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_identity_is_trimmed() {
        let manager = manager(OtpConfig::default());
        let payload = manager.issue("  a@x.com ").await.unwrap();
        assert_eq!(payload.identity, "a@x.com");
        assert!(manager.verify("a@x.com", payload.code()).await.is_ok());
    }

    #[tokio::test]
    async fn test_begin_delivers_code() {
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OtpManager::new(
            OtpConfig::default(),
            notifier.clone(),
            Arc::new(EchoIssuer),
        )
        .unwrap();

        let receipt = manager.begin("a@x.com").await.unwrap();
        assert_eq!(receipt.identity, "a@x.com");

        let (identity, code) = notifier.sent.lock().unwrap().pop().unwrap();
        assert_eq!(identity, "a@x.com");
        assert!(manager.verify("a@x.com", &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_begin_delivery_failure_keeps_challenge_by_default() {
        let manager = OtpManager::new(
            OtpConfig::default(),
            Arc::new(FailingNotifier),
            Arc::new(EchoIssuer),
        )
        .unwrap();

        let err = manager.begin("a@x.com").await.unwrap_err();
        assert!(matches!(err, Error::DeliveryFailed(_)));
        assert!(manager.pending("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_begin_delivery_failure_revokes_when_configured() {
        let manager = OtpManager::new(
            OtpConfig::default().with_revoke_on_delivery_failure(true),
            Arc::new(FailingNotifier),
            Arc::new(EchoIssuer),
        )
        .unwrap();

        assert!(manager.begin("a@x.com").await.is_err());
        assert!(manager.pending("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_failure_still_reports_delivery_failure() {
        let manager = OtpManager::with_store(
            UnrevokableStore::default(),
            OtpConfig::default().with_revoke_on_delivery_failure(true),
            Arc::new(FailingNotifier),
            Arc::new(EchoIssuer),
        )
        .unwrap();

        let err = manager.begin("a@x.com").await.unwrap_err();
        assert!(matches!(err, Error::DeliveryFailed(_)));
        assert!(manager.store().get("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_correct_code_on_last_attempt() {
        let manager = manager(OtpConfig::default().with_max_attempts(Some(2)))
            .with_code_generator(|_: u32| "482913".to_string());
        manager.issue("a@x.com").await.unwrap();

        assert!(matches!(
            manager.verify("a@x.com", "000000").await,
            Err(Error::InvalidCode)
        ));
        assert!(manager.verify("a@x.com", "482913").await.is_ok());
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_an_error() {
        // 绕过 validate，直接构造超出时间范围的有效期
        let manager = OtpManager {
            store: InMemoryChallengeStore::new(),
            config: OtpConfig {
                ttl: StdDuration::from_secs(9_000_000_000_000),
                ..OtpConfig::default()
            },
            codes: Arc::new(RandomCodeGenerator),
            notifier: Arc::new(RecordingNotifier::default()),
            tokens: Arc::new(EchoIssuer),
        };

        let err = manager.issue("a@x.com").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(manager.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_signing_failure_consumes_challenge() {
        let manager = OtpManager::new(
            OtpConfig::default(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(BrokenIssuer),
        )
        .unwrap();
        let payload = manager.issue("a@x.com").await.unwrap();

        let err = manager.verify("a@x.com", payload.code()).await.unwrap_err();
        assert!(matches!(err, Error::SigningFailed(_)));
        assert!(!err.is_auth_failure());
        assert!(manager.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_revoke() {
        let manager = manager(OtpConfig::default());
        let payload = manager.issue("a@x.com").await.unwrap();

        assert!(manager.revoke("a@x.com").await.unwrap());
        assert!(!manager.revoke("a@x.com").await.unwrap());
        assert!(matches!(
            manager.verify("a@x.com", payload.code()).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let manager = manager(OtpConfig::default().with_ttl(StdDuration::from_millis(100)));
        manager.issue("user1@x.com").await.unwrap();
        manager.issue("user2@x.com").await.unwrap();

        tokio::time::sleep(StdDuration::from_millis(150)).await;

        assert_eq!(manager.cleanup().await.unwrap(), 2);
        assert!(manager.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_purge_task() {
        let manager = Arc::new(manager(
            OtpConfig::default().with_ttl(StdDuration::from_millis(50)),
        ));
        manager.issue("a@x.com").await.unwrap();

        let handle = manager.clone().spawn_purge_task(StdDuration::from_millis(20));
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        handle.abort();

        assert!(manager.store().is_empty().unwrap());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = OtpManager::new(
            OtpConfig::default().with_salt_length(4),
            Arc::new(RecordingNotifier::default()),
            Arc::new(EchoIssuer),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_random_code_generator() {
        let code = RandomCodeGenerator.generate(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
