//! 验证码投递接口
//!
//! 本库不包含实际的邮件发送功能。应用层实现 [`Notifier`]，接入 SMTP 或
//! 任意邮件服务商；选择哪种传输方式是部署层面的事情。
//!
//! [`ChannelNotifier`] 是一个进程内 outbox：验证码被放入有界通道，由应用
//! 自己的邮件 worker 消费并发送。
//!
//! ```rust
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use mailotp::notify::{ChannelNotifier, Notifier};
//! use mailotp::otp::DeliveryPayload;
//! use secrecy::SecretString;
//!
//! let (notifier, mut outbox) = ChannelNotifier::new(16);
//!
//! let payload = DeliveryPayload {
//!     identity: "user@example.com".to_string(),
//!     code: SecretString::from("482913".to_string()),
//!     expires_at: chrono::Utc::now(),
//! };
//! notifier.send(&payload).await.unwrap();
//!
//! let queued = outbox.recv().await.unwrap();
//! assert_eq!(queued.identity, "user@example.com");
//! assert_eq!(queued.code(), "482913");
//! # });
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::{Error, Result};
use crate::otp::DeliveryPayload;

/// 验证码投递接口
///
/// 失败时返回 `Error::DeliveryFailed`，原因中不得包含验证码。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 将验证码发送给 `payload.identity`
    async fn send(&self, payload: &DeliveryPayload) -> Result<()>;
}

/// 基于有界通道的 outbox 投递
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<DeliveryPayload>,
}

impl ChannelNotifier {
    /// 创建 outbox，返回投递端与消费端
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DeliveryPayload>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// 基于已有的发送端创建
    pub fn from_sender(sender: mpsc::Sender<DeliveryPayload>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, payload: &DeliveryPayload) -> Result<()> {
        // 不等待队列空位：outbox 满说明邮件 worker 跟不上，直接报告投递失败
        self.sender
            .try_send(payload.duplicate())
            .map_err(|e| match e {
                TrySendError::Full(_) => Error::delivery("outbox is full"),
                TrySendError::Closed(_) => Error::delivery("outbox is closed"),
            })
    }
}
