//! # mailotp
//!
//! 基于邮件一次性验证码 (OTP) 的无密码认证库。
//!
//! ## 功能特性
//!
//! - **验证码签发**: CSPRNG 生成 6 位数字验证码，只保存 HMAC-SHA256 加盐摘要
//! - **一次性验证**: 常量时间比对，成功即消费，并发验证只有一个成功
//! - **过期与错误次数**: 固定有效期，可选的错误次数上限
//! - **可插拔存储**: `ChallengeStore` trait，默认内存实现
//! - **投递接口**: `Notifier` trait，附带进程内 outbox 实现
//! - **会话 Token**: `TokenIssuer` trait，默认 JWT 实现
//!
//! ## Features
//!
//! - `jwt` - 启用 JWT 会话 token 支持（默认启用）
//! - `full` - 启用所有功能
//!
//! 本库不负责 HTTP 路由、邮件模板或邮件服务商接入，这些由应用层完成。
//!
//! ## 示例
//!
#![cfg_attr(feature = "jwt", doc = "```rust")]
#![cfg_attr(not(feature = "jwt"), doc = "```rust,ignore")]
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use mailotp::notify::ChannelNotifier;
//! use mailotp::otp::{OtpConfig, OtpManager};
//! use mailotp::token::{JwtTokenIssuer, TokenPolicy};
//! use mailotp::Error;
//! use std::sync::Arc;
//!
//! let (notifier, mut outbox) = ChannelNotifier::new(64);
//! let tokens = JwtTokenIssuer::new(TokenPolicy::new("my-secret-key-at-least-32-bytes!!")).unwrap();
//! let manager = OtpManager::new(OtpConfig::default(), Arc::new(notifier), Arc::new(tokens)).unwrap();
//!
//! manager.begin("a@x.com").await.unwrap();
//! let delivery = outbox.recv().await.unwrap();
//!
//! match manager.verify("a@x.com", delivery.code()).await {
//!     Ok(session) => println!("token: {}", session.token),
//!     Err(Error::InvalidCode) => println!("wrong code"),
//!     Err(e) => println!("failed: {}", e.kind()),
//! }
//! # });
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod notify;
pub mod otp;
pub mod random;
pub mod token;

pub use error::{Error, Result};

// ============================================================================
// OTP 相关导出
// ============================================================================

pub use otp::{
    AttemptReservation, ChallengeStatus, ChallengeStore, DeliveryPayload, InMemoryChallengeStore,
    IssueReceipt, OtpConfig, OtpManager,
};

// ============================================================================
// 协作接口导出
// ============================================================================

pub use notify::{ChannelNotifier, Notifier};
pub use token::{SessionToken, TokenIssuer, TokenPolicy};

#[cfg(feature = "jwt")]
pub use token::{JwtTokenIssuer, SessionClaims};

pub use config::Settings;
