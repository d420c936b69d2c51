//! 邮件 OTP (One-Time Passcode) 模块
//!
//! 服务端生成随机数字验证码，通过邮件发送给用户，用户提交后换取会话 token。
//!
//! ## 工作流程
//!
//! 1. 用户请求登录（输入邮箱）
//! 2. [`OtpManager::begin`] 生成验证码，只保存加盐摘要，并交给 Notifier 投递
//! 3. 用户输入收到的验证码
//! 4. [`OtpManager::verify`] 检查是否存在、是否过期、是否匹配
//! 5. 验证成功后挑战被消费，TokenIssuer 签发会话 token
//!
//! ## 挑战的生命周期
//!
//! | 操作 | 结果 |
//! |------|------|
//! | `issue` | 创建，覆盖同一身份已有的挑战 |
//! | `verify` 成功 | 删除 |
//! | `verify` 过期 | 删除，返回 `Expired` |
//! | `verify` 错误 | 保留，返回 `InvalidCode`（达到上限后删除） |
//! | `revoke` / 后台清理 | 删除 |
//!
//! ## 安全考虑
//!
//! - 验证码与盐值都来自 CSPRNG，盐值每次签发独立生成
//! - 存储中只有 `HMAC-SHA256(salt, code)`，比对使用常量时间
//! - 并发验证同一挑战时只有一个请求成功，其余返回 `NotFound`
//! - 原始验证码只出现在 [`DeliveryPayload`] 中，且 `Debug` 输出被隐藏

pub mod challenge;
pub mod config;
pub mod manager;
pub mod store;

pub use challenge::{Challenge, ChallengeStatus, DeliveryPayload, IssueReceipt};
pub use config::{DEFAULT_TTL, MAX_TTL, OtpConfig};
pub use manager::{CodeGenerator, OtpManager, RandomCodeGenerator};
pub use store::{AttemptReservation, ChallengeStore, InMemoryChallengeStore};
