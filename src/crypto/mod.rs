//! 密码学工具模块
//!
//! ## 功能
//!
//! - **验证码摘要**: HMAC-SHA256 加盐摘要与常量时间比对
//!
//! ## 示例
//!
//! ```rust
//! use mailotp::crypto::{CodeHash, Salt};
//!
//! let salt = Salt::generate(16).unwrap();
//! let stored = CodeHash::compute(&salt, "482913").unwrap();
//!
//! // 只保存 salt 和 stored，原始验证码随即丢弃
//! assert!(stored.matches(&salt, "482913").unwrap());
//! ```

pub mod code_hash;

pub use code_hash::{CodeHash, MIN_SALT_LENGTH, Salt};
