//! 安全随机数生成模块
//!
//! 提供密码学安全的随机数生成功能，用于生成验证码、盐值和 token ID。

use rand::{Rng, TryRngCore, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use mailotp::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(16).unwrap();
/// assert_eq!(bytes.len(), 16);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 生成指定长度的十六进制随机字符串
///
/// 最终字符串长度为字节数的两倍
pub fn generate_random_hex(byte_length: usize) -> Result<String> {
    let bytes = generate_random_bytes(byte_length)?;
    Ok(hex_encode(&bytes))
}

/// 生成固定位数的数字验证码
///
/// 在 `[10^(digits-1), 10^digits - 1]` 上均匀取值，首位不为 0。
/// `ThreadRng` 是由操作系统熵源播种并定期重播种的 CSPRNG。
///
/// # Example
///
/// ```rust
/// use mailotp::random::generate_numeric_code;
///
/// let code = generate_numeric_code(6);
/// assert_eq!(code.len(), 6);
/// let value: u64 = code.parse().unwrap();
/// assert!((100_000..=999_999).contains(&value));
/// ```
pub fn generate_numeric_code(digits: u32) -> String {
    // u64 最多容纳 19 位
    let digits = digits.clamp(1, 19);
    let min = 10u64.pow(digits - 1);
    let max = 10u64.pow(digits) - 1;
    rand::rng().random_range(min..=max).to_string()
}

/// 将字节数组编码为十六进制字符串
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// 常量时间比较两个字节切片
///
/// 用于防止时序攻击
///
/// ```rust
/// use mailotp::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"digest", b"digest"));
/// assert!(!constant_time_compare(b"digest", b"digesT"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
