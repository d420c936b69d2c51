//! 验证码摘要
//!
//! 验证码只以 `HMAC-SHA256(key = salt, message = code)` 的形式保存。
//! 每次签发使用独立的随机盐值，相同的验证码在两次签发中得到不同的摘要。
//!
//! ```rust
//! use mailotp::crypto::{CodeHash, Salt};
//!
//! let salt = Salt::generate(16).unwrap();
//! let hash = CodeHash::compute(&salt, "482913").unwrap();
//!
//! assert!(hash.matches(&salt, "482913").unwrap());
//! assert!(!hash.matches(&salt, "482914").unwrap());
//! ```

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::Sha256;

use crate::error::{CryptoError, Error, Result};
use crate::random::{constant_time_compare, generate_random_bytes, hex_encode};

type HmacSha256 = Hmac<Sha256>;

/// 盐值的最小长度（字节）
pub const MIN_SALT_LENGTH: usize = 16;

/// 每次签发独立生成的随机盐值
///
/// 同时作为一次签发的标识，用于存储层的 compare-and-delete。
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// 生成指定长度的随机盐值
    pub fn generate(length: usize) -> Result<Self> {
        if length < MIN_SALT_LENGTH {
            return Err(Error::Crypto(CryptoError::InvalidKey(format!(
                "salt must be at least {} bytes",
                MIN_SALT_LENGTH
            ))));
        }
        Ok(Self(generate_random_bytes(length)?))
    }

    /// 从已有字节构造（供自定义存储后端反序列化使用）
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt([REDACTED; {}])", self.0.len())
    }
}

/// 验证码的加盐摘要
#[derive(Clone, PartialEq, Eq)]
pub struct CodeHash([u8; 32]);

impl CodeHash {
    /// 计算 `HMAC-SHA256(salt, code)`
    pub fn compute(salt: &Salt, code: &str) -> Result<Self> {
        let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
            .map_err(|_| Error::Crypto(CryptoError::InvalidKey("invalid salt".to_string())))?;
        mac.update(code.as_bytes());
        Ok(Self(mac.finalize().into_bytes().into()))
    }

    /// 常量时间判断提交的验证码是否与摘要一致
    pub fn matches(&self, salt: &Salt, submitted: &str) -> Result<bool> {
        let candidate = Self::compute(salt, submitted)?;
        Ok(constant_time_compare(&self.0, &candidate.0))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 十六进制表示（供持久化后端使用）
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl fmt::Debug for CodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeHash([REDACTED])")
    }
}

// 持久化时盐值与摘要都编码为 base64url（无填充）

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bytes = decode_base64::<D>(deserializer)?;
        if bytes.len() < MIN_SALT_LENGTH {
            return Err(de::Error::invalid_length(
                bytes.len(),
                &"a salt of at least 16 bytes",
            ));
        }
        Ok(Self(bytes))
    }
}

impl Serialize for CodeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl<'de> Deserialize<'de> for CodeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bytes = decode_base64::<D>(deserializer)?;
        let len = bytes.len();
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| de::Error::invalid_length(len, &"a 32-byte HMAC-SHA256 digest"))?;
        Ok(Self(array))
    }
}

fn decode_base64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    URL_SAFE_NO_PAD.decode(encoded.as_bytes()).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_base64url() {
        let salt = Salt::from_bytes(vec![0xfb; 16]);
        let hash = CodeHash::compute(&salt, "482913").unwrap();

        let json = serde_json::to_string(&salt).unwrap();
        assert_eq!(json, "\"-_v7-_v7-_v7-_v7-_v7-w\"");

        let encoded = serde_json::to_string(&hash).unwrap();
        let decoded: CodeHash = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, hash);
    }

    #[test]
    fn test_deserialize_rejects_bad_lengths() {
        assert!(serde_json::from_str::<Salt>("\"AAAA\"").is_err());
        assert!(serde_json::from_str::<CodeHash>("\"AAAA\"").is_err());
        assert!(serde_json::from_str::<CodeHash>("\"not base64!\"").is_err());
    }

    #[test]
    fn test_matches_correct_code_only() {
        let salt = Salt::generate(16).unwrap();
        let hash = CodeHash::compute(&salt, "111111").unwrap();

        assert!(hash.matches(&salt, "111111").unwrap());
        assert!(!hash.matches(&salt, "111112").unwrap());
        assert!(!hash.matches(&salt, "").unwrap());
    }

    #[test]
    fn test_same_code_different_salts() {
        let s1 = Salt::generate(16).unwrap();
        let s2 = Salt::generate(16).unwrap();
        assert_ne!(s1, s2);

        let h1 = CodeHash::compute(&s1, "482913").unwrap();
        let h2 = CodeHash::compute(&s2, "482913").unwrap();
        assert_ne!(h1, h2);

        // 摘要与盐值绑定
        assert!(!h1.matches(&s2, "482913").unwrap());
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let salt = Salt::from_bytes(b"Jefe".to_vec());
        let hash = CodeHash::compute(&salt, "what do ya want for nothing?").unwrap();
        assert_eq!(
            hash.to_hex(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_short_salt_rejected() {
        assert!(Salt::generate(8).is_err());
        assert_eq!(Salt::generate(32).unwrap().len(), 32);
    }

    #[test]
    fn test_debug_is_redacted() {
        let salt = Salt::from_bytes(vec![0xab; 16]);
        let hash = CodeHash::compute(&salt, "123456").unwrap();

        assert_eq!(format!("{:?}", salt), "Salt([REDACTED; 16])");
        assert_eq!(format!("{:?}", hash), "CodeHash([REDACTED])");
    }
}
