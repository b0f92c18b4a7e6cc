use crate::errors::CryptoError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Hash primitives the seed stream is built on.
///
/// Both methods return lowercase hex. Implementations must match the audited
/// platform exactly (SHA-512, HMAC keyed by the server seed).
pub trait SeedHasher: Send + Sync {
    /// Unkeyed SHA-512 of `input`
    fn sha512_hex(&self, input: &str) -> Result<String, CryptoError>;

    /// HMAC-SHA-512 of `message` keyed by `key`
    fn hmac_sha512_hex(&self, key: &str, message: &str) -> Result<String, CryptoError>;
}

/// RustCrypto-backed hasher
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha512Hasher;

impl SeedHasher for Sha512Hasher {
    fn sha512_hex(&self, input: &str) -> Result<String, CryptoError> {
        Ok(hex::encode(Sha512::digest(input.as_bytes())))
    }

    fn hmac_sha512_hex(&self, key: &str, message: &str) -> Result<String, CryptoError> {
        let mut mac = HmacSha512::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError(format!("HMAC-SHA512 key rejected: {}", e)))?;
        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Hasher whose engine is missing; every call fails.
///
/// Lets callers and tests exercise the `CryptoEngineUnavailable` path.
#[derive(Debug, Clone)]
pub struct UnavailableHasher {
    reason: String,
}

impl UnavailableHasher {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for UnavailableHasher {
    fn default() -> Self {
        Self::new("HMAC-SHA512 engine not loaded")
    }
}

impl SeedHasher for UnavailableHasher {
    fn sha512_hex(&self, _input: &str) -> Result<String, CryptoError> {
        Err(CryptoError(self.reason.clone()))
    }

    fn hmac_sha512_hex(&self, _key: &str, _message: &str) -> Result<String, CryptoError> {
        Err(CryptoError(self.reason.clone()))
    }
}
