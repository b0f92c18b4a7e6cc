use crate::errors::VerificationError;
use crate::games::hasher::SeedHasher;
use crate::games::types::SeedConfiguration;

/// Hex characters taken from each digest (56 bits)
const DIGEST_PREFIX_LEN: usize = 14;

/// 2^56, the exclusive upper bound of the parsed prefix
const STREAM_SCALE: f64 = (1u64 << 56) as f64;

/// Largest f64 below 1.0
const STREAM_CEILING: f64 = 1.0 - f64::EPSILON / 2.0;

/// Integer drawn from the stream plus the next unused cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDraw {
    pub value: u64,
    pub next_cursor: u64,
}

/// Deterministic value stream for one seed chain.
///
/// Holds no state of its own: the value at a cursor is a pure function of
/// the seeds, the nonce and that cursor.
pub struct SeedStream<'a> {
    hasher: &'a dyn SeedHasher,
    seeds: &'a SeedConfiguration,
}

impl<'a> SeedStream<'a> {
    pub fn new(hasher: &'a dyn SeedHasher, seeds: &'a SeedConfiguration) -> Self {
        Self { hasher, seeds }
    }

    /// Float in [0, 1) at `cursor`
    pub fn derive_float(&self, cursor: u64) -> Result<f64, VerificationError> {
        let digest = self
            .hasher
            .hmac_sha512_hex(&self.seeds.server_seed, &self.seeds.message(cursor))?;

        let prefix = digest.get(..DIGEST_PREFIX_LEN).ok_or_else(|| {
            VerificationError::CryptoEngineUnavailable(format!(
                "digest too short ({} hex chars)",
                digest.len()
            ))
        })?;
        let bits = u64::from_str_radix(prefix, 16).map_err(|e| {
            VerificationError::CryptoEngineUnavailable(format!("digest is not hex: {}", e))
        })?;

        // Prefixes within a few units of 2^56 round up to 2^56 when widened to f64.
        Ok((bits as f64 / STREAM_SCALE).min(STREAM_CEILING))
    }

    /// Integer in [0, max_exclusive) at `cursor`
    pub fn derive_integer(&self, max_exclusive: u64, cursor: u64) -> Result<StreamDraw, VerificationError> {
        if max_exclusive == 0 {
            return Err(VerificationError::invalid("max_exclusive", 0, "must be positive"));
        }
        let next_cursor = cursor
            .checked_add(1)
            .ok_or_else(|| VerificationError::invalid("cursor", cursor, "stream exhausted"))?;

        let float = self.derive_float(cursor)?;
        let value = ((float * max_exclusive as f64).floor() as u64).min(max_exclusive - 1);
        Ok(StreamDraw { value, next_cursor })
    }
}
