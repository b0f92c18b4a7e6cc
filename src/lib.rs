//! Zapway Audit - provably-fair verification engine
//!
//! Re-derives casino game outcomes (dice, float, plinko, mines) from a
//! revealed server seed, a client seed, a nonce and a stream cursor, using
//! the HMAC-SHA512 stream the audited operators publish. Anyone holding the
//! seeds can check a round independently of the operator.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;

pub use config::{AuditConfig, ConfigLoader};
pub use errors::{AuditError, AuditResult, CryptoError, VerificationError};
pub use games::{
    compute_commitment_hash, GameOutcome, GameRequest, GameType, SeedConfiguration, SeedHasher,
    Sha512Hasher, VerificationReport, VerificationSession,
};
