pub mod types;
pub mod hasher;
pub mod stream;
pub mod resolvers;
pub mod audit_log;
pub mod session;

pub use types::*;
pub use hasher::{SeedHasher, Sha512Hasher, UnavailableHasher};
pub use stream::{SeedStream, StreamDraw};
pub use audit_log::{AuditLog, AuditLogEntry, LogKind, AUDIT_LOG_CAPACITY};
pub use session::{compute_commitment_hash, SessionState, VerificationSession};
