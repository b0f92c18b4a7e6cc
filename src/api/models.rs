//! API Request/Response Models

use crate::{
    errors::VerificationError,
    games::{AuditLogEntry, GameOutcome, GameRequest, GameType, SessionState},
};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Stateless one-shot verification
/// POST /api/verify
///
/// `nonce` and `cursor` are signed so negative input can be reported as an
/// invalid parameter instead of a generic body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: i64,
    #[serde(default)]
    pub cursor: i64,
    pub game: GameType,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub request: GameRequest,
    pub outcome: GameOutcome,
    pub display: String,
    pub nonce: u64,
    pub start_cursor: u64,
    pub next_cursor: u64,
    pub commitment_hash: String,
}

/// POST /api/commitment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentRequest {
    pub server_seed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentResponse {
    pub commitment_hash: String,
}

/// Shared console session snapshot
/// GET /api/session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    pub cursor: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment_hash: Option<String>,
    pub state: SessionState,
}

/// Partial seed update; absent fields are left unchanged
/// PUT /api/session/seeds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSeedsRequest {
    #[serde(default)]
    pub server_seed: Option<String>,
    #[serde(default)]
    pub client_seed: Option<String>,
    #[serde(default)]
    pub nonce: Option<i64>,
    #[serde(default)]
    pub cursor: Option<i64>,
}

/// POST /api/session/rotate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateSeedRequest {
    pub client_seed: String,
}

/// POST /api/session/run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub game: GameType,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// GET /api/session/log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogResponse {
    pub entries: Vec<AuditLogEntry>,
}

/// Convert a signed wire value into a stream index
pub fn non_negative(field: &str, value: i64) -> Result<u64, VerificationError> {
    u64::try_from(value).map_err(|_| VerificationError::invalid(field, value, "must be non-negative"))
}
