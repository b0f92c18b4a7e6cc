//! Request Handlers
//!
//! `/api/verify` and `/api/commitment` are stateless: every request gets its
//! own session. The `/api/session/*` routes drive one shared console session
//! whose busy flag serializes runs across clients.

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
};
use crate::{
    config::EngineConfig,
    games::{compute_commitment_hash, GameRequest, SeedConfiguration, SeedHasher, VerificationSession},
};
use axum::{extract::State, Extension, Json};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub hasher: Arc<dyn SeedHasher>,
    pub engine: EngineConfig,
    pub console: Arc<VerificationSession>,
}

impl AppState {
    pub fn new(hasher: Arc<dyn SeedHasher>, engine: EngineConfig, console_seeds: SeedConfiguration) -> Self {
        let console = Arc::new(VerificationSession::with_hasher(
            console_seeds,
            hasher.clone(),
            engine.clone(),
        ));
        Self { hasher, engine, console }
    }
}

/// Health check handler
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// One-shot verification with caller-supplied seeds
/// POST /api/verify
pub async fn verify_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let reject = |e| ApiError::from_verification(request_id.0.clone(), e);

    let nonce = non_negative("nonce", body.nonce).map_err(reject)?;
    let cursor = non_negative("cursor", body.cursor).map_err(reject)?;
    let request = GameRequest::from_params(body.game, body.rows, body.count, &state.engine).map_err(reject)?;

    let session = VerificationSession::with_hasher(
        SeedConfiguration::new(body.server_seed, body.client_seed, nonce, cursor),
        state.hasher.clone(),
        state.engine.clone(),
    );
    let report = session.run_verification(request).await.map_err(reject)?;

    Ok(Json(VerifyResponse {
        request: report.request,
        outcome: report.outcome,
        display: report.display,
        nonce: report.nonce,
        start_cursor: report.start_cursor,
        next_cursor: report.next_cursor,
        commitment_hash: report.commitment_hash,
    }))
}

/// POST /api/commitment
pub async fn commitment_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CommitmentRequest>,
) -> Result<Json<CommitmentResponse>, ApiError> {
    let commitment_hash = compute_commitment_hash(state.hasher.as_ref(), &body.server_seed)
        .map_err(|e| ApiError::from_verification(request_id.0, e.into()))?;

    Ok(Json(CommitmentResponse { commitment_hash }))
}

/// GET /api/session
pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(snapshot(&state.console))
}

/// PUT /api/session/seeds
pub async fn update_seeds_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateSeedsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let reject = |e| ApiError::from_verification(request_id.0.clone(), e);

    // Validate every field before touching the session
    let nonce = body.nonce.map(|n| non_negative("nonce", n)).transpose().map_err(reject)?;
    let cursor = body.cursor.map(|c| non_negative("cursor", c)).transpose().map_err(reject)?;

    state
        .console
        .update_seeds(|seeds| {
            if let Some(server_seed) = body.server_seed {
                seeds.server_seed = server_seed;
            }
            if let Some(client_seed) = body.client_seed {
                seeds.client_seed = client_seed;
            }
            if let Some(nonce) = nonce {
                seeds.nonce = nonce;
            }
            if let Some(cursor) = cursor {
                seeds.cursor = cursor;
            }
        })
        .map_err(reject)?;

    Ok(Json(snapshot(&state.console)))
}

/// POST /api/session/rotate
pub async fn rotate_seed_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RotateSeedRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    state
        .console
        .rotate_client_seed(&body.client_seed)
        .map_err(|e| ApiError::from_verification(request_id.0, e))?;

    Ok(Json(snapshot(&state.console)))
}

/// POST /api/session/run
pub async fn run_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let report = state
        .console
        .run_with_params(body.game, body.rows, body.count)
        .await
        .map_err(|e| ApiError::from_verification(request_id.0, e))?;

    Ok(Json(VerifyResponse {
        request: report.request,
        outcome: report.outcome,
        display: report.display,
        nonce: report.nonce,
        start_cursor: report.start_cursor,
        next_cursor: report.next_cursor,
        commitment_hash: report.commitment_hash,
    }))
}

/// GET /api/session/log
pub async fn audit_log_handler(State(state): State<Arc<AppState>>) -> Json<AuditLogResponse> {
    Json(AuditLogResponse {
        entries: state.console.audit_log(),
    })
}

fn snapshot(session: &VerificationSession) -> SessionResponse {
    let seeds = session.seeds();
    SessionResponse {
        server_seed: seeds.server_seed,
        client_seed: seeds.client_seed,
        nonce: seeds.nonce,
        cursor: seeds.cursor,
        commitment_hash: session.commitment_hash().ok(),
        state: session.state(),
    }
}
