//! Verification session
//!
//! Holds the operator-editable seed chain, the published commitment for the
//! current server seed, and the capped audit log. Runs are serialized by a
//! busy flag: a run requested while another is in flight is rejected, never
//! interleaved.

use crate::config::EngineConfig;
use crate::errors::{CryptoError, VerificationError};
use crate::games::audit_log::{AuditLog, AuditLogEntry, LogKind};
use crate::games::hasher::{SeedHasher, Sha512Hasher};
use crate::games::resolvers;
use crate::games::stream::SeedStream;
use crate::games::types::{GameRequest, GameType, SeedConfiguration, VerificationReport};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hex SHA-512 of the raw server seed, as published before play
pub fn compute_commitment_hash(hasher: &dyn SeedHasher, server_seed: &str) -> Result<String, CryptoError> {
    hasher.sha512_hex(server_seed)
}

/// Lifecycle of the most recent run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Seeds and the commitment derived from them, updated together
struct SeedState {
    seeds: SeedConfiguration,
    commitment: Result<String, CryptoError>,
}

/// Holds the busy flag for one run.
///
/// A run dropped between `begin` and `finish` (client gone, request
/// timeout) is logged and left FAILED, never RUNNING.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a Mutex<SessionState>,
    log: &'a Mutex<AuditLog>,
    in_flight: Option<String>,
}

impl<'a> RunGuard<'a> {
    fn acquire(session: &'a VerificationSession) -> Option<Self> {
        session
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                flag: &session.running,
                state: &session.state,
                log: &session.log,
                in_flight: None,
            })
    }

    fn begin(&mut self, label: String) {
        *lock(self.state) = SessionState::Running;
        self.in_flight = Some(label);
    }

    fn finish(&mut self, state: SessionState) {
        *lock(self.state) = state;
        self.in_flight = None;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Some(label) = self.in_flight.take() {
            warn!("{} verification cancelled before completion", label);
            lock(self.log).record(LogKind::Error, label, "CRITICAL: run cancelled");
            *lock(self.state) = SessionState::Failed;
        }
        self.flag.store(false, Ordering::Release);
    }
}

pub struct VerificationSession {
    hasher: Arc<dyn SeedHasher>,
    engine: EngineConfig,
    seed_state: RwLock<SeedState>,
    running: AtomicBool,
    state: Mutex<SessionState>,
    log: Mutex<AuditLog>,
}

impl VerificationSession {
    /// Session backed by the RustCrypto hasher and default engine settings
    pub fn new(seeds: SeedConfiguration) -> Self {
        Self::with_hasher(seeds, Arc::new(Sha512Hasher), EngineConfig::default())
    }

    pub fn with_hasher(seeds: SeedConfiguration, hasher: Arc<dyn SeedHasher>, engine: EngineConfig) -> Self {
        let commitment = compute_commitment_hash(hasher.as_ref(), &seeds.server_seed);
        Self {
            hasher,
            engine,
            seed_state: RwLock::new(SeedState { seeds, commitment }),
            running: AtomicBool::new(false),
            state: Mutex::new(SessionState::Idle),
            log: Mutex::new(AuditLog::new()),
        }
    }

    pub fn seeds(&self) -> SeedConfiguration {
        self.seed_state.read().unwrap_or_else(PoisonError::into_inner).seeds.clone()
    }

    /// Commitment for the current server seed
    pub fn commitment_hash(&self) -> Result<String, VerificationError> {
        let state = self.seed_state.read().unwrap_or_else(PoisonError::into_inner);
        state.commitment.clone().map_err(VerificationError::from)
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Audit log snapshot, newest first
    pub fn audit_log(&self) -> Vec<AuditLogEntry> {
        lock(&self.log).entries()
    }

    pub fn set_server_seed(&self, server_seed: impl Into<String>) -> Result<(), VerificationError> {
        let server_seed = server_seed.into();
        self.update_seeds(|seeds| seeds.server_seed = server_seed)
    }

    pub fn set_client_seed(&self, client_seed: impl Into<String>) -> Result<(), VerificationError> {
        let client_seed = client_seed.into();
        self.update_seeds(|seeds| seeds.client_seed = client_seed)
    }

    pub fn set_nonce(&self, nonce: u64) -> Result<(), VerificationError> {
        self.update_seeds(|seeds| seeds.nonce = nonce)
    }

    pub fn set_cursor(&self, cursor: u64) -> Result<(), VerificationError> {
        self.update_seeds(|seeds| seeds.cursor = cursor)
    }

    /// Replace the client seed. The new seed must be non-blank and differ from the current one.
    pub fn rotate_client_seed(&self, new_client_seed: &str) -> Result<(), VerificationError> {
        if new_client_seed.trim().is_empty() {
            return Err(VerificationError::invalid("client_seed", new_client_seed, "cannot be blank"));
        }
        if self.seeds().client_seed == new_client_seed {
            return Err(VerificationError::invalid("client_seed", new_client_seed, "matches the active seed"));
        }
        self.set_client_seed(new_client_seed)?;
        info!("Client seed rotated");
        Ok(())
    }

    /// Edit the seed chain in place under the write lock, recomputing the
    /// commitment if the server seed changed. Rejected with `Busy` during a run.
    pub fn update_seeds<F>(&self, edit: F) -> Result<(), VerificationError>
    where
        F: FnOnce(&mut SeedConfiguration),
    {
        if self.is_running() {
            return Err(VerificationError::Busy);
        }

        let mut state = self.seed_state.write().unwrap_or_else(PoisonError::into_inner);
        let previous_server_seed = state.seeds.server_seed.clone();
        edit(&mut state.seeds);

        if state.seeds.server_seed != previous_server_seed {
            state.commitment = compute_commitment_hash(self.hasher.as_ref(), &state.seeds.server_seed);
            debug!("Server seed changed; commitment recomputed");
        }
        Ok(())
    }

    /// Validate loosely-typed parameters, then run.
    ///
    /// Invalid parameters are logged and returned without touching the stream.
    pub async fn run_with_params(
        &self,
        game_type: GameType,
        rows: Option<u32>,
        count: Option<u32>,
    ) -> Result<VerificationReport, VerificationError> {
        match GameRequest::from_params(game_type, rows, count, &self.engine) {
            Ok(request) => self.run_verification(request).await,
            Err(e) => {
                if self.is_running() {
                    return Err(VerificationError::Busy);
                }
                warn!("Rejected {} verification: {}", game_type, e);
                lock(&self.log).record(LogKind::Error, game_type.to_string(), format!("CRITICAL: {}", e));
                Err(e)
            }
        }
    }

    /// Run one verification at the session's current seeds and cursor
    pub async fn run_verification(&self, request: GameRequest) -> Result<VerificationReport, VerificationError> {
        let mut guard = match RunGuard::acquire(self) {
            Some(guard) => guard,
            None => {
                warn!("Verification requested while another is running; ignoring");
                return Err(VerificationError::Busy);
            }
        };

        let (seeds, commitment) = {
            let state = self.seed_state.read().unwrap_or_else(PoisonError::into_inner);
            (state.seeds.clone(), state.commitment.clone())
        };

        if let Err(e) = resolvers::check_window(&request, seeds.cursor) {
            warn!("Rejected {} verification: {}", request.label(), e);
            lock(&self.log).record(LogKind::Error, request.label(), format!("CRITICAL: {}", e));
            return Err(e);
        }

        guard.begin(request.label());

        lock(&self.log).record(
            LogKind::Status,
            "",
            format!("EXECUTING AUDIT (K:{})...", seeds.cursor),
        );

        if self.engine.pacing_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.engine.pacing_delay_ms)).await;
        }

        debug!(
            game = %request.game_type(),
            nonce = seeds.nonce,
            cursor = seeds.cursor,
            "Dispatching verification"
        );
        let result = self.execute(&seeds, commitment, request);

        match &result {
            Ok(report) => {
                info!("{} verified: {}", request.label(), report.display);
                lock(&self.log).record(LogKind::Success, request.label(), report.display.clone());
                guard.finish(SessionState::Succeeded);
            }
            Err(e) => {
                warn!("{} verification failed: {}", request.label(), e);
                lock(&self.log).record(LogKind::Error, request.label(), format!("CRITICAL: {}", e));
                guard.finish(SessionState::Failed);
            }
        }

        result
    }

    fn execute(
        &self,
        seeds: &SeedConfiguration,
        commitment: Result<String, CryptoError>,
        request: GameRequest,
    ) -> Result<VerificationReport, VerificationError> {
        let stream = SeedStream::new(self.hasher.as_ref(), seeds);
        let resolution = resolvers::resolve(&stream, &request, seeds.cursor)?;
        let commitment_hash = commitment?;

        Ok(VerificationReport {
            request,
            display: resolution.outcome.to_string(),
            outcome: resolution.outcome,
            nonce: seeds.nonce,
            start_cursor: seeds.cursor,
            next_cursor: resolution.next_cursor,
            commitment_hash,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
