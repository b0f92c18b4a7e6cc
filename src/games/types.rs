use crate::config::EngineConfig;
use crate::errors::VerificationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of tiles on a Mines board
pub const MINES_BOARD_SIZE: u32 = 25;

/// Row counts offered by the audited Plinko boards
pub const PLINKO_ROW_OPTIONS: [u32; 5] = [8, 10, 12, 14, 16];

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Dice,
    Float,
    Plinko,
    Mines,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Dice => write!(f, "DICE"),
            GameType::Float => write!(f, "FLOAT"),
            GameType::Plinko => write!(f, "PLINKO"),
            GameType::Mines => write!(f, "MINES"),
        }
    }
}

impl FromStr for GameType {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dice" => Ok(GameType::Dice),
            "float" => Ok(GameType::Float),
            "plinko" => Ok(GameType::Plinko),
            "mines" => Ok(GameType::Mines),
            _ => Err(VerificationError::invalid("game", s, "expected one of dice, float, plinko, mines")),
        }
    }
}

/// Seed chain parameters for one verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfiguration {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    pub cursor: u64,
}

impl SeedConfiguration {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64, cursor: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
            cursor,
        }
    }

    /// HMAC message for the given stream position
    pub fn message(&self, cursor: u64) -> String {
        format!("{}:{}:{}", self.client_seed, self.nonce, cursor)
    }
}

/// Plinko row count, restricted to the board sizes in [`PLINKO_ROW_OPTIONS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PlinkoRows(u32);

impl PlinkoRows {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PlinkoRows {
    type Error = VerificationError;

    fn try_from(rows: u32) -> Result<Self, Self::Error> {
        if PLINKO_ROW_OPTIONS.contains(&rows) {
            Ok(PlinkoRows(rows))
        } else {
            Err(VerificationError::invalid("rows", rows, "must be one of 8, 10, 12, 14, 16"))
        }
    }
}

impl From<PlinkoRows> for u32 {
    fn from(rows: PlinkoRows) -> Self {
        rows.0
    }
}

/// Number of mines; at least one tile on the board stays safe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MinesCount(u32);

impl MinesCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = MINES_BOARD_SIZE - 1;

    pub fn new(count: u32) -> Result<Self, VerificationError> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(MinesCount(count))
        } else {
            Err(VerificationError::invalid("count", count, "must be between 1 and 24"))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for MinesCount {
    type Error = VerificationError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        MinesCount::new(count)
    }
}

impl From<MinesCount> for u32 {
    fn from(count: MinesCount) -> Self {
        count.0
    }
}

/// A game to verify together with its game-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameRequest {
    Dice,
    Float,
    Plinko { rows: PlinkoRows },
    Mines { count: MinesCount },
}

impl GameRequest {
    /// Build a request from loosely-typed input, filling absent parameters from config
    pub fn from_params(
        game_type: GameType,
        rows: Option<u32>,
        count: Option<u32>,
        defaults: &EngineConfig,
    ) -> Result<Self, VerificationError> {
        Ok(match game_type {
            GameType::Dice => GameRequest::Dice,
            GameType::Float => GameRequest::Float,
            GameType::Plinko => GameRequest::Plinko {
                rows: PlinkoRows::try_from(rows.unwrap_or(defaults.default_plinko_rows))?,
            },
            GameType::Mines => GameRequest::Mines {
                count: MinesCount::new(count.unwrap_or(defaults.default_mines_count))?,
            },
        })
    }

    pub fn game_type(&self) -> GameType {
        match self {
            GameRequest::Dice => GameType::Dice,
            GameRequest::Float => GameType::Float,
            GameRequest::Plinko { .. } => GameType::Plinko,
            GameRequest::Mines { .. } => GameType::Mines,
        }
    }

    /// Stream values consumed by one run of this game
    pub fn cursors_required(&self) -> u64 {
        match self {
            GameRequest::Dice | GameRequest::Float => 1,
            GameRequest::Plinko { rows } => rows.get() as u64,
            GameRequest::Mines { count } => count.get() as u64,
        }
    }

    /// Audit log label, e.g. `PLINKO (R:16)`
    pub fn label(&self) -> String {
        match self {
            GameRequest::Dice | GameRequest::Float => self.game_type().to_string(),
            GameRequest::Plinko { rows } => format!("PLINKO (R:{})", rows.get()),
            GameRequest::Mines { count } => format!("MINES (C:{})", count.get()),
        }
    }
}

/// Resolved outcome (discriminated union)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameOutcome {
    Dice { roll: f64 },
    Float { value: f64 },
    Plinko { bucket: u32, rows_consumed: u32 },
    Mines { mine_positions: Vec<u8> },
}

impl GameOutcome {
    pub fn game_type(&self) -> GameType {
        match self {
            GameOutcome::Dice { .. } => GameType::Dice,
            GameOutcome::Float { .. } => GameType::Float,
            GameOutcome::Plinko { .. } => GameType::Plinko,
            GameOutcome::Mines { .. } => GameType::Mines,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Dice { roll } => write!(f, "ROLLED: {:.4}", roll),
            GameOutcome::Float { value } => write!(f, "RAW VALUE: {:.18}", value),
            GameOutcome::Plinko { bucket, rows_consumed } => write!(
                f,
                "PATH: {} / {} ({} RNG calls consumed)",
                bucket, rows_consumed, rows_consumed
            ),
            GameOutcome::Mines { mine_positions } => {
                write!(f, "MINE LOCATIONS (0-24, {} picks):", mine_positions.len())?;
                for pos in mine_positions {
                    write!(f, " {:02}", pos)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome plus the first stream position left unconsumed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: GameOutcome,
    pub next_cursor: u64,
}

/// Result of a completed verification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub request: GameRequest,
    pub outcome: GameOutcome,
    pub display: String,
    pub nonce: u64,
    pub start_cursor: u64,
    pub next_cursor: u64,
    pub commitment_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_parsing() {
        assert_eq!("DICE".parse::<GameType>().unwrap(), GameType::Dice);
        assert_eq!(" plinko ".parse::<GameType>().unwrap(), GameType::Plinko);
        assert!(matches!(
            "roulette".parse::<GameType>(),
            Err(VerificationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_plinko_rows_restricted() {
        for rows in PLINKO_ROW_OPTIONS {
            assert_eq!(PlinkoRows::try_from(rows).unwrap().get(), rows);
        }
        assert!(PlinkoRows::try_from(9).is_err());
        assert!(PlinkoRows::try_from(0).is_err());
        assert!(PlinkoRows::try_from(18).is_err());
    }

    #[test]
    fn test_mines_count_bounds() {
        assert!(MinesCount::new(0).is_err());
        assert!(MinesCount::new(25).is_err());
        assert_eq!(MinesCount::new(24).unwrap().get(), 24);
    }

    #[test]
    fn test_request_from_params_uses_defaults() {
        let defaults = EngineConfig::default();
        let plinko = GameRequest::from_params(GameType::Plinko, None, None, &defaults).unwrap();
        assert_eq!(plinko.cursors_required(), 16);
        assert_eq!(plinko.label(), "PLINKO (R:16)");

        let mines = GameRequest::from_params(GameType::Mines, None, Some(5), &defaults).unwrap();
        assert_eq!(mines.label(), "MINES (C:5)");
        assert_eq!(GameRequest::Dice.cursors_required(), 1);

        assert!(GameRequest::from_params(GameType::Mines, None, Some(30), &defaults).is_err());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(GameOutcome::Dice { roll: 8.57 }.to_string(), "ROLLED: 8.5700");
        assert_eq!(
            GameOutcome::Plinko { bucket: 8, rows_consumed: 16 }.to_string(),
            "PATH: 8 / 16 (16 RNG calls consumed)"
        );
        assert_eq!(
            GameOutcome::Mines { mine_positions: vec![0, 2, 13] }.to_string(),
            "MINE LOCATIONS (0-24, 3 picks): 00 02 13"
        );
    }

    #[test]
    fn test_request_serde_rejects_bad_rows() {
        let ok: GameRequest = serde_json::from_str(r#"{"game":"plinko","rows":12}"#).unwrap();
        assert_eq!(ok, GameRequest::Plinko { rows: PlinkoRows::try_from(12).unwrap() });
        assert!(serde_json::from_str::<GameRequest>(r#"{"game":"plinko","rows":11}"#).is_err());
    }
}
