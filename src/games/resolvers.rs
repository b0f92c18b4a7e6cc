//! Game resolvers
//!
//! Each resolver consumes stream values starting at a cursor, in the exact
//! order the audited game servers do, and maps them to an outcome.

use crate::errors::VerificationError;
use crate::games::stream::SeedStream;
use crate::games::types::{GameOutcome, GameRequest, MinesCount, PlinkoRows, Resolution, MINES_BOARD_SIZE};

/// End of the cursor window `request` consumes from `cursor`, if it fits in the stream
pub fn check_window(request: &GameRequest, cursor: u64) -> Result<u64, VerificationError> {
    cursor
        .checked_add(request.cursors_required())
        .ok_or_else(|| VerificationError::invalid("cursor", cursor, "cursor window overflows"))
}

/// Resolve any game request starting at `cursor`
pub fn resolve(stream: &SeedStream<'_>, request: &GameRequest, cursor: u64) -> Result<Resolution, VerificationError> {
    // Nothing is hashed for a window that runs past the end of the stream.
    check_window(request, cursor)?;

    match request {
        GameRequest::Dice => resolve_dice(stream, cursor),
        GameRequest::Float => resolve_float(stream, cursor),
        GameRequest::Plinko { rows } => resolve_plinko(stream, *rows, cursor),
        GameRequest::Mines { count } => resolve_mines(stream, *count, cursor),
    }
}

/// floor(f * 10001) / 100. Two decimals of real resolution, shown with four.
fn resolve_dice(stream: &SeedStream<'_>, cursor: u64) -> Result<Resolution, VerificationError> {
    let float = stream.derive_float(cursor)?;
    let roll = (float * 10001.0).floor() / 100.0;

    Ok(Resolution {
        outcome: GameOutcome::Dice { roll },
        next_cursor: cursor + 1,
    })
}

fn resolve_float(stream: &SeedStream<'_>, cursor: u64) -> Result<Resolution, VerificationError> {
    let value = stream.derive_float(cursor)?;

    Ok(Resolution {
        outcome: GameOutcome::Float { value },
        next_cursor: cursor + 1,
    })
}

/// One value per row; a value >= 0.5 sends the ball right
fn resolve_plinko(stream: &SeedStream<'_>, rows: PlinkoRows, cursor: u64) -> Result<Resolution, VerificationError> {
    let mut current = cursor;
    let mut bucket = 0;

    for _ in 0..rows.get() {
        let float = stream.derive_float(current)?;
        current += 1;
        if float >= 0.5 {
            bucket += 1;
        }
    }

    Ok(Resolution {
        outcome: GameOutcome::Plinko {
            bucket,
            rows_consumed: rows.get(),
        },
        next_cursor: current,
    })
}

/// Partial Fisher-Yates draw over the 25 tiles, sorted ascending
fn resolve_mines(stream: &SeedStream<'_>, count: MinesCount, cursor: u64) -> Result<Resolution, VerificationError> {
    let mut available: Vec<u8> = (0..MINES_BOARD_SIZE as u8).collect();
    let mut positions = Vec::with_capacity(count.get() as usize);
    let mut current = cursor;

    for _ in 0..count.get() {
        let draw = stream.derive_integer(available.len() as u64, current)?;
        current = draw.next_cursor;
        positions.push(available.remove(draw.value as usize));
    }
    positions.sort_unstable();

    Ok(Resolution {
        outcome: GameOutcome::Mines { mine_positions: positions },
        next_cursor: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CryptoError;
    use crate::games::hasher::{SeedHasher, Sha512Hasher, UnavailableHasher};
    use crate::games::types::SeedConfiguration;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts HMAC invocations
    #[derive(Default)]
    struct CountingHasher {
        calls: AtomicUsize,
    }

    impl SeedHasher for CountingHasher {
        fn sha512_hex(&self, input: &str) -> Result<String, CryptoError> {
            Sha512Hasher.sha512_hex(input)
        }

        fn hmac_sha512_hex(&self, key: &str, message: &str) -> Result<String, CryptoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Sha512Hasher.hmac_sha512_hex(key, message)
        }
    }

    fn seeds() -> SeedConfiguration {
        SeedConfiguration::new(
            "a1b2c3d4e5f6789012345678901234567890123456789012345678901234",
            "zap_player_42",
            1,
            0,
        )
    }

    fn rows(n: u32) -> PlinkoRows {
        PlinkoRows::try_from(n).unwrap()
    }

    #[test]
    fn test_dice_known_answer() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);
        let resolution = resolve_dice(&stream, 0).unwrap();

        assert_eq!(resolution.outcome, GameOutcome::Dice { roll: 8.57 });
        assert_eq!(resolution.outcome.to_string(), "ROLLED: 8.5700");
        assert_eq!(resolution.next_cursor, 1);
    }

    #[test]
    fn test_dice_depends_on_nonce() {
        let seeds = SeedConfiguration { nonce: 2, ..seeds() };
        let stream = SeedStream::new(&Sha512Hasher, &seeds);
        assert_eq!(resolve_dice(&stream, 0).unwrap().outcome, GameOutcome::Dice { roll: 66.59 });
    }

    #[test]
    fn test_dice_range() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);
        for cursor in 0..100 {
            match resolve_dice(&stream, cursor).unwrap().outcome {
                GameOutcome::Dice { roll } => assert!((0.0..=100.0).contains(&roll)),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_float_is_raw_stream_value() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);
        let resolution = resolve_float(&stream, 0).unwrap();

        assert_eq!(resolution.outcome, GameOutcome::Float { value: 0.08570681499296509 });
        assert_eq!(resolution.outcome.to_string(), "RAW VALUE: 0.085706814992965091");
    }

    #[test]
    fn test_plinko_known_answers() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);

        let first = resolve_plinko(&stream, rows(16), 0).unwrap();
        assert_eq!(first.outcome, GameOutcome::Plinko { bucket: 8, rows_consumed: 16 });
        assert_eq!(first.next_cursor, 16);

        let next_round = resolve_plinko(&stream, rows(16), 16).unwrap();
        assert_eq!(next_round.outcome, GameOutcome::Plinko { bucket: 11, rows_consumed: 16 });
        assert_eq!(next_round.next_cursor, 32);

        let short = resolve_plinko(&stream, rows(8), 0).unwrap();
        assert_eq!(short.outcome, GameOutcome::Plinko { bucket: 3, rows_consumed: 8 });
    }

    #[test]
    fn test_plinko_consumes_exactly_rows_values() {
        let seeds = seeds();
        for r in [8, 10, 12, 14, 16] {
            let hasher = CountingHasher::default();
            let stream = SeedStream::new(&hasher, &seeds);
            let resolution = resolve_plinko(&stream, rows(r), 5).unwrap();

            assert_eq!(hasher.calls.load(Ordering::SeqCst), r as usize);
            assert_eq!(resolution.next_cursor, 5 + r as u64);
            match resolution.outcome {
                GameOutcome::Plinko { bucket, rows_consumed } => {
                    assert!(bucket <= r);
                    assert_eq!(rows_consumed, r);
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_mines_known_answer() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);
        let resolution = resolve_mines(&stream, MinesCount::new(3).unwrap(), 0).unwrap();

        assert_eq!(resolution.outcome, GameOutcome::Mines { mine_positions: vec![0, 2, 3] });
        assert_eq!(resolution.next_cursor, 3);

        let single = resolve_mines(&stream, MinesCount::new(1).unwrap(), 5).unwrap();
        assert_eq!(single.outcome, GameOutcome::Mines { mine_positions: vec![24] });
    }

    #[test]
    fn test_mines_never_repeats_a_tile() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);

        for count in 1..=24 {
            for cursor in [0, 7, 100] {
                let resolution = resolve_mines(&stream, MinesCount::new(count).unwrap(), cursor).unwrap();
                let positions = match resolution.outcome {
                    GameOutcome::Mines { mine_positions } => mine_positions,
                    other => panic!("unexpected outcome {:?}", other),
                };

                let unique: HashSet<_> = positions.iter().collect();
                assert_eq!(positions.len(), count as usize);
                assert_eq!(unique.len(), count as usize);
                assert!(positions.iter().all(|p| *p < 25));
                assert!(positions.windows(2).all(|w| w[0] < w[1]));
                assert_eq!(resolution.next_cursor, cursor + count as u64);
            }
        }
    }

    #[test]
    fn test_mines_full_board_leaves_one_safe_tile() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);
        let resolution = resolve_mines(&stream, MinesCount::new(24).unwrap(), 0).unwrap();

        let expected: Vec<u8> = (0..25).filter(|t| *t != 10).collect();
        assert_eq!(resolution.outcome, GameOutcome::Mines { mine_positions: expected });
    }

    #[test]
    fn test_resolve_dispatch_and_overflow() {
        let seeds = seeds();
        let stream = SeedStream::new(&Sha512Hasher, &seeds);

        let dice = resolve(&stream, &GameRequest::Dice, 0).unwrap();
        assert_eq!(dice.outcome.game_type(), crate::games::types::GameType::Dice);

        let hasher = CountingHasher::default();
        let counted = SeedStream::new(&hasher, &seeds);
        let result = resolve(&counted, &GameRequest::Plinko { rows: rows(16) }, u64::MAX - 3);
        assert!(matches!(result, Err(VerificationError::InvalidParameter { .. })));
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);

        assert_eq!(check_window(&GameRequest::Plinko { rows: rows(8) }, 16).unwrap(), 24);
        assert!(check_window(&GameRequest::Dice, u64::MAX).is_err());
    }

    #[test]
    fn test_engine_failure_propagates() {
        let seeds = seeds();
        let hasher = UnavailableHasher::default();
        let stream = SeedStream::new(&hasher, &seeds);

        for request in [
            GameRequest::Dice,
            GameRequest::Float,
            GameRequest::Plinko { rows: rows(8) },
            GameRequest::Mines { count: MinesCount::new(3).unwrap() },
        ] {
            assert!(matches!(
                resolve(&stream, &request, 0),
                Err(VerificationError::CryptoEngineUnavailable(_))
            ));
        }
    }
}
