//! Engine configuration.
//!
//! All tuning knobs are supplied at engine construction. The only mid-game
//! mutation points are the GTP `boardsize` and `komi` commands, which go
//! through [`validate_board_size`] / the config again.

use std::time::Duration;

use thiserror::Error;

/// Smallest board the engine accepts.
pub const MIN_BOARD_SIZE: usize = 2;
/// Largest board the engine accepts (GTP's column letters run out at 25).
pub const MAX_BOARD_SIZE: usize = 25;

/// Default number of search playouts per generated move.
pub const DEFAULT_PLAYOUTS: usize = 1000;
/// Default PUCT exploration constant.
pub const DEFAULT_C_PUCT: f64 = 1.4;
/// Default komi.
pub const DEFAULT_KOMI: f32 = 7.5;

/// Invalid configuration supplied by the caller or over GTP.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unacceptable size: {0} (supported: {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE})")]
    BoardSize(usize),
    #[error("komi must be finite, got {0}")]
    Komi(f32),
    #[error("playout budget must be at least 1")]
    Playouts,
}

/// Engine-wide settings: board geometry, scoring, and search budget.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Side length of the (square) board.
    pub board_size: usize,
    pub komi: f32,
    /// Iteration budget for one search.
    pub playouts: usize,
    /// Optional wall-clock budget; the search stops at whichever of
    /// `playouts` / `time_budget` runs out first.
    pub time_budget: Option<Duration>,
    /// PUCT exploration constant.
    pub c_puct: f64,
    /// Seed for rollout and sampling randomness; fixed for reproducibility.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            board_size: 9,
            komi: DEFAULT_KOMI,
            playouts: DEFAULT_PLAYOUTS,
            time_budget: None,
            c_puct: DEFAULT_C_PUCT,
            seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_board_size(self.board_size)?;
        validate_komi(self.komi)?;
        if self.playouts == 0 {
            return Err(ConfigError::Playouts);
        }
        Ok(())
    }
}

pub fn validate_board_size(size: usize) -> Result<(), ConfigError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::BoardSize(size))
    }
}

pub fn validate_komi(komi: f32) -> Result<(), ConfigError> {
    if komi.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Komi(komi))
    }
}
