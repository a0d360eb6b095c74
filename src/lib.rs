//! Tengen: a Go engine with oracle-guided Monte Carlo Tree Search.
//!
//! The engine keeps an exact board state, enumerates legal moves under
//! Go's capture/ko/suicide rules, and searches for moves with MCTS guided
//! by an injectable move-probability oracle. It speaks the Go Text
//! Protocol, so any GTP controller can drive it.
//!
//! ## Modules
//!
//! - [`position`] - Board state, rules, captures, ko, scoring
//! - [`oracle`] - The move-probability oracle interface and uniform fallback
//! - [`mcts`] - PUCT tree search over positions
//! - [`playout`] - Fast random rollouts for leaf evaluation
//! - [`strategy`] - Random / greedy / sampled / MCTS move generators
//! - [`config`] - Engine configuration and validation
//! - [`gtp`] - The GTP command loop
//!
//! ## Example
//!
//! ```
//! use tengen::config::EngineConfig;
//! use tengen::oracle::UniformOracle;
//! use tengen::position::{Position, parse_vertex};
//! use tengen::strategy::{Player, StrategyKind};
//!
//! let config = EngineConfig { playouts: 50, ..EngineConfig::default() };
//! let pos = Position::new(9, 7.5);
//! let pos = pos.play(parse_vertex("D4", 9).unwrap()).unwrap();
//!
//! let mut player = Player::new(StrategyKind::Mcts, Box::new(UniformOracle), config);
//! let reply = player.suggest_move(&pos);
//! assert!(pos.is_legal(reply).is_ok());
//! ```

pub mod config;
pub mod gtp;
pub mod mcts;
pub mod oracle;
pub mod playout;
pub mod position;
pub mod strategy;
