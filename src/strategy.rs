//! Move-selection strategies.
//!
//! The strategy set is closed and known up front, so it is a tagged enum
//! chosen at construction rather than an open trait hierarchy. The three
//! non-search strategies are stateless wrappers around the oracle; MCTS is
//! the one that builds a search tree.

use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::mcts::{TreeNode, tree_search};
use crate::oracle::Oracle;
use crate::position::{Move, Position};

/// Which strategy drives move generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Uniformly random among legal board moves.
    Random,
    /// The oracle's highest-probability legal move.
    Greedy,
    /// One move sampled from the oracle distribution over legal moves.
    Sampled,
    /// Full Monte Carlo tree search with oracle priors.
    Mcts,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Random => "random",
            StrategyKind::Greedy => "greedy",
            StrategyKind::Sampled => "sampled",
            StrategyKind::Mcts => "mcts",
        })
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(StrategyKind::Random),
            "greedy" => Ok(StrategyKind::Greedy),
            "sampled" => Ok(StrategyKind::Sampled),
            "mcts" => Ok(StrategyKind::Mcts),
            other => Err(format!(
                "unknown strategy: {other} (expected random, greedy, sampled, or mcts)"
            )),
        }
    }
}

/// A move generator: a strategy, its oracle, and its randomness.
pub struct Player {
    kind: StrategyKind,
    oracle: Box<dyn Oracle>,
    config: EngineConfig,
    rng: fastrand::Rng,
}

impl Player {
    pub fn new(kind: StrategyKind, oracle: Box<dyn Oracle>, config: EngineConfig) -> Self {
        let rng = fastrand::Rng::with_seed(config.seed);
        Player {
            kind,
            oracle,
            config,
            rng,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Suggest a legal move for the player to move in `pos`.
    /// Always succeeds: every strategy bottoms out at pass.
    pub fn suggest_move(&mut self, pos: &Position) -> Move {
        match self.kind {
            StrategyKind::Random => random_move(pos, &mut self.rng),
            StrategyKind::Greedy => greedy_move(pos, self.oracle.as_ref()),
            StrategyKind::Sampled => sampled_move(pos, self.oracle.as_ref(), &mut self.rng),
            StrategyKind::Mcts => {
                let mut root = TreeNode::new(pos.clone(), 1.0);
                tree_search(&mut root, self.oracle.as_ref(), &self.config, &mut self.rng)
            }
        }
    }
}

/// Uniformly random legal board move; pass only when none exists.
fn random_move(pos: &Position, rng: &mut fastrand::Rng) -> Move {
    let moves: Vec<Move> = pos
        .legal_moves()
        .into_iter()
        .filter(|&mv| mv != Move::Pass)
        .collect();
    if moves.is_empty() {
        Move::Pass
    } else {
        moves[rng.usize(..moves.len())]
    }
}

/// Oracle distribution restricted to legal moves, or `None` when the oracle
/// is unavailable.
fn legal_distribution(pos: &Position, oracle: &dyn Oracle) -> Option<Vec<(Move, f64)>> {
    let eval = match oracle.evaluate(pos) {
        Ok(eval) => eval,
        Err(err) => {
            eprintln!("oracle failed: {err}");
            return None;
        }
    };
    Some(crate::oracle::legal_priors(&pos.legal_moves(), &eval))
}

/// The legal move with the most oracle mass; earlier moves win ties.
///
/// The oracle is trained independently of legality, so its favorite move may
/// be illegal here; restricting to legal moves is the fallback the caller
/// relies on. An unavailable oracle degrades to pass.
fn greedy_move(pos: &Position, oracle: &dyn Oracle) -> Move {
    let Some(priors) = legal_distribution(pos, oracle) else {
        return Move::Pass;
    };
    let mut best = Move::Pass;
    let mut best_p = f64::NEG_INFINITY;
    for (mv, p) in priors {
        if p > best_p {
            best_p = p;
            best = mv;
        }
    }
    best
}

/// Sample one move from the oracle distribution over legal moves.
fn sampled_move(pos: &Position, oracle: &dyn Oracle, rng: &mut fastrand::Rng) -> Move {
    let Some(priors) = legal_distribution(pos, oracle) else {
        return Move::Pass;
    };
    let mut threshold = rng.f64();
    for (mv, p) in &priors {
        if *p > 0.0 && threshold < *p {
            return *mv;
        }
        threshold -= p;
    }
    // Floating-point slack: fall back to the last carrier of mass.
    priors
        .iter()
        .rev()
        .find(|&&(_, p)| p > 0.0)
        .map(|&(mv, _)| mv)
        .unwrap_or(Move::Pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{OracleError, PolicyEval, UniformOracle};
    use crate::position::parse_vertex;

    /// Oracle with a fixed move list, regardless of position.
    struct TableOracle(Vec<(Move, f64)>);

    impl Oracle for TableOracle {
        fn evaluate(&self, _pos: &Position) -> Result<PolicyEval, OracleError> {
            Ok(PolicyEval {
                priors: self.0.clone(),
                value: None,
            })
        }
    }

    struct DownOracle;

    impl Oracle for DownOracle {
        fn evaluate(&self, _pos: &Position) -> Result<PolicyEval, OracleError> {
            Err(OracleError::Timeout)
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            board_size: 5,
            playouts: 20,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn random_player_moves_are_legal() {
        let pos = Position::new(5, 7.5);
        let mut player = Player::new(StrategyKind::Random, Box::new(UniformOracle), small_config());
        for _ in 0..20 {
            let mv = player.suggest_move(&pos);
            assert!(pos.is_legal(mv).is_ok());
            assert_ne!(mv, Move::Pass);
        }
    }

    #[test]
    fn greedy_follows_the_oracle() {
        let pos = Position::new(5, 7.5);
        let d3 = parse_vertex("D3", 5).unwrap();
        let oracle = TableOracle(vec![(d3, 0.9), (Move::Play(0), 0.1)]);
        let mut player = Player::new(StrategyKind::Greedy, Box::new(oracle), small_config());
        assert_eq!(player.suggest_move(&pos), d3);
    }

    #[test]
    fn greedy_skips_illegal_favorites() {
        // All oracle mass on the occupied point: the remaining legal mass
        // decides, here the second choice.
        let pos = Position::new(5, 7.5);
        let c3 = parse_vertex("C3", 5).unwrap();
        let pos = pos.play(c3).unwrap();
        let d3 = parse_vertex("D3", 5).unwrap();
        let oracle = TableOracle(vec![(c3, 0.95), (d3, 0.05)]);
        let mut player = Player::new(StrategyKind::Greedy, Box::new(oracle), small_config());
        assert_eq!(player.suggest_move(&pos), d3);
    }

    #[test]
    fn greedy_with_all_mass_illegal_still_answers_legally() {
        let pos = Position::new(5, 7.5);
        let c3 = parse_vertex("C3", 5).unwrap();
        let pos = pos.play(c3).unwrap();
        // Only the now-occupied point carries mass; the distribution
        // degrades to uniform over legal moves.
        let oracle = TableOracle(vec![(c3, 1.0)]);
        let mut player = Player::new(StrategyKind::Greedy, Box::new(oracle), small_config());
        let mv = player.suggest_move(&pos);
        assert!(pos.is_legal(mv).is_ok());
        assert_ne!(mv, c3);
    }

    #[test]
    fn sampled_moves_are_legal_and_weighted() {
        let pos = Position::new(5, 7.5);
        let d3 = parse_vertex("D3", 5).unwrap();
        let oracle = TableOracle(vec![(d3, 1.0)]);
        let mut player = Player::new(StrategyKind::Sampled, Box::new(oracle), small_config());
        // All mass on one legal move: sampling must always pick it.
        for _ in 0..10 {
            assert_eq!(player.suggest_move(&pos), d3);
        }
    }

    #[test]
    fn oracle_outage_degrades_to_pass_for_thin_strategies() {
        let pos = Position::new(5, 7.5);
        let mut greedy = Player::new(StrategyKind::Greedy, Box::new(DownOracle), small_config());
        assert_eq!(greedy.suggest_move(&pos), Move::Pass);
        let mut sampled = Player::new(StrategyKind::Sampled, Box::new(DownOracle), small_config());
        assert_eq!(sampled.suggest_move(&pos), Move::Pass);
    }

    #[test]
    fn mcts_player_answers_a_legal_move() {
        let pos = Position::new(5, 7.5);
        let mut player = Player::new(StrategyKind::Mcts, Box::new(UniformOracle), small_config());
        assert_eq!(player.kind(), StrategyKind::Mcts);
        let mv = player.suggest_move(&pos);
        assert!(pos.is_legal(mv).is_ok());
    }

    #[test]
    fn strategy_kind_names_round_trip() {
        assert_eq!("mcts".parse(), Ok(StrategyKind::Mcts));
        assert_eq!("RANDOM".parse(), Ok(StrategyKind::Random));
        assert!("alphabeta".parse::<StrategyKind>().is_err());
        for kind in [
            StrategyKind::Random,
            StrategyKind::Greedy,
            StrategyKind::Sampled,
            StrategyKind::Mcts,
        ] {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }
}
