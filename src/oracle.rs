//! The move-probability oracle consumed by search and strategies.
//!
//! The oracle is an external collaborator (typically a trained network
//! reached over some transport). It is modeled as a synchronous capability
//! injected into the engine, so search code can be driven by a deterministic
//! stub in tests and degrade gracefully when the real thing is unreachable.

use thiserror::Error;

use crate::position::{Move, Position};

/// Oracle call failed or timed out. Never fatal: callers degrade to uniform
/// priors and keep going.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle call timed out")]
    Timeout,
}

/// The oracle's opinion of a position: a probability distribution over
/// candidate moves, plus an optional scalar value estimate in [-1, 1] from
/// the perspective of the player to move.
#[derive(Debug, Clone)]
pub struct PolicyEval {
    pub priors: Vec<(Move, f64)>,
    pub value: Option<f64>,
}

/// A move-probability oracle. Called once per node expansion, so thousands
/// of times per search; latency directly bounds achievable depth.
pub trait Oracle {
    fn evaluate(&self, pos: &Position) -> Result<PolicyEval, OracleError>;
}

/// Uniform distribution over legal moves. Doubles as the degraded mode when
/// the real oracle fails, turning the search into plain UCT.
pub struct UniformOracle;

impl Oracle for UniformOracle {
    fn evaluate(&self, pos: &Position) -> Result<PolicyEval, OracleError> {
        let legal = pos.legal_moves();
        let p = 1.0 / legal.len() as f64;
        Ok(PolicyEval {
            priors: legal.into_iter().map(|mv| (mv, p)).collect(),
            value: None,
        })
    }
}

/// Uniform priors over the given legal moves.
pub fn uniform_priors(legal: &[Move]) -> Vec<(Move, f64)> {
    let p = 1.0 / legal.len() as f64;
    legal.iter().map(|&mv| (mv, p)).collect()
}

/// Restrict an oracle distribution to the given legal moves and renormalize.
///
/// The oracle is trained independently of legality, so its mass may sit
/// partly (or entirely) on illegal moves. Legal moves absent from the
/// distribution get zero mass; if nothing legal carries mass, the result
/// falls back to uniform.
pub fn legal_priors(legal: &[Move], eval: &PolicyEval) -> Vec<(Move, f64)> {
    let mut priors: Vec<(Move, f64)> = legal
        .iter()
        .map(|&mv| {
            let p = eval
                .priors
                .iter()
                .find(|(m, _)| *m == mv)
                .map(|&(_, p)| p.max(0.0))
                .unwrap_or(0.0);
            (mv, p)
        })
        .collect();
    let total: f64 = priors.iter().map(|&(_, p)| p).sum();
    if total > 0.0 {
        for (_, p) in &mut priors {
            *p /= total;
        }
        priors
    } else {
        uniform_priors(legal)
    }
}
