//! Monte Carlo Tree Search guided by a move-probability oracle.
//!
//! One iteration:
//! 1. Selection: descend from the root by PUCT score until an unexpanded
//!    node or a terminal position.
//! 2. Expansion: populate children with oracle priors over legal moves
//!    (uniform priors if the oracle fails).
//! 3. Evaluation: exact score at terminal positions, otherwise a random
//!    rollout on a derived copy.
//! 4. Backup: propagate the result to the root, sign-flipped at each ply.
//!
//! The search stops when the iteration budget or the wall-clock deadline
//! runs out, whichever comes first, and answers the most-visited root child.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::oracle::{Oracle, legal_priors, uniform_priors};
use crate::playout::{rollout, terminal_value};
use crate::position::{Move, Position, format_vertex};

/// A node in the search tree.
///
/// `value_sum` accumulates outcomes from the perspective of the player who
/// moved into this node, so a parent reads a child's mean value directly as
/// "how good is entering that child for me".
pub struct TreeNode {
    pub position: Position,
    pub visits: u32,
    pub value_sum: f64,
    /// Oracle probability of the move that led here from the parent.
    pub prior: f64,
    /// One entry per legal move, in canonical move order; empty until the
    /// node is expanded.
    pub children: Vec<(Move, TreeNode)>,
    pub expanded: bool,
}

impl TreeNode {
    pub fn new(position: Position, prior: f64) -> Self {
        TreeNode {
            position,
            visits: 0,
            value_sum: 0.0,
            prior,
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Mean observed value; 0 for unvisited nodes.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits > 0 {
            self.value_sum / self.visits as f64
        } else {
            0.0
        }
    }
}

/// PUCT score of a child: exploitation plus prior-weighted exploration.
fn puct_score(child: &TreeNode, sqrt_parent_visits: f64, c_puct: f64) -> f64 {
    child.mean_value() + c_puct * child.prior * sqrt_parent_visits / (1.0 + child.visits as f64)
}

/// Index of the child with the highest PUCT score. Strictly-greater
/// comparison, so on ties the earliest move in canonical order wins.
fn select_child(node: &TreeNode, c_puct: f64) -> usize {
    let sqrt_parent = (node.visits as f64).sqrt();
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, (_, child)) in node.children.iter().enumerate() {
        let score = puct_score(child, sqrt_parent, c_puct);
        if score > best_score {
            best_score = score;
            best = i;
        }
    }
    best
}

/// Descend from the root to an unexpanded or terminal node, returning the
/// path of child indices taken.
fn descend(root: &TreeNode, c_puct: f64) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = root;
    while node.expanded && !node.children.is_empty() && !node.position.is_over() {
        let idx = select_child(node, c_puct);
        path.push(idx);
        node = &node.children[idx].1;
    }
    path
}

fn node_at_mut<'a>(root: &'a mut TreeNode, path: &[usize]) -> &'a mut TreeNode {
    path.iter().fold(root, |node, &idx| &mut node.children[idx].1)
}

/// Populate a node's children with oracle priors over its legal moves.
///
/// Returns the oracle's scalar value estimate for the position when it gave
/// one, sparing the caller a rollout. Oracle failure degrades to uniform
/// priors (plain UCT) instead of aborting the search.
pub fn expand(node: &mut TreeNode, oracle: &dyn Oracle) -> Option<f64> {
    if node.expanded || node.position.is_over() {
        return None;
    }
    let legal = node.position.legal_moves();
    let (priors, value) = match oracle.evaluate(&node.position) {
        Ok(eval) => (legal_priors(&legal, &eval), eval.value),
        Err(err) => {
            eprintln!("oracle failed, degrading to uniform priors: {err}");
            (uniform_priors(&legal), None)
        }
    };
    for (mv, prior) in priors {
        if let Ok(child_pos) = node.position.play(mv) {
            node.children.push((mv, TreeNode::new(child_pos, prior)));
        }
    }
    node.expanded = true;
    value
}

/// Propagate an evaluation up the selection path.
///
/// `leaf_value` is from the perspective of the player to move at the node
/// the path ends on; the sign alternates at every ply above it.
fn backup(root: &mut TreeNode, path: &[usize], leaf_value: f64) {
    let mut sign = if path.len() % 2 == 0 { -1.0 } else { 1.0 };
    let mut node = &mut *root;
    node.visits += 1;
    node.value_sum += sign * leaf_value;
    for &idx in path {
        sign = -sign;
        node = &mut node.children[idx].1;
        node.visits += 1;
        node.value_sum += sign * leaf_value;
    }
}

/// Run MCTS from the root within the configured budget and return the move
/// to play: most visits, ties broken by higher mean value, then move order.
pub fn tree_search(
    root: &mut TreeNode,
    oracle: &dyn Oracle,
    config: &EngineConfig,
    rng: &mut fastrand::Rng,
) -> Move {
    let deadline = config.time_budget.map(|budget| Instant::now() + budget);
    for _ in 0..config.playouts {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }
        let path = descend(root, config.c_puct);
        let node = node_at_mut(root, &path);
        let value = if node.position.is_over() {
            terminal_value(&node.position, node.position.to_move())
        } else {
            match expand(node, oracle) {
                Some(estimate) => estimate.clamp(-1.0, 1.0),
                None => rollout(&node.position, rng),
            }
        };
        backup(root, &path, value);
    }
    best_move(root)
}

/// The root child to play: most visits, then higher mean value; earlier
/// moves win remaining ties.
pub fn best_move(root: &TreeNode) -> Move {
    let mut best: Option<(&TreeNode, Move)> = None;
    for (mv, child) in &root.children {
        let better = match best {
            None => true,
            Some((b, _)) => {
                child.visits > b.visits
                    || (child.visits == b.visits && child.mean_value() > b.mean_value())
            }
        };
        if better {
            best = Some((child, *mv));
        }
    }
    best.map(|(_, mv)| mv).unwrap_or(Move::Pass)
}

/// Print per-child search statistics to stderr.
pub fn dump_root_stats(root: &TreeNode) {
    let size = root.position.size();
    for (mv, child) in &root.children {
        if child.visits == 0 {
            continue;
        }
        eprintln!(
            "move {:>4}  visits {:>5}  prior {:.3}  value {:+.3}",
            format_vertex(*mv, size),
            child.visits,
            child.prior,
            child.mean_value(),
        );
    }
}
