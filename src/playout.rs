//! Fast rollouts (random game simulation) for position evaluation.
//!
//! A rollout plays uniformly random legal moves until two consecutive passes
//! or a ply cap, then scores the terminal position. Filling one's own true
//! eyes is skipped so simulations actually finish instead of the players
//! dismantling their own territory.

use crate::position::{Color, Move, Point, Position, diagonals, neighbors};

/// Hard cap on rollout length, relative to board area. Guards against
/// pathological capture cycles the simple-ko rule does not break.
pub fn max_rollout_plies(size: usize) -> usize {
    size * size * 3
}

/// Whether `pt` is surrounded entirely by `color` stones (board edges count
/// as friendly). May report false eyes as eyes; see [`is_true_eye`].
pub fn is_eyeish(pos: &Position, pt: Point, color: Color) -> bool {
    neighbors(pos.size(), pt).all(|n| pos.stone_at(n) == Some(color))
}

/// A true eye: eyeish, with at most one opponent-held diagonal at the board
/// edge and none in the center.
pub fn is_true_eye(pos: &Position, pt: Point, color: Color) -> bool {
    if !is_eyeish(pos, pt, color) {
        return false;
    }
    let mut bad = 0;
    let mut present = 0;
    for d in diagonals(pos.size(), pt) {
        present += 1;
        if pos.stone_at(d) == Some(color.opponent()) {
            bad += 1;
        }
    }
    let at_edge = present < 4;
    bad <= if at_edge { 1 } else { 0 }
}

/// Pick a rollout move: uniformly random among legal board points that are
/// not the mover's own true eyes; pass when nothing else remains.
pub fn choose_rollout_move(pos: &Position, rng: &mut fastrand::Rng) -> Move {
    let mover = pos.to_move();
    let candidates: Vec<Move> = pos
        .legal_moves()
        .into_iter()
        .filter(|&mv| match mv {
            Move::Play(pt) => !is_true_eye(pos, pt, mover),
            Move::Pass => false,
        })
        .collect();
    if candidates.is_empty() {
        Move::Pass
    } else {
        candidates[rng.usize(..candidates.len())]
    }
}

/// Exact outcome of a finished (or force-stopped) position as seen by
/// `perspective`: +1 win, -1 loss, 0 for a drawn margin.
pub fn terminal_value(pos: &Position, perspective: Color) -> f64 {
    let margin = pos.score();
    if margin == 0.0 {
        0.0
    } else if (margin > 0.0) == (perspective == Color::Black) {
        1.0
    } else {
        -1.0
    }
}

/// Play a rollout to completion on a derived copy and score it.
///
/// Returns the outcome from the perspective of the player to move in
/// `start`. The starting position is never mutated.
pub fn rollout(start: &Position, rng: &mut fastrand::Rng) -> f64 {
    let mut pos = start.clone();
    let cap = start.move_number() as usize + max_rollout_plies(start.size());
    while !pos.is_over() && (pos.move_number() as usize) < cap {
        let mv = choose_rollout_move(&pos, rng);
        match pos.play(mv) {
            Ok(next) => pos = next,
            // Candidates come from legal_moves, so this is unreachable; a
            // pass keeps the simulation sound regardless.
            Err(_) => match pos.play(Move::Pass) {
                Ok(next) => pos = next,
                Err(_) => break,
            },
        }
    }
    terminal_value(&pos, start.to_move())
}
