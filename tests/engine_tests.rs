//! End-to-end tests of the rules and the players through the public API.

use tengen::config::EngineConfig;
use tengen::oracle::UniformOracle;
use tengen::position::{Color, Move, MoveError, Position, parse_vertex};
use tengen::strategy::{Player, StrategyKind};

fn vertex(s: &str, size: usize) -> Move {
    parse_vertex(s, size).expect("valid vertex")
}

/// Apply alternating moves from an empty board.
fn setup(size: usize, moves: &[&str]) -> Position {
    let mut pos = Position::new(size, 7.5);
    for mv in moves {
        pos = pos.play(vertex(mv, size)).expect("legal move");
    }
    pos
}

#[test]
fn replayed_game_accumulates_captures_exactly() {
    // Black surrounds and captures a two-stone white group; capture counts
    // reflect the exact group size and nothing else.
    let pos = setup(
        9,
        &[
            "D3", "D4", "E3", "E4", "D5", "H8", "E5", "G8", "C4", "F8", "F4",
        ],
    );
    assert_eq!(pos.captures(Color::Black), 2);
    assert_eq!(pos.captures(Color::White), 0);
    let Move::Play(d4) = vertex("D4", 9) else {
        panic!()
    };
    assert!(pos.stone_at(d4).is_none());
    assert!(pos.invariants_hold());
}

#[test]
fn ko_point_is_not_reoffered_immediately() {
    let pos = setup(9, &["D3", "E3", "E4", "F4", "D5", "E5", "C4", "D4"]);
    let Move::Play(e4) = vertex("E4", 9) else {
        panic!()
    };
    // White just recaptured at D4; E4 is the ko point.
    assert_eq!(pos.ko(), Some(e4));
    assert!(!pos.legal_moves().contains(&Move::Play(e4)));
    assert_eq!(pos.play(Move::Play(e4)).unwrap_err(), MoveError::Ko);
    // One ply later the point is available again.
    let pos = pos.play(vertex("H8", 9)).unwrap();
    let pos = pos.play(vertex("G8", 9)).unwrap();
    assert!(pos.legal_moves().contains(&Move::Play(e4)));
}

#[test]
fn double_pass_scores_a_lone_stone_game() {
    let pos = setup(9, &["C3"]);
    let pos = pos.play(Move::Pass).unwrap();
    let pos = pos.play(Move::Pass).unwrap();
    assert!(pos.is_over());
    // One black stone plus 80 points of territory, minus komi.
    assert_eq!(pos.score(), 81.0 - 7.5);
}

#[test]
fn every_strategy_produces_legal_moves_through_a_game() {
    let config = EngineConfig {
        board_size: 5,
        playouts: 15,
        ..EngineConfig::default()
    };
    for kind in [
        StrategyKind::Random,
        StrategyKind::Greedy,
        StrategyKind::Sampled,
        StrategyKind::Mcts,
    ] {
        let mut player = Player::new(kind, Box::new(UniformOracle), config.clone());
        let mut pos = Position::new(5, 7.5);
        for _ in 0..12 {
            if pos.is_over() {
                break;
            }
            let mv = player.suggest_move(&pos);
            assert!(
                pos.is_legal(mv).is_ok(),
                "{kind:?} suggested illegal {mv:?} at move {}",
                pos.move_number()
            );
            pos = pos.play(mv).unwrap();
            assert!(pos.invariants_hold());
        }
    }
}

#[test]
fn mcts_self_play_finishes_a_small_game() {
    let config = EngineConfig {
        board_size: 5,
        playouts: 25,
        seed: 3,
        ..EngineConfig::default()
    };
    let mut player = Player::new(StrategyKind::Mcts, Box::new(UniformOracle), config);
    let mut pos = Position::new(5, 7.5);
    let mut plies = 0;
    while !pos.is_over() && plies < 100 {
        let mv = player.suggest_move(&pos);
        pos = pos.play(mv).expect("search produced a legal move");
        plies += 1;
    }
    // Whatever the result, the final position must still be consistent
    // and scorable.
    assert!(pos.invariants_hold());
    let _ = pos.score();
}

#[test]
fn positions_are_reusable_parents() {
    // Deriving several children from one parent must not interfere,
    // which is what the search tree relies on.
    let parent = setup(9, &["D4", "F6"]);
    let a = parent.play(vertex("C3", 9)).unwrap();
    let b = parent.play(vertex("G7", 9)).unwrap();
    let c = parent.play(Move::Pass).unwrap();
    assert_eq!(parent.move_number(), 2);
    assert_eq!(a.move_number(), 3);
    assert_eq!(b.move_number(), 3);
    assert_eq!(c.move_number(), 3);
    let Move::Play(c3) = vertex("C3", 9) else {
        panic!()
    };
    assert_eq!(a.stone_at(c3), Some(Color::Black));
    assert!(b.stone_at(c3).is_none());
}
