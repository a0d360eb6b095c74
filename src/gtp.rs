//! Go Text Protocol (GTP) engine.
//!
//! A line-oriented request/reply state machine implementing GTP version 2,
//! so the engine can be driven by controllers like GoGui, Sabaki, or a
//! tournament manager.
//!
//! Replies follow GTP framing: `=` (success) or `?` (failure), the optional
//! echoed command id, the payload, and a blank-line terminator. Unknown or
//! malformed commands are answered with `?` and leave the game state
//! untouched. `quit` raises a disconnect flag observed by the read loop;
//! `genmove` is the only command that runs for a non-trivial duration,
//! bounded by the configured search budget.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::config::{EngineConfig, validate_board_size, validate_komi};
use crate::position::{Color, Move, Position, format_vertex, parse_vertex};
use crate::strategy::Player;

/// The commands this engine understands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state: the current position plus the move generator.
/// `clear_board` and `boardsize` reconstruct the position; nothing here is
/// process-global.
pub struct GtpEngine {
    pos: Position,
    player: Player,
    disconnect: bool,
}

impl GtpEngine {
    pub fn new(player: Player, config: &EngineConfig) -> Self {
        GtpEngine {
            pos: Position::new(config.board_size, config.komi),
            player,
            disconnect: false,
        }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn disconnected(&self) -> bool {
        self.disconnect
    }

    /// Run the command loop on stdin/stdout until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        eprintln!("GTP engine ready, {} strategy", self.player.kind());
        for line in stdin.lock().lines() {
            let line = line?;
            if let Some(reply) = self.handle_line(&line) {
                write!(stdout, "{reply}")?;
                stdout.flush()?;
            }
            if self.disconnect {
                break;
            }
        }
        Ok(())
    }

    /// Process one input line into a framed reply.
    /// Returns `None` for blank lines and `#` comments.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (id, command_line) = Self::parse_id(line);
        let parts: Vec<&str> = command_line.split_whitespace().collect();
        let (success, message) = match parts.split_first() {
            Some((command, args)) => self.execute(&command.to_lowercase(), args),
            // An id with no command is malformed, not ignorable.
            None => (false, "missing command".to_string()),
        };
        let prefix = if success { '=' } else { '?' };
        let id_str = id.map(|i| i.to_string()).unwrap_or_default();
        Some(if message.is_empty() {
            format!("{prefix}{id_str}\n\n")
        } else {
            format!("{prefix}{id_str} {message}\n\n")
        })
    }

    /// Parse an optional numeric command id off the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let end = line
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        match line[..end].parse::<u32>() {
            Ok(id) => (Some(id), line[end..].trim_start()),
            Err(_) => (None, line),
        }
    }

    /// The protocol lets a controller play either color at any time, e.g.
    /// to set up a position. When the named color is not the player to
    /// move, derive a position with a pass recorded for the opponent.
    ///
    /// Nothing is committed here: callers assign the result back only once
    /// the whole command succeeds, so a rejected command leaves the game
    /// untouched.
    fn aligned_position(&self, color: Color) -> Position {
        if self.pos.to_move() != color {
            if let Ok(next) = self.pos.play(Move::Pass) {
                return next;
            }
        }
        self.pos.clone()
    }

    /// Execute a command and return (success, payload).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "tengen".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => {
                self.disconnect = true;
                (true, String::new())
            }

            "boardsize" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let Ok(size) = args[0].parse::<usize>() else {
                    return (false, "invalid size".to_string());
                };
                match validate_board_size(size) {
                    Ok(()) => {
                        self.pos = Position::new(size, self.pos.komi());
                        (true, String::new())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "clear_board" => {
                self.pos = Position::new(self.pos.size(), self.pos.komi());
                (true, String::new())
            }

            "komi" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let Ok(komi) = args[0].parse::<f32>() else {
                    return (false, "invalid komi".to_string());
                };
                match validate_komi(komi) {
                    Ok(()) => {
                        self.pos.set_komi(komi);
                        (true, String::new())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let color: Color = match args[0].parse() {
                    Ok(c) => c,
                    Err(err) => return (false, err),
                };
                let Some(mv) = parse_vertex(args[1], self.pos.size()) else {
                    return (false, format!("invalid vertex: {}", args[1]));
                };
                let aligned = self.aligned_position(color);
                match aligned.play(mv) {
                    Ok(next) => {
                        self.pos = next;
                        (true, String::new())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let color: Color = match args[0].parse() {
                    Ok(c) => c,
                    Err(err) => return (false, err),
                };
                let aligned = self.aligned_position(color);
                let mv = self.player.suggest_move(&aligned);
                match aligned.play(mv) {
                    Ok(next) => {
                        self.pos = next;
                        (true, format_vertex(mv, aligned.size()))
                    }
                    // Strategies only propose legal moves; if one slips
                    // through, pass rather than corrupt the game.
                    Err(_) => {
                        if let Ok(next) = aligned.play(Move::Pass) {
                            self.pos = next;
                        }
                        (true, "pass".to_string())
                    }
                }
            }

            "showboard" => (true, format!("\n{}", self.pos)),

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::UniformOracle;
    use crate::strategy::StrategyKind;

    fn engine() -> GtpEngine {
        let config = EngineConfig {
            playouts: 30,
            ..EngineConfig::default()
        };
        let player = Player::new(StrategyKind::Mcts, Box::new(UniformOracle), config.clone());
        GtpEngine::new(player, &config)
    }

    #[test]
    fn parse_id_with_and_without_id() {
        assert_eq!(GtpEngine::parse_id("123 name"), (Some(123), "name"));
        assert_eq!(GtpEngine::parse_id("name"), (None, "name"));
    }

    #[test]
    fn name_and_protocol_version() {
        let mut engine = engine();
        assert_eq!(engine.execute("name", &[]), (true, "tengen".to_string()));
        assert_eq!(
            engine.execute("protocol_version", &[]),
            (true, "2".to_string())
        );
    }

    #[test]
    fn known_command_answers_true_and_false() {
        let mut engine = engine();
        assert_eq!(
            engine.execute("known_command", &["play"]),
            (true, "true".to_string())
        );
        assert_eq!(
            engine.execute("known_command", &["undo"]),
            (true, "false".to_string())
        );
    }

    #[test]
    fn unknown_command_is_an_error_and_leaves_state() {
        let mut engine = engine();
        engine.execute("play", &["b", "D4"]);
        let before = engine.position().move_number();
        let (success, _) = engine.execute("frobnicate", &[]);
        assert!(!success);
        assert_eq!(engine.position().move_number(), before);
    }

    #[test]
    fn boardsize_reconstructs_and_rejects_bad_sizes() {
        let mut engine = engine();
        let (success, _) = engine.execute("boardsize", &["19"]);
        assert!(success);
        assert_eq!(engine.position().size(), 19);

        let (success, msg) = engine.execute("boardsize", &["99"]);
        assert!(!success);
        assert!(msg.contains("unacceptable size"));
        // The failed command must not have touched the board.
        assert_eq!(engine.position().size(), 19);
    }

    #[test]
    fn komi_is_applied_and_validated() {
        let mut engine = engine();
        let (success, _) = engine.execute("komi", &["6.5"]);
        assert!(success);
        assert_eq!(engine.position().komi(), 6.5);
        let (success, _) = engine.execute("komi", &["NaN"]);
        assert!(!success);
    }

    #[test]
    fn play_rejects_illegal_moves_with_an_error_reply() {
        let mut engine = engine();
        assert!(engine.execute("play", &["b", "D4"]).0);
        let (success, msg) = engine.execute("play", &["w", "D4"]);
        assert!(!success);
        assert!(msg.contains("not empty"));
    }

    #[test]
    fn rejected_play_does_not_record_the_alignment_pass() {
        let mut engine = engine();
        assert!(engine.execute("play", &["b", "D4"]).0);
        // Black again onto the occupied point: the command fails and the
        // implied white pass must not have been committed either.
        let (success, _) = engine.execute("play", &["b", "D4"]);
        assert!(!success);
        assert_eq!(engine.position().move_number(), 1);
        assert_eq!(engine.position().to_move(), Color::White);
    }

    #[test]
    fn rejected_play_after_a_pass_does_not_end_the_game() {
        let mut engine = engine();
        assert!(engine.execute("play", &["b", "D4"]).0);
        assert!(engine.execute("play", &["w", "pass"]).0);
        // A rejected white move must not count as a second consecutive
        // pass; the game goes on and genmove still searches.
        let (success, _) = engine.execute("play", &["w", "D4"]);
        assert!(!success);
        assert!(!engine.position().is_over());
        assert_eq!(engine.position().move_number(), 2);
    }

    #[test]
    fn play_accepts_either_color_via_interleaved_pass() {
        let mut engine = engine();
        assert!(engine.execute("play", &["b", "D4"]).0);
        // Black again: a white pass is recorded in between.
        assert!(engine.execute("play", &["b", "E5"]).0);
        assert_eq!(engine.position().move_number(), 3);
    }

    #[test]
    fn quit_sets_the_disconnect_flag() {
        let mut engine = engine();
        assert!(!engine.disconnected());
        assert!(engine.execute("quit", &[]).0);
        assert!(engine.disconnected());
    }

    #[test]
    fn handle_line_frames_replies() {
        let mut engine = engine();
        assert_eq!(engine.handle_line("7 name"), Some("=7 tengen\n\n".into()));
        assert_eq!(engine.handle_line(""), None);
        assert_eq!(engine.handle_line("# comment"), None);
        let reply = engine.handle_line("bogus").unwrap();
        assert!(reply.starts_with('?'));
        // An id with no command gets an error reply, not silence.
        assert_eq!(
            engine.handle_line("5"),
            Some("?5 missing command\n\n".into())
        );
    }

    #[test]
    fn genmove_scenario_produces_a_legal_visible_move() {
        let mut engine = engine();
        assert!(engine.execute("boardsize", &["9"]).0);
        assert!(engine.execute("clear_board", &[]).0);
        assert!(engine.execute("play", &["B", "D4"]).0);

        let before = engine.position().clone();
        let (success, reply) = engine.execute("genmove", &["W"]);
        assert!(success);
        let mv = parse_vertex(&reply, 9).expect("reply names a vertex or pass");
        assert!(before.is_legal(mv).is_ok());

        let (_, board) = engine.execute("showboard", &[]);
        assert!(board.contains(" X "), "black stone visible:\n{board}");
        if let Move::Play(pt) = mv {
            assert_eq!(engine.position().stone_at(pt), Some(Color::White));
            assert!(board.contains(" O "), "white stone visible:\n{board}");
        }
    }
}
