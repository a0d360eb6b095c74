//! Go position representation and move execution.
//!
//! This module provides the core game logic for Go:
//! - Board state as a flat grid of cells, each holding the id of its group
//! - An arena of group records (stones + liberties) updated incrementally
//! - Stone placement, capture resolution, and suicide detection
//! - Simple-ko enforcement
//! - Area scoring with komi
//!
//! A [`Position`] is an immutable snapshot: [`Position::play`] derives a new
//! position and leaves the parent untouched, so tree search can hold many
//! positions at once without copying history around.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A point on the board, as an index into the flat `size * size` grid.
/// Row 0 is the bottom of the board (GTP row 1), columns run left to right.
pub type Point = usize;

/// Sentinel cell value for an empty point.
const NO_GROUP: u16 = u16::MAX;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-player arrays (captures).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            other => Err(format!("invalid color: {other}")),
        }
    }
}

/// A move: either placing a stone or passing.
///
/// The derived ordering (board points ascending, `Pass` last) is the
/// canonical move order used for deterministic tie-breaking in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Move {
    Play(Point),
    Pass,
}

/// Why a move is illegal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("illegal move: point not empty")]
    Occupied,
    #[error("illegal move: retakes ko")]
    Ko,
    #[error("illegal move: suicide")]
    Suicide,
    #[error("illegal move: off board")]
    OutOfBounds,
}

/// A maximal set of connected same-colored stones, with its liberties.
///
/// Liberties live in a `BTreeSet` so iteration order (and everything derived
/// from it) is deterministic.
#[derive(Debug, Clone)]
struct Group {
    color: Color,
    stones: Vec<Point>,
    liberties: BTreeSet<Point>,
}

/// A Go position: board contents, group bookkeeping, ko state, captures,
/// and the two most recent moves (needed for ko and double-pass detection).
#[derive(Debug, Clone)]
pub struct Position {
    size: usize,
    /// Owning group id per point, or `NO_GROUP` for empty.
    cells: Vec<u16>,
    /// Arena of group records; freed slots are recycled via `free`.
    groups: Vec<Group>,
    free: Vec<u16>,
    to_move: Color,
    /// Point forbidden by the simple-ko rule, if any.
    ko: Option<Point>,
    /// Stones captured so far, indexed by the capturing player.
    captures: [u32; 2],
    last_move: Option<Move>,
    previous_move: Option<Move>,
    move_number: u32,
    komi: f32,
}

/// Orthogonal neighbors of a point on a `size`-sided board.
pub fn neighbors(size: usize, pt: Point) -> impl Iterator<Item = Point> + use<> {
    let (row, col) = (pt / size, pt % size);
    let mut v = Vec::with_capacity(4);
    if row > 0 {
        v.push(pt - size);
    }
    if col > 0 {
        v.push(pt - 1);
    }
    if col + 1 < size {
        v.push(pt + 1);
    }
    if row + 1 < size {
        v.push(pt + size);
    }
    v.into_iter()
}

/// Diagonal neighbors of a point on a `size`-sided board.
pub fn diagonals(size: usize, pt: Point) -> impl Iterator<Item = Point> + use<> {
    let (row, col) = (pt / size, pt % size);
    let mut v = Vec::with_capacity(4);
    if row > 0 && col > 0 {
        v.push(pt - size - 1);
    }
    if row > 0 && col + 1 < size {
        v.push(pt - size + 1);
    }
    if row + 1 < size && col > 0 {
        v.push(pt + size - 1);
    }
    if row + 1 < size && col + 1 < size {
        v.push(pt + size + 1);
    }
    v.into_iter()
}

impl Position {
    /// Create an empty position. Black moves first.
    pub fn new(size: usize, komi: f32) -> Self {
        Position {
            size,
            cells: vec![NO_GROUP; size * size],
            groups: Vec::new(),
            free: Vec::new(),
            to_move: Color::Black,
            ko: None,
            captures: [0, 0],
            last_move: None,
            previous_move: None,
            move_number: 0,
            komi,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    #[inline]
    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.komi = komi;
    }

    #[inline]
    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    #[inline]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Stones captured so far by the given player.
    #[inline]
    pub fn captures(&self, player: Color) -> u32 {
        self.captures[player.index()]
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    #[inline]
    pub fn previous_move(&self) -> Option<Move> {
        self.previous_move
    }

    /// The stone occupying a point, if any.
    pub fn stone_at(&self, pt: Point) -> Option<Color> {
        match self.cells[pt] {
            NO_GROUP => None,
            id => Some(self.groups[id as usize].color),
        }
    }

    /// The game ends after two consecutive passes.
    pub fn is_over(&self) -> bool {
        self.last_move == Some(Move::Pass) && self.previous_move == Some(Move::Pass)
    }

    /// Check a move without deriving a position.
    ///
    /// Suicide is evaluated after capture resolution: a placement with no
    /// empty neighbor is still legal if a friendly neighbor group keeps a
    /// spare liberty or an enemy neighbor group is left with none.
    pub fn is_legal(&self, mv: Move) -> Result<(), MoveError> {
        let pt = match mv {
            Move::Pass => return Ok(()),
            Move::Play(pt) => pt,
        };
        if pt >= self.cells.len() {
            return Err(MoveError::OutOfBounds);
        }
        if self.cells[pt] != NO_GROUP {
            return Err(MoveError::Occupied);
        }
        if self.ko == Some(pt) {
            return Err(MoveError::Ko);
        }
        for n in neighbors(self.size, pt) {
            match self.cells[n] {
                NO_GROUP => return Ok(()),
                id => {
                    let g = &self.groups[id as usize];
                    if g.color == self.to_move {
                        // The placement consumes one liberty of the merged
                        // group; any second liberty keeps it alive.
                        if g.liberties.len() > 1 {
                            return Ok(());
                        }
                    } else if g.liberties.len() == 1 {
                        // Capturing the neighbor vacates at least this point.
                        return Ok(());
                    }
                }
            }
        }
        Err(MoveError::Suicide)
    }

    /// All legal moves, in canonical order: board points ascending, then pass.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = (0..self.cells.len())
            .map(Move::Play)
            .filter(|&mv| self.is_legal(mv).is_ok())
            .collect();
        moves.push(Move::Pass);
        moves
    }

    /// Derive the position after a move. The receiver is left untouched.
    pub fn play(&self, mv: Move) -> Result<Position, MoveError> {
        self.is_legal(mv)?;
        let mut next = self.clone();
        match mv {
            Move::Pass => next.ko = None,
            Move::Play(pt) => next.apply_play(pt),
        }
        next.to_move = self.to_move.opponent();
        next.move_number += 1;
        next.previous_move = self.last_move;
        next.last_move = Some(mv);
        debug_assert!(next.invariants_hold());
        Ok(next)
    }

    /// Place a stone for the player to move, resolving merges and captures.
    /// Callers must have checked legality.
    fn apply_play(&mut self, pt: Point) {
        let mover = self.to_move;

        let mut friendly: Vec<u16> = Vec::new();
        let mut enemy: Vec<u16> = Vec::new();
        let mut libs: BTreeSet<Point> = BTreeSet::new();
        for n in neighbors(self.size, pt) {
            match self.cells[n] {
                NO_GROUP => {
                    libs.insert(n);
                }
                id if self.groups[id as usize].color == mover => {
                    if !friendly.contains(&id) {
                        friendly.push(id);
                    }
                }
                id => {
                    if !enemy.contains(&id) {
                        enemy.push(id);
                    }
                }
            }
        }

        // Place the stone as its own group, then fold friendly neighbors in.
        let id = self.alloc_group(mover, pt, libs);
        self.cells[pt] = id;
        for gid in friendly {
            let stones = std::mem::take(&mut self.groups[gid as usize].stones);
            let merged_libs = std::mem::take(&mut self.groups[gid as usize].liberties);
            for &s in &stones {
                self.cells[s] = id;
            }
            self.groups[id as usize].stones.extend(stones);
            self.groups[id as usize].liberties.extend(merged_libs);
            self.free.push(gid);
        }
        self.groups[id as usize].liberties.remove(&pt);

        // Resolve captures of enemy groups left without liberties.
        let mut captured = 0u32;
        let mut captured_pt = None;
        for gid in enemy {
            self.groups[gid as usize].liberties.remove(&pt);
            if !self.groups[gid as usize].liberties.is_empty() {
                continue;
            }
            let stones = std::mem::take(&mut self.groups[gid as usize].stones);
            captured += stones.len() as u32;
            captured_pt = stones.first().copied();
            for &s in &stones {
                self.cells[s] = NO_GROUP;
            }
            // Vacated points become liberties of adjacent mover groups.
            for &s in &stones {
                for n in neighbors(self.size, s) {
                    let nid = self.cells[n];
                    if nid != NO_GROUP && self.groups[nid as usize].color == mover {
                        self.groups[nid as usize].liberties.insert(s);
                    }
                }
            }
            self.free.push(gid);
        }
        self.captures[mover.index()] += captured;

        // Simple ko: a lone capturing stone that took exactly one stone and
        // is itself left with a single liberty forbids the recapture.
        let own = &self.groups[id as usize];
        self.ko = if captured == 1 && own.stones.len() == 1 && own.liberties.len() == 1 {
            captured_pt
        } else {
            None
        };
    }

    fn alloc_group(&mut self, color: Color, pt: Point, liberties: BTreeSet<Point>) -> u16 {
        let group = Group {
            color,
            stones: vec![pt],
            liberties,
        };
        match self.free.pop() {
            Some(id) => {
                self.groups[id as usize] = group;
                id
            }
            None => {
                self.groups.push(group);
                (self.groups.len() - 1) as u16
            }
        }
    }

    /// Number of liberties of the group occupying a point (0 if empty).
    pub fn group_liberties(&self, pt: Point) -> usize {
        match self.cells[pt] {
            NO_GROUP => 0,
            id => self.groups[id as usize].liberties.len(),
        }
    }

    /// Number of stones in the group occupying a point (0 if empty).
    pub fn group_size(&self, pt: Point) -> usize {
        match self.cells[pt] {
            NO_GROUP => 0,
            id => self.groups[id as usize].stones.len(),
        }
    }

    /// Area score from Black's perspective: (Black stones + territory)
    /// minus (White stones + territory) minus komi.
    ///
    /// An empty region counts as territory only when it borders exactly one
    /// color; regions with mixed borders are neutral.
    pub fn score(&self) -> f32 {
        let mut black = 0i32;
        let mut white = 0i32;
        for &cell in &self.cells {
            if cell != NO_GROUP {
                match self.groups[cell as usize].color {
                    Color::Black => black += 1,
                    Color::White => white += 1,
                }
            }
        }

        let mut seen = vec![false; self.cells.len()];
        for pt in 0..self.cells.len() {
            if self.cells[pt] != NO_GROUP || seen[pt] {
                continue;
            }
            let mut region = 0i32;
            let mut touches_black = false;
            let mut touches_white = false;
            let mut stack = vec![pt];
            seen[pt] = true;
            while let Some(p) = stack.pop() {
                region += 1;
                for n in neighbors(self.size, p) {
                    match self.cells[n] {
                        NO_GROUP => {
                            if !seen[n] {
                                seen[n] = true;
                                stack.push(n);
                            }
                        }
                        id => match self.groups[id as usize].color {
                            Color::Black => touches_black = true,
                            Color::White => touches_white = true,
                        },
                    }
                }
            }
            match (touches_black, touches_white) {
                (true, false) => black += region,
                (false, true) => white += region,
                _ => {}
            }
        }

        black as f32 - white as f32 - self.komi
    }

    /// Structural invariants: cells and group records agree, and no group
    /// survives with zero liberties. A violation is a programming error.
    pub fn invariants_hold(&self) -> bool {
        for (pt, &cell) in self.cells.iter().enumerate() {
            if cell == NO_GROUP {
                continue;
            }
            let g = &self.groups[cell as usize];
            if !g.stones.contains(&pt) || g.liberties.is_empty() {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.size).rev() {
            write!(f, "{:>2} ", row + 1)?;
            for col in 0..self.size {
                let ch = match self.stone_at(row * self.size + col) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..self.size {
            let mut c = b'A' + col as u8;
            if c >= b'I' {
                c += 1;
            }
            write!(f, "{} ", c as char)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "to move: {}  captures X: {}  O: {}",
            self.to_move,
            self.captures[Color::Black.index()],
            self.captures[Color::White.index()],
        )
    }
}

/// Parse a GTP vertex (e.g. "D4", "pass") for a board of the given size.
///
/// Column letters skip 'I' by Go convention. Returns `None` for anything
/// that is not a vertex on this board.
pub fn parse_vertex(s: &str, size: usize) -> Option<Move> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(Move::Pass);
    }
    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let col_char = bytes[0].to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == b'I' {
        return None;
    }
    let mut col = (col_char - b'A') as usize;
    if col_char > b'I' {
        col -= 1;
    }
    let row: usize = s[1..].parse().ok()?;
    if row == 0 || row > size || col >= size {
        return None;
    }
    Some(Move::Play((row - 1) * size + col))
}

/// Format a move as a GTP vertex (e.g. "D4", "pass").
pub fn format_vertex(mv: Move, size: usize) -> String {
    match mv {
        Move::Pass => "pass".into(),
        Move::Play(pt) => {
            let (row, col) = (pt / size, pt % size);
            let mut c = b'A' + col as u8;
            if c >= b'I' {
                c += 1;
            }
            format!("{}{}", c as char, row + 1)
        }
    }
}
