#![allow(dead_code)]

use std::fmt::{self, Display};

pub const BOARD_N_SQUARES: usize = 64;

/// Default number of plies the engine looks ahead.
pub const SEARCH_DEPTH: usize = 5;

/// Board squares are numbered with bit 0 in white's king-side corner:
/// index 0 is h1, index 7 is a1, index 63 is a8. File index 0 is the
/// h-file, rank index 0 is white's back rank.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash, Debug)]
pub struct Square(u8);

#[rustfmt::skip]
static SQUARE_NAMES: [&str; 64] = [
    "h1", "g1", "f1", "e1", "d1", "c1", "b1", "a1",
    "h2", "g2", "f2", "e2", "d2", "c2", "b2", "a2",
    "h3", "g3", "f3", "e3", "d3", "c3", "b3", "a3",
    "h4", "g4", "f4", "e4", "d4", "c4", "b4", "a4",
    "h5", "g5", "f5", "e5", "d5", "c5", "b5", "a5",
    "h6", "g6", "f6", "e6", "d6", "c6", "b6", "a6",
    "h7", "g7", "f7", "e7", "d7", "c7", "b7", "a7",
    "h8", "g8", "f8", "e8", "d8", "c8", "b8", "a8",
];

impl Square {
    pub const H1: Self = Self(0);
    pub const G1: Self = Self(1);
    pub const F1: Self = Self(2);
    pub const E1: Self = Self(3);
    pub const D1: Self = Self(4);
    pub const C1: Self = Self(5);
    pub const B1: Self = Self(6);
    pub const A1: Self = Self(7);
    pub const E4: Self = Self(27);
    pub const E8: Self = Self(59);

    pub const fn new(inner: u8) -> Self {
        debug_assert!(inner < 64);
        Self(inner)
    }

    pub const fn from_rank_file(rank: u8, file: u8) -> Self {
        debug_assert!(rank < 8 && file < 8);
        Self(rank * 8 + file)
    }

    /// Parses a name like "e4". Files run a..h, ranks 1..8.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let file_char = chars.next()?;
        let rank_char = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let file = file_index(file_char)?;
        let rank = rank_index(rank_char)?;
        Some(Self::from_rank_file(rank, file))
    }

    /// The file that this square is on. File 0 is the h-file.
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// The rank that this square is on. Rank 0 is white's back rank.
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn inner(self) -> u8 {
        self.0
    }

    pub const fn signed_inner(self) -> i8 {
        #![allow(clippy::cast_possible_wrap)]
        self.0 as i8
    }

    /// Mirrors the square vertically (a1 <-> a8).
    pub const fn flip_rank(self) -> Self {
        Self(self.0 ^ 0b11_1000)
    }

    pub const fn distance(a: Self, b: Self) -> u8 {
        let file_diff = a.file().abs_diff(b.file());
        let rank_diff = a.rank().abs_diff(b.rank());
        if file_diff > rank_diff {
            file_diff
        } else {
            rank_diff
        }
    }

    /// Offsets the square index, returning `None` if it leaves the board
    /// or wraps more than two files.
    pub fn try_offset(self, delta: i8) -> Option<Self> {
        let target = i16::from(self.signed_inner()) + i16::from(delta);
        if !(0..64).contains(&target) {
            return None;
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let target = Self(target as u8);
        (Self::distance(self, target) <= 2).then_some(target)
    }

    pub fn name(self) -> &'static str {
        SQUARE_NAMES[self.index()]
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Maps 'a'..'h' to file indices 7..0.
pub fn file_index(c: char) -> Option<u8> {
    match c {
        'a'..='h' => Some(7 - (c as u8 - b'a')),
        _ => None,
    }
}

/// Maps '1'..'8' to rank indices 0..7.
pub fn rank_index(c: char) -> Option<u8> {
    match c {
        '1'..='8' => Some(c as u8 - b'1'),
        _ => None,
    }
}
