use thiserror::Error;

use crate::{
    piece::{Colour, Piece},
    util::Square,
};

/// Errors from parsing a move in the accepted algebraic subset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("empty move string")]
    Empty,
    #[error("invalid move text {0:?}")]
    Invalid(String),
    #[error("invalid destination square in {0:?}")]
    InvalidSquare(String),
    #[error("invalid promotion piece {0:?}")]
    InvalidPromotion(char),
    #[error("no legal interpretation of {0:?}")]
    NoMatch(String),
    #[error("ambiguous move {0:?}, add a source file or rank")]
    Ambiguous(String),
}

/// Validation failures from `Board::apply_move`. The board is left
/// untouched when any of these are returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveApplyError {
    #[error("no {piece} on {square} to move")]
    NoPieceAtOrigin { piece: Piece, square: Square },
    #[error("friendly piece on destination {0}")]
    FriendlyAtDestination(Square),
    #[error("capture move but no enemy piece on {0}")]
    MissingCaptureTarget(Square),
    #[error("quiet move onto occupied square {0}")]
    DestinationOccupied(Square),
    #[error("castling is not supported")]
    CastlingUnsupported,
}

/// A structural defect in the position. Any of these firing means a bug
/// in move application or generation, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionValidityError {
    #[error("{colour} union differs from the OR of its piece boards")]
    UnionMismatch { colour: Colour },
    #[error("colour unions overlap")]
    UnionsOverlap,
    #[error("piece boards {0} and {1} overlap")]
    PieceBoardsOverlap(Piece, Piece),
    #[error("occupied board differs from the union of both colours")]
    OccupiedMismatch,
    #[error("empty board is not the complement of occupied")]
    EmptyMismatch,
    #[error("{colour} has {count} kings")]
    KingCount { colour: Colour, count: u32 },
    #[error("{colour} has {count} pawns")]
    PawnCount { colour: Colour, count: u32 },
    #[error("implausible population {count} for {piece}")]
    PieceCount { piece: Piece, count: u32 },
    #[error("incremental value {incremental} differs from recomputed {recomputed}")]
    ValueMismatch { incremental: i32, recomputed: i32 },
}
