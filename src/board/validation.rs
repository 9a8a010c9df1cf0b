use super::Board;
use crate::{
    errors::PositionValidityError,
    evaluation,
    piece::{Colour, Piece, PieceType},
    squareset::SquareSet,
};

impl Board {
    /// Verifies every structural invariant of the position. Cheap enough
    /// to run after each apply/undo in debug builds, and the first thing
    /// to reach for when the engine misbehaves.
    pub fn check_coherence(&self) -> Result<(), PositionValidityError> {
        for colour in [Colour::White, Colour::Black] {
            let mut union = SquareSet::EMPTY;
            for pt in PieceType::all() {
                union |= self.piece_set(Piece::new(colour, pt));
            }
            if union != self.colour_set(colour) {
                return Err(PositionValidityError::UnionMismatch { colour });
            }
        }

        let white = self.colour_set(Colour::White);
        let black = self.colour_set(Colour::Black);
        if (white & black).non_empty() {
            return Err(PositionValidityError::UnionsOverlap);
        }
        if (white ^ black) != self.occupied() {
            return Err(PositionValidityError::OccupiedMismatch);
        }
        if self.empty() != !self.occupied() {
            return Err(PositionValidityError::EmptyMismatch);
        }

        for a in Piece::all() {
            for b in Piece::all().filter(|&b| b > a) {
                if (self.piece_set(a) & self.piece_set(b)).non_empty() {
                    return Err(PositionValidityError::PieceBoardsOverlap(a, b));
                }
            }
        }

        for colour in [Colour::White, Colour::Black] {
            let kings = self.piece_set(Piece::new(colour, PieceType::King)).count();
            if kings != 1 {
                return Err(PositionValidityError::KingCount { colour, count: kings });
            }
            let pawns = self.piece_set(Piece::new(colour, PieceType::Pawn)).count();
            if pawns > 8 {
                return Err(PositionValidityError::PawnCount { colour, count: pawns });
            }
        }
        for piece in Piece::all() {
            let count = self.piece_set(piece).count();
            if count > 10 {
                return Err(PositionValidityError::PieceCount { piece, count });
            }
        }

        let recomputed = evaluation::evaluate(self);
        if recomputed != self.value() {
            return Err(PositionValidityError::ValueMismatch {
                incremental: self.value(),
                recomputed,
            });
        }
        Ok(())
    }
}
