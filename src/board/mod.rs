pub mod movegen;
pub mod validation;

use std::fmt::{self, Display, Formatter};

use crate::{
    chessmove::Move,
    errors::MoveApplyError,
    evaluation,
    piece::{Colour, Piece},
    piecesquaretable::piece_square_value,
    squareset::SquareSet,
    util::Square,
};

/// The position: one bitboard per piece kind, the two colour unions, and
/// the derived occupancy boards, kept coherent by every mutation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pieces: [SquareSet; 12],
    colours: [SquareSet; 2],
    occupied: SquareSet,
    empty: SquareSet,
    value: i32,
}

/// Proof that a move has been applied to the board. Undo consumes it, so
/// the apply/undo pairing is last-in-first-out by construction.
#[derive(Debug)]
pub struct AppliedMove {
    inner: Move,
}

impl AppliedMove {
    /// The move record, with `captured` filled in.
    pub const fn get(&self) -> Move {
        self.inner
    }
}

impl Board {
    /// The standard starting arrangement, bit for bit.
    pub fn new() -> Self {
        let pieces = [
            SquareSet::from_inner(0x0000_0000_0000_FF00), // WP
            SquareSet::from_inner(0x0000_0000_0000_0081), // WR
            SquareSet::from_inner(0x0000_0000_0000_0024), // WB
            SquareSet::from_inner(0x0000_0000_0000_0042), // WN
            SquareSet::from_inner(0x0000_0000_0000_0010), // WQ
            SquareSet::from_inner(0x0000_0000_0000_0008), // WK
            SquareSet::from_inner(0x00FF_0000_0000_0000), // BP
            SquareSet::from_inner(0x8100_0000_0000_0000), // BR
            SquareSet::from_inner(0x2400_0000_0000_0000), // BB
            SquareSet::from_inner(0x4200_0000_0000_0000), // BN
            SquareSet::from_inner(0x0800_0000_0000_0000), // BQ
            SquareSet::from_inner(0x1000_0000_0000_0000), // BK
        ];
        let out = Self::from_boards(pieces);
        debug_assert_eq!(out.occupied.inner(), 0xFFFF_0000_0000_FFFF);
        debug_assert_eq!(out.empty.inner(), 0x0000_FFFF_FFFF_0000);
        out
    }

    /// Builds a position from a piece list. Intended for tests and
    /// position setup; the usual coherence rules apply.
    pub fn from_pieces(placement: &[(Piece, Square)]) -> Self {
        let mut pieces = [SquareSet::EMPTY; 12];
        for &(piece, sq) in placement {
            debug_assert!(!pieces[piece].contains_square(sq), "duplicate placement on {sq}");
            pieces[piece] = pieces[piece].add_square(sq);
        }
        Self::from_boards(pieces)
    }

    fn from_boards(pieces: [SquareSet; 12]) -> Self {
        let mut colours = [SquareSet::EMPTY; 2];
        for piece in Piece::all() {
            colours[piece.colour()] |= pieces[piece];
        }
        let occupied = colours[Colour::White] | colours[Colour::Black];
        let mut out =
            Self { pieces, colours, occupied, empty: !occupied, value: 0 };
        out.value = evaluation::evaluate(&out);
        #[cfg(debug_assertions)]
        out.check_coherence().unwrap();
        out
    }

    pub const fn piece_set(&self, piece: Piece) -> SquareSet {
        self.pieces[piece.index()]
    }

    pub const fn colour_set(&self, colour: Colour) -> SquareSet {
        self.colours[colour.index()]
    }

    pub const fn occupied(&self) -> SquareSet {
        self.occupied
    }

    pub const fn empty(&self) -> SquareSet {
        self.empty
    }

    /// The incrementally maintained white-positive evaluation.
    pub const fn value(&self) -> i32 {
        self.value
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        if !self.occupied.contains_square(sq) {
            return None;
        }
        Piece::all().find(|&piece| self.pieces[piece].contains_square(sq))
    }

    pub fn king_square(&self, colour: Colour) -> Square {
        let kings = self.pieces[Piece::new(colour, crate::piece::PieceType::King)];
        debug_assert_eq!(kings.count(), 1);
        kings.first()
    }

    /// Applies a generated or parsed move. Validation failures leave the
    /// board untouched and report what was wrong; coherence violations
    /// after a successful application are programmer errors and panic in
    /// debug builds.
    pub fn apply_move(&mut self, m: Move) -> Result<AppliedMove, MoveApplyError> {
        if m.is_castle() {
            return Err(MoveApplyError::CastlingUnsupported);
        }
        let piece = m.piece;
        let us = piece.colour();
        let them = us.flip();

        if !self.pieces[piece].contains_square(m.from) {
            return Err(MoveApplyError::NoPieceAtOrigin { piece, square: m.from });
        }
        if self.colours[us].contains_square(m.to) {
            return Err(MoveApplyError::FriendlyAtDestination(m.to));
        }

        let capture_square = m.capture_square();
        let captured = if m.is_capture() {
            match self.piece_at(capture_square).filter(|p| p.colour() == them) {
                Some(victim) => Some(victim),
                None => return Err(MoveApplyError::MissingCaptureTarget(capture_square)),
            }
        } else {
            None
        };
        // quiet moves and en passant both require an empty destination.
        if (!m.is_capture() || m.is_en_passant()) && self.occupied.contains_square(m.to) {
            return Err(MoveApplyError::DestinationOccupied(m.to));
        }

        let arriving = match m.promotion {
            Some(promo) => Piece::new(us, promo),
            None => piece,
        };

        let from_set = SquareSet::from_square(m.from);
        let to_set = SquareSet::from_square(m.to);
        self.pieces[piece] ^= from_set;
        self.pieces[arriving] |= to_set;
        self.colours[us] = (self.colours[us] ^ from_set) | to_set;
        if let Some(victim) = captured {
            self.pieces[victim] = self.pieces[victim].remove_square(capture_square);
            self.colours[them] = self.colours[them].remove_square(capture_square);
        }
        self.occupied = self.colours[Colour::White] | self.colours[Colour::Black];
        self.empty = !self.occupied;

        self.value += piece_square_value(arriving, m.to) - piece_square_value(piece, m.from);
        if let Some(victim) = captured {
            self.value -= piece_square_value(victim, capture_square);
        }

        let mut inner = m;
        inner.captured = captured;
        #[cfg(debug_assertions)]
        self.check_coherence().unwrap();
        Ok(AppliedMove { inner })
    }

    /// Exact inverse of the matching `apply_move`, derived from the move
    /// record alone.
    pub fn undo_move(&mut self, am: AppliedMove) {
        let m = am.inner;
        let piece = m.piece;
        let us = piece.colour();
        let them = us.flip();
        let capture_square = m.capture_square();
        let arriving = match m.promotion {
            Some(promo) => Piece::new(us, promo),
            None => piece,
        };

        debug_assert!(self.pieces[arriving].contains_square(m.to));
        self.pieces[arriving] = self.pieces[arriving].remove_square(m.to);
        self.pieces[piece] = self.pieces[piece].add_square(m.from);
        self.colours[us] = self.colours[us].remove_square(m.to).add_square(m.from);
        if let Some(victim) = m.captured {
            self.pieces[victim] = self.pieces[victim].add_square(capture_square);
            self.colours[them] = self.colours[them].add_square(capture_square);
        }
        self.occupied = self.colours[Colour::White] | self.colours[Colour::Black];
        self.empty = !self.occupied;

        self.value -= piece_square_value(arriving, m.to) - piece_square_value(piece, m.from);
        if let Some(victim) = m.captured {
            self.value += piece_square_value(victim, capture_square);
        }
        #[cfg(debug_assertions)]
        self.check_coherence().unwrap();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in (0..8).rev() {
                let sq = Square::from_rank_file(rank, file);
                match self.piece_at(sq) {
                    Some(piece) => write!(f, " {piece}")?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f, "value: {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::{
        chessmove::{Move, MoveFlags},
        errors::MoveApplyError,
        piece::{Piece, PieceType},
        squareset::SquareSet,
        util::Square,
    };

    #[test]
    fn starting_boards_are_bit_exact() {
        let board = Board::new();
        assert_eq!(board.piece_set(Piece::WP).inner(), 0x0000_0000_0000_FF00);
        assert_eq!(board.piece_set(Piece::BP).inner(), 0x00FF_0000_0000_0000);
        assert_eq!(board.piece_set(Piece::WR).inner(), 0x0000_0000_0000_0081);
        assert_eq!(board.piece_set(Piece::BR).inner(), 0x8100_0000_0000_0000);
        assert_eq!(board.piece_set(Piece::WN).inner(), 0x0000_0000_0000_0042);
        assert_eq!(board.piece_set(Piece::BN).inner(), 0x4200_0000_0000_0000);
        assert_eq!(board.piece_set(Piece::WB).inner(), 0x0000_0000_0000_0024);
        assert_eq!(board.piece_set(Piece::BB).inner(), 0x2400_0000_0000_0000);
        assert_eq!(board.piece_set(Piece::WQ).inner(), 0x0000_0000_0000_0010);
        assert_eq!(board.piece_set(Piece::BQ).inner(), 0x0800_0000_0000_0000);
        assert_eq!(board.piece_set(Piece::WK).inner(), 0x0000_0000_0000_0008);
        assert_eq!(board.piece_set(Piece::BK).inner(), 0x1000_0000_0000_0000);
        assert_eq!(board.occupied().inner(), 0xFFFF_0000_0000_FFFF);
        assert_eq!(board.empty().inner(), 0x0000_FFFF_FFFF_0000);
        assert_eq!(board.value(), 0);
        // the queens face each other on the d-file, the kings on the e-file.
        assert_eq!(board.piece_at(Square::from_name("d1").unwrap()), Some(Piece::WQ));
        assert_eq!(board.piece_at(Square::from_name("e1").unwrap()), Some(Piece::WK));
        assert_eq!(board.piece_at(Square::from_name("d8").unwrap()), Some(Piece::BQ));
        assert_eq!(board.piece_at(Square::from_name("e8").unwrap()), Some(Piece::BK));
    }

    #[test]
    fn double_push_round_trips_exactly() {
        let initial = Board::new();
        let mut board = initial.clone();
        let m = Move::new(
            Piece::WP,
            Square::new(12),
            Square::new(28),
            MoveFlags::QUIET.union(MoveFlags::DOUBLE_PAWN),
        );
        let applied = board.apply_move(m).unwrap();
        assert_eq!(
            board.piece_set(Piece::WP),
            initial.piece_set(Piece::WP) ^ SquareSet::from_inner(0x0000_0000_1000_1000)
        );
        assert_eq!(
            board.colour_set(crate::piece::Colour::White),
            initial.colour_set(crate::piece::Colour::White)
                ^ SquareSet::from_inner(0x0000_0000_1000_1000)
        );
        board.undo_move(applied);
        assert_eq!(board, initial);
    }

    #[test]
    fn capture_round_trips_exactly() {
        let initial = Board::from_pieces(&[
            (Piece::WK, Square::E1),
            (Piece::BK, Square::E8),
            (Piece::WR, Square::from_name("d4").unwrap()),
            (Piece::BN, Square::from_name("d7").unwrap()),
        ]);
        let mut board = initial.clone();
        let m = Move::new(
            Piece::WR,
            Square::from_name("d4").unwrap(),
            Square::from_name("d7").unwrap(),
            MoveFlags::CAPTURE,
        );
        let applied = board.apply_move(m).unwrap();
        assert_eq!(applied.get().captured, Some(Piece::BN));
        assert!(board.piece_set(Piece::BN).is_empty());
        board.undo_move(applied);
        assert_eq!(board, initial);
    }

    #[test]
    fn en_passant_removes_the_pawn_behind() {
        let initial = Board::from_pieces(&[
            (Piece::WK, Square::E1),
            (Piece::BK, Square::E8),
            (Piece::WP, Square::from_name("e5").unwrap()),
            (Piece::BP, Square::from_name("d5").unwrap()),
        ]);
        let mut board = initial.clone();
        let m = Move::new(
            Piece::WP,
            Square::from_name("e5").unwrap(),
            Square::from_name("d6").unwrap(),
            MoveFlags::CAPTURE.union(MoveFlags::EN_PASSANT),
        );
        let applied = board.apply_move(m).unwrap();
        assert_eq!(applied.get().captured, Some(Piece::BP));
        assert!(board.piece_set(Piece::BP).is_empty());
        assert_eq!(
            board.piece_at(Square::from_name("d6").unwrap()),
            Some(Piece::WP)
        );
        board.undo_move(applied);
        assert_eq!(board, initial);
    }

    #[test]
    fn promotion_rewrites_the_piece_board() {
        let initial = Board::from_pieces(&[
            (Piece::WK, Square::E1),
            (Piece::BK, Square::from_name("a8").unwrap()),
            (Piece::WP, Square::from_name("h7").unwrap()),
        ]);
        let mut board = initial.clone();
        let m = Move::new_with_promo(
            Piece::WP,
            Square::from_name("h7").unwrap(),
            Square::from_name("h8").unwrap(),
            MoveFlags::QUIET,
            PieceType::Queen,
        );
        let applied = board.apply_move(m).unwrap();
        assert!(board.piece_set(Piece::WP).is_empty());
        assert!(board.piece_set(Piece::WQ).contains_square(Square::from_name("h8").unwrap()));
        board.undo_move(applied);
        assert_eq!(board, initial);
    }

    #[test]
    fn validation_failures_leave_the_board_alone() {
        let initial = Board::new();
        let mut board = initial.clone();

        // no white rook on e2.
        let wrong_piece =
            Move::new(Piece::WR, Square::new(11), Square::new(19), MoveFlags::QUIET);
        assert!(matches!(
            board.apply_move(wrong_piece),
            Err(MoveApplyError::NoPieceAtOrigin { .. })
        ));
        assert_eq!(board, initial);

        // rook sliding onto its own pawn.
        let friendly_target =
            Move::new(Piece::WR, Square::new(0), Square::new(8), MoveFlags::QUIET);
        assert!(matches!(
            board.apply_move(friendly_target),
            Err(MoveApplyError::FriendlyAtDestination(_))
        ));
        assert_eq!(board, initial);

        // capture flag with nothing to take.
        let empty_capture =
            Move::new(Piece::WN, Square::new(1), Square::new(16), MoveFlags::CAPTURE);
        assert!(matches!(
            board.apply_move(empty_capture),
            Err(MoveApplyError::MissingCaptureTarget(_))
        ));
        assert_eq!(board, initial);

        let castle = Move::new(
            Piece::WK,
            Square::E1,
            Square::G1,
            MoveFlags::CASTLE_KING,
        );
        assert!(matches!(
            board.apply_move(castle),
            Err(MoveApplyError::CastlingUnsupported)
        ));
        assert_eq!(board, initial);
    }
}
