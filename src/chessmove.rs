use std::fmt::{self, Debug, Display, Formatter};

use crate::{
    piece::{Piece, PieceType},
    util::Square,
};

/// Bit set describing what kind of move a record is. A move is either
/// quiet or a capture; the remaining bits qualify it further.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const QUIET: Self = Self(0b0000_0001);
    pub const CAPTURE: Self = Self(0b0000_0010);
    pub const DOUBLE_PAWN: Self = Self(0b0000_0100);
    pub const EN_PASSANT: Self = Self(0b0000_1000);
    pub const CASTLE_KING: Self = Self(0b0001_0000);
    pub const CASTLE_QUEEN: Self = Self(0b0010_0000);
    pub const CHECK: Self = Self(0b0100_0000);
    pub const MATE: Self = Self(0b1000_0000);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl Debug for MoveFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::QUIET, "QUIET"),
            (Self::CAPTURE, "CAPTURE"),
            (Self::DOUBLE_PAWN, "DOUBLE_PAWN"),
            (Self::EN_PASSANT, "EN_PASSANT"),
            (Self::CASTLE_KING, "CASTLE_KING"),
            (Self::CASTLE_QUEEN, "CASTLE_QUEEN"),
            (Self::CHECK, "CHECK"),
            (Self::MATE, "MATE"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        Ok(())
    }
}

/// A move record. `captured` is back-filled by the board when the move is
/// applied; `promotion` is set by the generator for pawn moves reaching
/// the last rank.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub flags: MoveFlags,
}

impl Move {
    pub const fn new(piece: Piece, from: Square, to: Square, flags: MoveFlags) -> Self {
        Self { from, to, piece, captured: None, promotion: None, flags }
    }

    pub const fn new_with_promo(
        piece: Piece,
        from: Square,
        to: Square,
        flags: MoveFlags,
        promotion: PieceType,
    ) -> Self {
        debug_assert!(promotion.legal_promo());
        Self { from, to, piece, captured: None, promotion: Some(promotion), flags }
    }

    pub const fn is_capture(self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    pub const fn is_en_passant(self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    pub const fn is_double_pawn(self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PAWN)
    }

    pub const fn is_castle(self) -> bool {
        self.flags.contains(MoveFlags::CASTLE_KING) || self.flags.contains(MoveFlags::CASTLE_QUEEN)
    }

    /// The square the victim of this move stands on: the destination,
    /// except for en passant where the pawn is one rank behind it.
    pub fn capture_square(self) -> Square {
        if self.is_en_passant() {
            match self.piece.colour() {
                crate::piece::Colour::White => Square::new(self.to.inner() - 8),
                crate::piece::Colour::Black => Square::new(self.to.inner() + 8),
            }
        } else {
            self.to
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            let c = promo.promo_char().unwrap_or('?');
            write!(f, "{}", c.to_ascii_lowercase())?;
        }
        Ok(())
    }
}
