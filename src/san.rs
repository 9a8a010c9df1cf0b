//! The accepted algebraic subset: pawn pushes ("e4"), pawn captures
//! ("exd5"), promotions ("e8=Q"), piece moves with optional file or rank
//! disambiguation ("Nf3", "Rad1", "R1d5"), and the castling tokens.
//! Moves are resolved by matching against the generated move list for
//! the side to move.

use crate::{
    board::{movegen::MoveList, Board},
    chessmove::{Move, MoveFlags},
    errors::MoveParseError,
    piece::{Colour, Piece, PieceType},
    threats::ThreatMap,
    util::{file_index, rank_index, Square},
};

/// Renders a move in the debug form: piece letter, then start and end
/// square indices in decimal.
pub fn format_move(m: Move) -> String {
    let mut out = format!("{}{}-{}", m.piece.char(), m.from.index(), m.to.index());
    if let Some(promo) = m.promotion {
        out.push('=');
        out.push(promo.promo_char().unwrap_or('?'));
    }
    out
}

fn castle_move(side: Colour, kingside: bool) -> Move {
    let king = Piece::new(side, PieceType::King);
    let (from, to, flag) = match (side, kingside) {
        (Colour::White, true) => (Square::E1, Square::G1, MoveFlags::CASTLE_KING),
        (Colour::White, false) => (Square::E1, Square::C1, MoveFlags::CASTLE_QUEEN),
        (Colour::Black, true) => (Square::E8, Square::new(57), MoveFlags::CASTLE_KING),
        (Colour::Black, false) => (Square::E8, Square::new(61), MoveFlags::CASTLE_QUEEN),
    };
    Move::new(king, from, to, flag)
}

struct Pattern {
    piece_type: PieceType,
    dest: Square,
    capture: bool,
    promotion: Option<PieceType>,
    source_file: Option<u8>,
    source_rank: Option<u8>,
}

fn parse_pattern(text: &str) -> Result<Pattern, MoveParseError> {
    let invalid = || MoveParseError::Invalid(text.into());
    let mut chars: Vec<char> = text.chars().collect();

    // a trailing promotion letter, optionally preceded by '='.
    let mut promotion = None;
    if let Some(&last) = chars.last() {
        if let Some(pt) = PieceType::from_san_letter(last) {
            if pt.legal_promo() && chars.len() > 2 {
                promotion = Some(pt);
                chars.pop();
                if chars.last() == Some(&'=') {
                    chars.pop();
                }
            }
        }
    }
    // any '=' surviving the strip introduced something that was not a
    // promotion piece.
    if let Some(pos) = chars.iter().position(|&c| c == '=') {
        let offender = chars.get(pos + 1).copied().unwrap_or('=');
        return Err(MoveParseError::InvalidPromotion(offender));
    }
    if chars.len() < 2 {
        return Err(invalid());
    }

    let bad_square = || MoveParseError::InvalidSquare(text.into());
    let dest_rank = rank_index(chars[chars.len() - 1]).ok_or_else(bad_square)?;
    let dest_file = file_index(chars[chars.len() - 2]).ok_or_else(bad_square)?;
    let dest = Square::from_rank_file(dest_rank, dest_file);
    let head = &chars[..chars.len() - 2];

    if let Some(piece_type) = head.first().copied().and_then(PieceType::from_san_letter) {
        // piece move. The head may carry a disambiguator and an 'x'.
        if promotion.is_some() {
            return Err(invalid());
        }
        let mut capture = false;
        let mut source_file = None;
        let mut source_rank = None;
        for &c in &head[1..] {
            match c {
                'x' => capture = true,
                _ if file_index(c).is_some() => source_file = file_index(c),
                _ if rank_index(c).is_some() => source_rank = rank_index(c),
                _ => return Err(invalid()),
            }
        }
        Ok(Pattern { piece_type, dest, capture, promotion, source_file, source_rank })
    } else {
        // pawn move: bare destination, or "<file>x" prefix for captures.
        match head {
            [] => Ok(Pattern {
                piece_type: PieceType::Pawn,
                dest,
                capture: false,
                promotion,
                source_file: None,
                source_rank: None,
            }),
            [file, 'x'] => Ok(Pattern {
                piece_type: PieceType::Pawn,
                dest,
                capture: true,
                promotion,
                source_file: Some(file_index(*file).ok_or_else(invalid)?),
                source_rank: None,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Parses `text` against the pseudo-legal moves of `side`. The caller
/// still owns legality: applying the result may reveal an exposed king.
pub fn parse_move(
    board: &Board,
    threats: &ThreatMap,
    side: Colour,
    last_move: Option<Move>,
    text: &str,
) -> Result<Move, MoveParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MoveParseError::Empty);
    }
    let stripped = text.trim_end_matches(['+', '#']);

    match stripped {
        "O-O" | "0-0" => return Ok(castle_move(side, true)),
        "O-O-O" | "0-0-0" => return Ok(castle_move(side, false)),
        _ => {}
    }

    let pattern = parse_pattern(stripped)?;

    let mut moves = MoveList::new();
    board.generate_moves(side, threats, last_move, &mut moves);

    let mut matches = moves.iter().filter(|m| {
        m.piece.piece_type() == pattern.piece_type
            && m.to == pattern.dest
            && m.is_capture() == pattern.capture
            && m.promotion == pattern.promotion
            && pattern.source_file.map_or(true, |f| m.from.file() == f)
            && pattern.source_rank.map_or(true, |r| m.from.rank() == r)
    });

    match (matches.next(), matches.next()) {
        (None, _) => Err(MoveParseError::NoMatch(text.into())),
        (Some(m), None) => Ok(m),
        (Some(_), Some(_)) => Err(MoveParseError::Ambiguous(text.into())),
    }
}
