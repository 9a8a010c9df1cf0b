use arrayvec::ArrayVec;

use super::Board;
use crate::{
    chessmove::{Move, MoveFlags},
    lookups::{king_attacks, knight_attacks, pawn_attacks, BISHOP_DIRS, QUEEN_DIRS, ROOK_DIRS},
    piece::{Colour, Piece, PieceType},
    threats::ThreatMap,
    util::Square,
};

pub const MAX_POSITION_MOVES: usize = 256;

const PROMOTION_TARGETS: [PieceType; 4] =
    [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

#[derive(Copy, Clone, Debug)]
pub struct MoveListEntry {
    pub mv: Move,
    pub score: i32,
}

/// The moves available in one position. Stack-allocated and owned by the
/// search frame that asked for it.
#[derive(Default)]
pub struct MoveList {
    inner: ArrayVec<MoveListEntry, MAX_POSITION_MOVES>,
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move, score: i32) {
        self.inner.push(MoveListEntry { mv, score });
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.inner.iter().map(|entry| entry.mv)
    }

    /// Highest score first. Captures of valuable pieces bubble up, which
    /// is what makes the pruning bite early.
    pub fn sort(&mut self) {
        self.inner.sort_unstable_by(|a, b| b.score.cmp(&a.score));
    }
}

/// Most-valuable-victim / least-valuable-attacker ordering score.
fn mvv_lva(victim: PieceType, attacker: PieceType) -> i32 {
    victim.material_value() * 10 - attacker.material_value() / 10
}

const PROMOTION_SCORE: i32 = 8_000;

impl Board {
    /// Produces the pseudo-legal moves for one side. King steps onto
    /// squares the threat map reports attacked are excluded here; moves
    /// that would expose the king to a discovered check are not, and get
    /// rejected by the caller after application.
    pub fn generate_moves(
        &self,
        side: Colour,
        threats: &ThreatMap,
        last_move: Option<Move>,
        list: &mut MoveList,
    ) {
        self.generate_pawn_moves(side, last_move, list);
        self.generate_slider_moves(Piece::new(side, PieceType::Rook), &ROOK_DIRS, list);
        self.generate_slider_moves(Piece::new(side, PieceType::Bishop), &BISHOP_DIRS, list);
        self.generate_knight_moves(side, list);
        self.generate_slider_moves(Piece::new(side, PieceType::Queen), &QUEEN_DIRS, list);
        self.generate_king_moves(side, threats, list);
    }

    fn push_pawn_move(&self, list: &mut MoveList, mut m: Move, promoting: bool) {
        let score = if m.is_capture() {
            let victim = self.piece_at(m.capture_square()).map_or(PieceType::Pawn, Piece::piece_type);
            mvv_lva(victim, PieceType::Pawn)
        } else {
            0
        };
        if promoting {
            for target in PROMOTION_TARGETS {
                m.promotion = Some(target);
                list.push(m, score + PROMOTION_SCORE);
            }
        } else {
            list.push(m, score);
        }
    }

    fn generate_pawn_moves(&self, side: Colour, last_move: Option<Move>, list: &mut MoveList) {
        let pawn = Piece::new(side, PieceType::Pawn);
        let enemy_pawn = Piece::new(side.flip(), PieceType::Pawn);
        let enemies = self.colour_set(side.flip());
        let (push, start_rank, promo_rank) = match side {
            Colour::White => (8i8, 1u8, 7u8),
            Colour::Black => (-8i8, 6u8, 0u8),
        };

        for sq in self.piece_set(pawn) {
            #[allow(clippy::cast_sign_loss)]
            let single = Square::new((sq.signed_inner() + push) as u8);
            if self.empty.contains_square(single) {
                self.push_pawn_move(
                    list,
                    Move::new(pawn, sq, single, MoveFlags::QUIET),
                    single.rank() == promo_rank,
                );
                if sq.rank() == start_rank {
                    #[allow(clippy::cast_sign_loss)]
                    let double = Square::new((sq.signed_inner() + 2 * push) as u8);
                    if self.empty.contains_square(double) {
                        list.push(
                            Move::new(
                                pawn,
                                sq,
                                double,
                                MoveFlags::QUIET.union(MoveFlags::DOUBLE_PAWN),
                            ),
                            0,
                        );
                    }
                }
            }

            for target in pawn_attacks(side, sq) & enemies {
                self.push_pawn_move(
                    list,
                    Move::new(pawn, sq, target, MoveFlags::CAPTURE),
                    target.rank() == promo_rank,
                );
            }

            // en passant hangs entirely off the immediately preceding
            // move: a double push landing next to this pawn.
            if let Some(last) = last_move {
                if last.piece == enemy_pawn
                    && last.is_double_pawn()
                    && last.to.rank() == sq.rank()
                    && last.to.file().abs_diff(sq.file()) == 1
                {
                    #[allow(clippy::cast_sign_loss)]
                    let target = Square::new((last.to.signed_inner() + push) as u8);
                    list.push(
                        Move::new(
                            pawn,
                            sq,
                            target,
                            MoveFlags::CAPTURE.union(MoveFlags::EN_PASSANT),
                        ),
                        mvv_lva(PieceType::Pawn, PieceType::Pawn),
                    );
                }
            }
        }
    }

    fn generate_slider_moves(&self, piece: Piece, dirs: &[(i8, i8)], list: &mut MoveList) {
        #![allow(clippy::cast_possible_wrap)]
        let sliders = self.piece_set(piece);
        if sliders.is_empty() {
            return;
        }
        let friendly = self.colour_set(piece.colour());
        let enemies = self.colour_set(piece.colour().flip());

        for sq in sliders {
            for &(file_step, rank_step) in dirs {
                let mut file = sq.file() as i8 + file_step;
                let mut rank = sq.rank() as i8 + rank_step;
                while (0..8).contains(&file) && (0..8).contains(&rank) {
                    #[allow(clippy::cast_sign_loss)]
                    let target = Square::from_rank_file(rank as u8, file as u8);
                    if friendly.contains_square(target) {
                        break;
                    }
                    if enemies.contains_square(target) {
                        let victim =
                            self.piece_at(target).map_or(PieceType::Pawn, Piece::piece_type);
                        list.push(
                            Move::new(piece, sq, target, MoveFlags::CAPTURE),
                            mvv_lva(victim, piece.piece_type()),
                        );
                        break;
                    }
                    list.push(Move::new(piece, sq, target, MoveFlags::QUIET), 0);
                    file += file_step;
                    rank += rank_step;
                }
            }
        }
    }

    fn generate_knight_moves(&self, side: Colour, list: &mut MoveList) {
        let knight = Piece::new(side, PieceType::Knight);
        let friendly = self.colour_set(side);
        let enemies = self.colour_set(side.flip());

        for sq in self.piece_set(knight) {
            for target in knight_attacks(sq) - friendly {
                if enemies.contains_square(target) {
                    let victim = self.piece_at(target).map_or(PieceType::Pawn, Piece::piece_type);
                    list.push(
                        Move::new(knight, sq, target, MoveFlags::CAPTURE),
                        mvv_lva(victim, PieceType::Knight),
                    );
                } else {
                    list.push(Move::new(knight, sq, target, MoveFlags::QUIET), 0);
                }
            }
        }
    }

    fn generate_king_moves(&self, side: Colour, threats: &ThreatMap, list: &mut MoveList) {
        let king = Piece::new(side, PieceType::King);
        let friendly = self.colour_set(side);
        let enemies = self.colour_set(side.flip());
        let sq = self.king_square(side);

        for target in king_attacks(sq) - friendly {
            // stepping onto an attacked square can never be legal, so it
            // is filtered at generation time rather than by the search.
            if threats.is_square_threatened_by(threats.depth(), target, side.flip()) {
                continue;
            }
            if enemies.contains_square(target) {
                let victim = self.piece_at(target).map_or(PieceType::Pawn, Piece::piece_type);
                list.push(
                    Move::new(king, sq, target, MoveFlags::CAPTURE),
                    mvv_lva(victim, PieceType::King),
                );
            } else {
                list.push(Move::new(king, sq, target, MoveFlags::QUIET), 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MoveList;
    use crate::{
        board::Board,
        chessmove::{Move, MoveFlags},
        piece::{Colour, Piece, PieceType},
        threats::ThreatMap,
        util::Square,
    };

    fn moves_for(board: &Board, side: Colour, last_move: Option<Move>) -> Vec<Move> {
        let mut threats = ThreatMap::new(0);
        threats.rebuild(board);
        let mut list = MoveList::new();
        board.generate_moves(side, &threats, last_move, &mut list);
        list.iter().collect()
    }

    #[test]
    fn twenty_moves_from_the_start() {
        let board = Board::new();
        for side in [Colour::White, Colour::Black] {
            let moves = moves_for(&board, side, None);
            assert_eq!(moves.len(), 20);
            let pawn_moves =
                moves.iter().filter(|m| m.piece.piece_type() == PieceType::Pawn).count();
            let knight_moves =
                moves.iter().filter(|m| m.piece.piece_type() == PieceType::Knight).count();
            assert_eq!(pawn_moves, 16);
            assert_eq!(knight_moves, 4);
            let doubles = moves.iter().filter(|m| m.is_double_pawn()).count();
            assert_eq!(doubles, 8);
        }
    }

    #[test]
    fn lone_rook_sweeps_fourteen_squares() {
        let board = Board::from_pieces(&[
            (Piece::WR, Square::new(0)),
            (Piece::WK, Square::new(12)),
            (Piece::BK, Square::new(52)),
        ]);
        let moves = moves_for(&board, Colour::White, None);
        let rook_moves = moves.iter().filter(|m| m.piece == Piece::WR).count();
        assert_eq!(rook_moves, 14);
        let king_moves = moves.iter().filter(|m| m.piece == Piece::WK).count();
        assert_eq!(king_moves, 8);
    }

    #[test]
    fn friendly_blocker_at_distance_one_shuts_a_ray() {
        let board = Board::from_pieces(&[
            (Piece::WR, Square::new(0)),
            (Piece::WP, Square::new(8)),
            (Piece::WK, Square::new(12)),
            (Piece::BK, Square::new(52)),
        ]);
        let moves = moves_for(&board, Colour::White, None);
        // the h2 pawn swallows the whole h-file ray.
        assert!(moves
            .iter()
            .filter(|m| m.piece == Piece::WR)
            .all(|m| m.to.rank() == 0));
    }

    #[test]
    fn king_avoids_threatened_squares() {
        let board = Board::from_pieces(&[
            (Piece::WK, Square::D1),
            (Piece::BR, Square::from_name("e8").unwrap()),
            (Piece::BK, Square::from_name("a8").unwrap()),
        ]);
        let moves = moves_for(&board, Colour::White, None);
        let king_targets: Vec<_> =
            moves.iter().filter(|m| m.piece == Piece::WK).map(|m| m.to).collect();
        // the black rook owns the e-file; e1 and e2 are off limits.
        assert!(!king_targets.contains(&Square::E1));
        assert!(!king_targets.contains(&Square::from_name("e2").unwrap()));
        assert_eq!(king_targets.len(), 3);
    }

    #[test]
    fn promotions_come_in_four_flavours() {
        let board = Board::from_pieces(&[
            (Piece::WP, Square::from_name("g7").unwrap()),
            (Piece::BR, Square::from_name("h8").unwrap()),
            (Piece::WK, Square::E1),
            (Piece::BK, Square::from_name("a8").unwrap()),
        ]);
        let moves = moves_for(&board, Colour::White, None);
        let pushes: Vec<_> = moves
            .iter()
            .filter(|m| m.piece == Piece::WP && !m.is_capture())
            .collect();
        let captures: Vec<_> = moves
            .iter()
            .filter(|m| m.piece == Piece::WP && m.is_capture())
            .collect();
        assert_eq!(pushes.len(), 4);
        assert_eq!(captures.len(), 4);
        assert!(pushes.iter().all(|m| m.promotion.is_some()));
        let targets: Vec<_> = pushes.iter().filter_map(|m| m.promotion).collect();
        assert!(targets.contains(&PieceType::Queen) && targets.contains(&PieceType::Knight));
    }

    #[test]
    fn en_passant_requires_an_adjacent_double_push() {
        let board = Board::from_pieces(&[
            (Piece::WP, Square::from_name("e5").unwrap()),
            (Piece::BP, Square::from_name("d5").unwrap()),
            (Piece::WK, Square::E1),
            (Piece::BK, Square::E8),
        ]);
        let double_push = Move::new(
            Piece::BP,
            Square::from_name("d7").unwrap(),
            Square::from_name("d5").unwrap(),
            MoveFlags::QUIET.union(MoveFlags::DOUBLE_PAWN),
        );
        let with_context = moves_for(&board, Colour::White, Some(double_push));
        let ep: Vec<_> = with_context.iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to, Square::from_name("d6").unwrap());

        // without the double push immediately before, no en passant.
        let without_context = moves_for(&board, Colour::White, None);
        assert!(without_context.iter().all(|m| !m.is_en_passant()));

        // a quiet single push to the same square does not unlock it either.
        let single_push = Move::new(
            Piece::BP,
            Square::from_name("d6").unwrap(),
            Square::from_name("d5").unwrap(),
            MoveFlags::QUIET,
        );
        let with_single = moves_for(&board, Colour::White, Some(single_push));
        assert!(with_single.iter().all(|m| !m.is_en_passant()));
    }

    #[test]
    fn generated_moves_are_sound() {
        let board = Board::new();
        let mut positions = vec![board.clone()];
        // a few plies in, to get captures and open lines on the board.
        let mut board = board;
        for m in [
            Move::new(Piece::WP, Square::new(11), Square::new(27), MoveFlags::QUIET.union(MoveFlags::DOUBLE_PAWN)),
            Move::new(Piece::BP, Square::new(52), Square::new(36), MoveFlags::QUIET.union(MoveFlags::DOUBLE_PAWN)),
            Move::new(Piece::WN, Square::new(1), Square::new(18), MoveFlags::QUIET),
        ] {
            board.apply_move(m).unwrap();
            positions.push(board.clone());
        }

        for position in &positions {
            for side in [Colour::White, Colour::Black] {
                for m in moves_for(position, side, None) {
                    assert!(position.piece_set(m.piece).contains_square(m.from), "{m}");
                    assert!(!position.colour_set(side).contains_square(m.to), "{m}");
                    assert_eq!(
                        m.is_capture(),
                        position.colour_set(side.flip()).contains_square(m.to),
                        "capture flag wrong for {m}"
                    );
                    if m.piece.piece_type().is_slider() {
                        // interior path must be empty.
                        let mut file = i8::try_from(m.from.file()).unwrap();
                        let mut rank = i8::try_from(m.from.rank()).unwrap();
                        let file_step = (i8::try_from(m.to.file()).unwrap() - file).signum();
                        let rank_step = (i8::try_from(m.to.rank()).unwrap() - rank).signum();
                        loop {
                            file += file_step;
                            rank += rank_step;
                            #[allow(clippy::cast_sign_loss)]
                            let sq = Square::from_rank_file(rank as u8, file as u8);
                            if sq == m.to {
                                break;
                            }
                            assert!(position.empty().contains_square(sq), "blocked path for {m}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn capture_ordering_prefers_fat_victims() {
        let board = Board::from_pieces(&[
            (Piece::WR, Square::from_name("d4").unwrap()),
            (Piece::BQ, Square::from_name("d7").unwrap()),
            (Piece::BP, Square::from_name("g4").unwrap()),
            (Piece::WK, Square::E1),
            (Piece::BK, Square::from_name("a8").unwrap()),
        ]);
        let mut threats = ThreatMap::new(0);
        threats.rebuild(&board);
        let mut list = MoveList::new();
        board.generate_moves(Colour::White, &threats, None, &mut list);
        list.sort();
        let first = list.iter().next().unwrap();
        assert!(first.is_capture());
        assert_eq!(first.to, Square::from_name("d7").unwrap());
    }
}
