//! Per-square attacker bookkeeping. For every square the map knows which
//! pieces currently attack it, and the bookkeeping is updated
//! incrementally as moves are applied and rolled back, so king-safety
//! questions during search are list lookups rather than board scans.

use arrayvec::ArrayVec;

use crate::{
    board::Board,
    chessmove::Move,
    lookups::{king_attacks, knight_attacks, pawn_attacks, ray_attacks, BISHOP_DIRS, QUEEN_DIRS, ROOK_DIRS},
    piece::{Colour, Piece, PieceType},
    squareset::SquareSet,
    util::{Square, BOARD_N_SQUARES},
};

/// More simultaneous attackers of one square than material allows.
const MAX_SQUARE_ATTACKERS: usize = 24;

type ThreatList = ArrayVec<ThreatEntry, MAX_SQUARE_ATTACKERS>;
type ThreatSlot = [ThreatList; BOARD_N_SQUARES];

/// One attacker of one square.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ThreatEntry {
    pub piece: Piece,
    pub square: Square,
}

/// What a per-piece updater should do at each square the piece attacks.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ThreatOp {
    /// Append the entry unconditionally.
    Create,
    /// Remove the exact entry. A missing entry means the map has drifted
    /// from the position, which is unrecoverable.
    Delete,
    /// Append the entry unless it is already present.
    Update,
}

/// Slot 0 mirrors the real position; slot k mirrors the position after k
/// simulated plies. The cursor moves forward on simulated updates and
/// back on reverts.
pub struct ThreatMap {
    slots: Vec<ThreatSlot>,
    depth: usize,
}

fn empty_slot() -> ThreatSlot {
    std::array::from_fn(|_| ThreatList::new())
}

/// The squares `piece` attacks from `sq` in a position with the given
/// occupancy. Ray pieces include the first blocker and stop there.
pub fn attacks_from(piece: Piece, sq: Square, occupied: SquareSet) -> SquareSet {
    match piece.piece_type() {
        PieceType::Pawn => pawn_attacks(piece.colour(), sq),
        PieceType::Knight => knight_attacks(sq),
        PieceType::King => king_attacks(sq),
        PieceType::Rook => ray_attacks(sq, occupied, &ROOK_DIRS),
        PieceType::Bishop => ray_attacks(sq, occupied, &BISHOP_DIRS),
        PieceType::Queen => ray_attacks(sq, occupied, &QUEEN_DIRS),
    }
}

/// Reconstructs the occupancy from before `m` was applied. Only the
/// origin, destination and capture squares can differ.
fn occupied_before(m: Move, occupied_after: SquareSet) -> SquareSet {
    let mut occ = occupied_after.add_square(m.from);
    if !m.is_capture() {
        occ = occ.remove_square(m.to);
    } else if m.is_en_passant() {
        occ = occ.remove_square(m.to).add_square(m.capture_square());
    }
    occ
}

impl ThreatMap {
    /// A map with `max_depth + 1` slots: the real position plus one per
    /// simulated ply.
    pub fn new(max_depth: usize) -> Self {
        Self { slots: (0..=max_depth).map(|_| empty_slot()).collect(), depth: 0 }
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Drops all simulated state and regenerates slot 0 from the board.
    pub fn rebuild(&mut self, board: &Board) {
        self.wipe();
        for list in &mut self.slots[0] {
            list.clear();
        }
        for piece in Piece::all() {
            for sq in board.piece_set(piece) {
                self.update_piece(piece, sq, board.occupied(), ThreatOp::Create);
            }
        }
    }

    /// Clears every simulated slot and resets the cursor to the real
    /// position.
    pub fn wipe(&mut self) {
        for slot in &mut self.slots[1..] {
            for list in slot.iter_mut() {
                list.clear();
            }
        }
        self.depth = 0;
    }

    /// Folds the applied move into the map. A real move rewrites slot 0
    /// in place; a simulated move copies the current slot forward and
    /// advances the cursor, so the previous state stays intact for the
    /// backtrack.
    pub fn update(&mut self, m: Move, board: &Board, real_move: bool) {
        let occ_after = board.occupied();
        let occ_before = occupied_before(m, occ_after);

        if real_move {
            debug_assert_eq!(self.depth, 0, "real moves only apply at the real position");
        } else {
            assert!(self.depth + 1 < self.slots.len(), "threat map slots exhausted");
            let (current, next) = self.slots.split_at_mut(self.depth + 1);
            let current = &current[self.depth];
            let next = &mut next[0];
            for (dst, src) in next.iter_mut().zip(current.iter()) {
                dst.clone_from(src);
            }
            self.depth += 1;
        }

        // the mover stops projecting from its origin, and the victim
        // stops projecting entirely.
        self.update_piece(m.piece, m.from, occ_before, ThreatOp::Delete);
        if let Some(victim) = m.captured {
            self.update_piece(victim, m.capture_square(), occ_before, ThreatOp::Delete);
        }

        // sliders watching any square whose occupancy changed get their
        // rays re-derived: deleted under the old occupancy they were
        // built against, recreated under the new one.
        let mut affected: ArrayVec<ThreatEntry, { 3 * MAX_SQUARE_ATTACKERS }> = ArrayVec::new();
        let mut changed: ArrayVec<Square, 3> = ArrayVec::new();
        changed.push(m.from);
        changed.push(m.to);
        if m.is_en_passant() {
            changed.push(m.capture_square());
        }
        for &sq in &changed {
            if self.sliders_targeting(self.depth, sq) == 0 {
                continue;
            }
            for &entry in &self.slots[self.depth][sq.index()] {
                if entry.piece.piece_type().is_slider() && !affected.contains(&entry) {
                    affected.push(entry);
                }
            }
        }
        for entry in affected {
            self.update_piece(entry.piece, entry.square, occ_before, ThreatOp::Delete);
            self.update_piece(entry.piece, entry.square, occ_after, ThreatOp::Update);
        }

        // the arriving piece projects from its destination. Promotion
        // means the projector differs from the mover.
        let arriving = match m.promotion {
            Some(promo) => Piece::new(m.piece.colour(), promo),
            None => m.piece,
        };
        self.update_piece(arriving, m.to, occ_after, ThreatOp::Create);
    }

    /// Steps the cursor back one simulated ply, releasing the abandoned
    /// slot.
    pub fn revert_state(&mut self) {
        assert!(self.depth > 0, "attempted to revert the threat map below the real position");
        for list in &mut self.slots[self.depth] {
            list.clear();
        }
        self.depth -= 1;
    }

    /// Runs one per-piece updater: enumerates the squares the piece
    /// attacks and applies the opcode at each.
    fn update_piece(&mut self, piece: Piece, sq: Square, occupied: SquareSet, op: ThreatOp) {
        let entry = ThreatEntry { piece, square: sq };
        for target in attacks_from(piece, sq, occupied) {
            let list = &mut self.slots[self.depth][target.index()];
            match op {
                ThreatOp::Create => list.push(entry),
                ThreatOp::Update => {
                    if !list.contains(&entry) {
                        list.push(entry);
                    }
                }
                ThreatOp::Delete => {
                    let position = list
                        .iter()
                        .position(|e| *e == entry)
                        .unwrap_or_else(|| panic!("no threat by {piece} at {sq} on {target}"));
                    list.swap_remove(position);
                }
            }
        }
    }

    pub fn attackers(&self, depth: usize, sq: Square) -> &[ThreatEntry] {
        &self.slots[depth][sq.index()]
    }

    pub fn is_square_threatened(&self, depth: usize, sq: Square) -> bool {
        !self.slots[depth][sq.index()].is_empty()
    }

    pub fn is_square_threatened_by(&self, depth: usize, sq: Square, by: Colour) -> bool {
        self.slots[depth][sq.index()].iter().any(|e| e.piece.colour() == by)
    }

    /// A bitmask over piece kinds of the rook/bishop/queen attackers of
    /// `sq`, one bit per `Piece` index.
    pub fn sliders_targeting(&self, depth: usize, sq: Square) -> u16 {
        let mut mask = 0;
        for entry in &self.slots[depth][sq.index()] {
            if entry.piece.piece_type().is_slider() {
                mask |= 1 << entry.piece.index();
            }
        }
        mask
    }

    /// Is the king of `side` attacked at the current simulated depth?
    pub fn is_king_in_check(&self, board: &Board, side: Colour) -> bool {
        self.is_square_threatened_by(self.depth, board.king_square(side), side.flip())
    }

    /// The cheap mate test: in check, and every neighbouring square is
    /// either occupied by a friendly piece or also attacked. Interposals
    /// and checker capture are the search's business, not the map's.
    pub fn is_king_in_checkmate(&self, board: &Board, side: Colour) -> bool {
        let king_sq = board.king_square(side);
        let by = side.flip();
        if !self.is_square_threatened_by(self.depth, king_sq, by) {
            return false;
        }
        king_attacks(king_sq).iter().all(|neighbour| {
            board.colour_set(side).contains_square(neighbour)
                || self.is_square_threatened_by(self.depth, neighbour, by)
        })
    }
}
