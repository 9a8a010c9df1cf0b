use crate::{
    piece::Colour,
    squareset::SquareSet,
    util::Square,
};

/// Implements a C-style for loop, for use in const fn.
#[macro_export]
macro_rules! cfor {
    ($init: stmt; $cond: expr; $step: expr; $body: block) => {
        {
            $init
            #[allow(while_true)]
            while $cond {
                $body;

                $step;
            }
        }
    }
}

/// File and rank steps for the four cardinal directions.
pub static ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
/// File and rank steps for the four diagonals.
pub static BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
/// Union of the rook and bishop directions.
pub static QUEEN_DIRS: [(i8, i8); 8] =
    [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];

const fn init_jumping_attacks<const IS_KNIGHT: bool>() -> [u64; 64] {
    let mut attacks = [0; 64];
    let deltas: &[i8; 8] =
        if IS_KNIGHT { &[17, 15, 10, 6, -17, -15, -10, -6] } else { &[9, 8, 7, 1, -9, -8, -7, -1] };
    cfor!(let mut sq = 0; sq < 64; sq += 1; {
        let mut attacks_bb = 0u64;
        cfor!(let mut idx = 0; idx < 8; idx += 1; {
            let attacked_sq = sq + deltas[idx] as i64;
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            if 0 <= attacked_sq
                && attacked_sq < 64
                && Square::distance(Square::new(sq as u8), Square::new(attacked_sq as u8)) <= 2
            {
                attacks_bb |= 1 << attacked_sq;
            }
        });
        #[allow(clippy::cast_sign_loss)]
        { attacks[sq as usize] = attacks_bb; }
    });
    attacks
}

const fn init_pawn_attacks() -> [[u64; 64]; 2] {
    let mut attacks = [[0; 64]; 2];
    cfor!(let mut sq = 0u8; sq < 64; sq += 1; {
        let file = sq % 8;
        let rank = sq / 8;
        let mut white = 0u64;
        let mut black = 0u64;
        if rank < 7 {
            if file > 0 {
                white |= 1 << (sq + 7);
            }
            if file < 7 {
                white |= 1 << (sq + 9);
            }
        }
        if rank > 0 {
            if file > 0 {
                black |= 1 << (sq - 9);
            }
            if file < 7 {
                black |= 1 << (sq - 7);
            }
        }
        attacks[0][sq as usize] = white;
        attacks[1][sq as usize] = black;
    });
    attacks
}

static KNIGHT_ATTACKS: [u64; 64] = init_jumping_attacks::<true>();
static KING_ATTACKS: [u64; 64] = init_jumping_attacks::<false>();
static PAWN_ATTACKS: [[u64; 64]; 2] = init_pawn_attacks();

pub fn knight_attacks(sq: Square) -> SquareSet {
    SquareSet::from_inner(KNIGHT_ATTACKS[sq.index()])
}

pub fn king_attacks(sq: Square) -> SquareSet {
    SquareSet::from_inner(KING_ATTACKS[sq.index()])
}

/// The two forward-diagonal squares a pawn of the given colour strikes.
pub fn pawn_attacks(colour: Colour, sq: Square) -> SquareSet {
    SquareSet::from_inner(PAWN_ATTACKS[colour.index()][sq.index()])
}

/// Walks outward from `sq` along each direction, accumulating squares
/// until the edge of the board. The first occupied square along a ray is
/// included, and the walk stops there.
pub fn ray_attacks(sq: Square, occupied: SquareSet, dirs: &[(i8, i8)]) -> SquareSet {
    #![allow(clippy::cast_possible_wrap)]
    let mut attacks = SquareSet::EMPTY;
    for &(file_step, rank_step) in dirs {
        let mut file = sq.file() as i8 + file_step;
        let mut rank = sq.rank() as i8 + rank_step;
        while (0..8).contains(&file) && (0..8).contains(&rank) {
            #[allow(clippy::cast_sign_loss)]
            let target = Square::from_rank_file(rank as u8, file as u8);
            attacks = attacks.add_square(target);
            if occupied.contains_square(target) {
                break;
            }
            file += file_step;
            rank += rank_step;
        }
    }
    attacks
}
