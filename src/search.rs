use crate::{
    board::{movegen::MoveList, Board},
    chessmove::Move,
    evaluation::{evaluate_relative, mated_in, DRAW_SCORE, INFINITY},
    piece::Colour,
    searchinfo::SearchInfo,
    threats::ThreatMap,
};

/// Searches the root position to `depth` plies and returns the score
/// from the mover's point of view together with the chosen move. `None`
/// means the mover has no legal move at all: mate or stalemate, told
/// apart by the score.
pub fn search_root(
    pos: &mut Board,
    threats: &mut ThreatMap,
    info: &mut SearchInfo,
    depth: usize,
    side: Colour,
    last_move: Option<Move>,
) -> (i32, Option<Move>) {
    debug_assert_eq!(threats.depth(), 0, "search must start from the real position");
    info.clear_for_search();
    let score = alpha_beta(pos, threats, info, depth, 0, side, -INFINITY, INFINITY, last_move);
    (score, info.best_move)
}

/// Negamax with alpha-beta pruning. Each candidate is applied, folded
/// into the threat map one simulated ply deeper, rejected outright if it
/// leaves the mover's own king attacked, and otherwise searched with the
/// negated window. Application and threat state are rolled back before
/// the next candidate, so the position is byte-identical between
/// siblings.
#[allow(clippy::too_many_arguments)]
fn alpha_beta(
    pos: &mut Board,
    threats: &mut ThreatMap,
    info: &mut SearchInfo,
    depth: usize,
    ply: usize,
    side: Colour,
    mut alpha: i32,
    beta: i32,
    last_move: Option<Move>,
) -> i32 {
    #[cfg(debug_assertions)]
    pos.check_coherence().unwrap();

    info.nodes += 1;

    if depth == 0 {
        return evaluate_relative(pos, side);
    }

    let mut move_list = MoveList::new();
    pos.generate_moves(side, threats, last_move, &mut move_list);
    move_list.sort();

    let mut best = -INFINITY;
    let mut moves_made = 0u32;

    for m in move_list.iter() {
        let applied = pos
            .apply_move(m)
            .expect("generator produced an unappliable move");
        threats.update(applied.get(), pos, false);

        // full legality lives here: a move that leaves the mover's own
        // king attacked is taken back and skipped.
        if threats.is_king_in_check(pos, side) {
            threats.revert_state();
            pos.undo_move(applied);
            continue;
        }
        moves_made += 1;

        let value = -alpha_beta(
            pos,
            threats,
            info,
            depth - 1,
            ply + 1,
            side.flip(),
            -beta,
            -alpha,
            Some(applied.get()),
        );

        threats.revert_state();
        pos.undo_move(applied);

        if value > best {
            best = value;
            if ply == 0 {
                info.best_move = Some(m);
            }
        }
        if value > alpha {
            alpha = value;
        }
        if alpha >= beta {
            info.failhigh += 1;
            if moves_made == 1 {
                info.failhigh_first += 1;
            }
            break;
        }
    }

    if moves_made == 0 {
        // no legal move: checkmate scores by distance from the root,
        // stalemate is dead level.
        return if threats.is_king_in_check(pos, side) { mated_in(ply) } else { DRAW_SCORE };
    }

    best
}
