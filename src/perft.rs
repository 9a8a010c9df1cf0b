use crate::{
    board::{movegen::MoveList, Board},
    chessmove::Move,
    piece::Colour,
    threats::ThreatMap,
};

/// Counts legal move paths of length `depth`, driving the same
/// apply / threat-update / reject / revert / undo cycle the search uses.
/// Any drift between the board, the generator and the threat map shows
/// up as a wrong number here long before it shows up in play.
pub fn perft(
    pos: &mut Board,
    threats: &mut ThreatMap,
    side: Colour,
    last_move: Option<Move>,
    depth: usize,
) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    pos.generate_moves(side, threats, last_move, &mut list);

    let mut count = 0;
    for m in list.iter() {
        let applied = pos.apply_move(m).expect("generator produced an unappliable move");
        threats.update(applied.get(), pos, false);
        if !threats.is_king_in_check(pos, side) {
            count += perft(pos, threats, side.flip(), Some(applied.get()), depth - 1);
        }
        threats.revert_state();
        pos.undo_move(applied);
    }
    count
}

/// Runs the counter from the starting position at each depth up to
/// `max_depth`, printing counts and timings.
pub fn run(max_depth: usize) {
    for depth in 1..=max_depth {
        let mut board = Board::new();
        let mut threats = ThreatMap::new(depth);
        threats.rebuild(&board);
        let start = std::time::Instant::now();
        let count = perft(&mut board, &mut threats, Colour::White, None, depth);
        println!("perft {depth}: {count} nodes in {:.2?}", start.elapsed());
    }
}
