//! The interactive prompt loop. The user drives white from stdin in the
//! accepted algebraic subset; the engine answers for black.

use std::io::{self, BufRead};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::{
    board::Board,
    chessmove::{Move, MoveFlags},
    piece::Colour,
    san,
    search::search_root,
    searchinfo::SearchInfo,
    threats::ThreatMap,
};

pub fn main_loop(depth: usize) -> Result<()> {
    println!("{} {}", crate::NAME, crate::VERSION);
    println!("you play white. moves like e4, Nf3, exd5, e8=Q; also: new, eval, quit");

    let depth = depth.max(1);
    let mut board = Board::new();
    let mut threats = ThreatMap::new(depth);
    threats.rebuild(&board);
    let mut info = SearchInfo::new();
    let mut last_move: Option<Move> = None;

    println!("{board}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading a move from stdin")?;
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "new" => {
                board = Board::new();
                threats.rebuild(&board);
                last_move = None;
                println!("{board}");
                continue;
            }
            "eval" => {
                println!("static value: {}", board.value());
                continue;
            }
            _ => {}
        }

        if let Some(name) = line.strip_prefix("threats ") {
            match crate::util::Square::from_name(name.trim()) {
                Some(sq) if threats.is_square_threatened(0, sq) => {
                    for entry in threats.attackers(0, sq) {
                        println!("{} on {} attacks {sq}", entry.piece, entry.square);
                    }
                }
                Some(sq) => println!("nothing attacks {sq}"),
                None => println!("rejected: no square named {name:?}"),
            }
            continue;
        }

        let user_move = match san::parse_move(&board, &threats, Colour::White, last_move, line) {
            Ok(m) => m,
            Err(err) => {
                println!("rejected: {err}");
                continue;
            }
        };
        let applied = match board.apply_move(user_move) {
            Ok(applied) => applied,
            Err(err) => {
                println!("rejected: {err}");
                continue;
            }
        };
        threats.update(applied.get(), &board, true);
        if threats.is_king_in_check(&board, Colour::White) {
            board.undo_move(applied);
            threats.rebuild(&board);
            println!("rejected: that leaves your king in check");
            continue;
        }
        last_move = Some(applied.get());
        println!("{board}");

        if !engine_reply(&mut board, &mut threats, &mut info, depth, &mut last_move)? {
            break;
        }
    }
    Ok(())
}

/// Searches and plays black's answer. Returns false when the game is
/// over.
fn engine_reply(
    board: &mut Board,
    threats: &mut ThreatMap,
    info: &mut SearchInfo,
    depth: usize,
    last_move: &mut Option<Move>,
) -> Result<bool> {
    let start = Instant::now();
    let (score, reply) = search_root(board, threats, info, depth, Colour::Black, *last_move);
    let elapsed = start.elapsed();

    let Some(mut reply) = reply else {
        if threats.is_king_in_check(board, Colour::Black) {
            println!("checkmate, you win");
        } else {
            println!("stalemate");
        }
        return Ok(false);
    };

    let applied = board.apply_move(reply).expect("search returned an unappliable move");
    threats.update(applied.get(), board, true);
    *last_move = Some(applied.get());

    if threats.is_king_in_checkmate(board, Colour::White) {
        reply.flags.insert(MoveFlags::MATE);
    } else if threats.is_king_in_check(board, Colour::White) {
        reply.flags.insert(MoveFlags::CHECK);
    }

    println!(
        "engine plays {} ({}), score {}, {} nodes in {:.2?}",
        reply,
        san::format_move(reply),
        score,
        info.nodes,
        elapsed,
    );
    if crate::evaluation::is_mate_score(score) {
        if score > 0 {
            println!("engine announces mate in {} plies", crate::evaluation::MATE_SCORE - score);
        } else {
            println!("engine is getting mated in {} plies", score + crate::evaluation::MATE_SCORE);
        }
    }
    if reply.flags.contains(MoveFlags::MATE) {
        println!("checkmate");
        println!("{board}");
        return Ok(false);
    }
    if reply.flags.contains(MoveFlags::CHECK) {
        println!("check");
    }
    println!("{board}");
    Ok(true)
}

/// Fixed-position throughput measurement.
pub fn bench(depth: usize) -> Result<()> {
    use crate::{piece::Piece, util::Square};

    let depth = depth.max(1);
    let positions: Vec<(&str, Board, Colour)> = vec![
        ("startpos", Board::new(), Colour::White),
        (
            "open centre",
            {
                let mut board = Board::new();
                let mut threats = ThreatMap::new(1);
                threats.rebuild(&board);
                let mut last = None;
                let opening = [
                    (Colour::White, "e4"),
                    (Colour::Black, "e5"),
                    (Colour::White, "Nf3"),
                    (Colour::Black, "Nc6"),
                ];
                for (side, text) in opening {
                    let m = san::parse_move(&board, &threats, side, last, text)
                        .expect("bench opening must parse");
                    let applied = board.apply_move(m).expect("bench opening must apply");
                    threats.update(applied.get(), &board, true);
                    last = Some(applied.get());
                }
                board
            },
            Colour::White,
        ),
        (
            "rook endgame",
            Board::from_pieces(&[
                (Piece::WK, Square::from_name("g2").unwrap()),
                (Piece::WR, Square::from_name("d1").unwrap()),
                (Piece::WP, Square::from_name("a4").unwrap()),
                (Piece::BK, Square::from_name("g7").unwrap()),
                (Piece::BR, Square::from_name("e8").unwrap()),
                (Piece::BP, Square::from_name("h5").unwrap()),
            ]),
            Colour::White,
        ),
    ];

    let mut total_nodes = 0;
    let start = Instant::now();
    for (name, mut board, side) in positions {
        let mut threats = ThreatMap::new(depth);
        threats.rebuild(&board);
        let mut info = SearchInfo::new();
        let position_start = Instant::now();
        let (score, best) = search_root(&mut board, &mut threats, &mut info, depth, side, None);
        let best = best.map_or_else(|| "none".into(), san::format_move);
        println!(
            "{name}: best {best} score {score} nodes {} in {:.2?} (ordering {:.2})",
            info.nodes,
            position_start.elapsed(),
            info.ordering_quality(),
        );
        total_nodes += info.nodes;
    }
    let elapsed = start.elapsed();
    #[allow(clippy::cast_precision_loss)]
    let nps = total_nodes as f64 / elapsed.as_secs_f64();
    println!("total {total_nodes} nodes in {elapsed:.2?} ({nps:.0} nodes/sec)");
    Ok(())
}
