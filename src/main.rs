#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_const_for_fn)]

//! Natrix, a classical chess engine: bitboard position, per-square
//! threat map, and alpha-beta search over piece-square evaluation.

mod board;
mod chessmove;
mod errors;
mod evaluation;
mod lookups;
mod perft;
mod piece;
mod piecesquaretable;
mod repl;
mod san;
mod search;
mod searchinfo;
mod squareset;
mod threats;
mod util;

use clap::Parser;

/// The name of the engine.
pub static NAME: &str = "Natrix";
/// The version of the engine.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "natrix", about = "A classical chess engine with a threat map.")]
struct Cli {
    /// Plies the engine looks ahead.
    #[arg(long, default_value_t = util::SEARCH_DEPTH)]
    depth: usize,

    #[command(subcommand)]
    subcommand: Option<Subcommands>,
}

#[derive(clap::Subcommand)]
enum Subcommands {
    /// Count legal move paths from the starting position.
    Perft {
        /// Maximum depth to count to.
        depth: usize,
    },
    /// Search a fixed set of positions and report node throughput.
    Bench,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.subcommand {
        Some(Subcommands::Perft { depth }) => {
            perft::run(depth);
            Ok(())
        }
        Some(Subcommands::Bench) => repl::bench(cli.depth),
        None => repl::main_loop(cli.depth),
    }
}
