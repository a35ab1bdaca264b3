// The engine plays against itself until the game ends
//
// Usage: self_play [DEPTH] [MAX_PLIES]
//
// Set `RUST_LOG=debug` to see what the search and the board are doing.

use kingside::{board::PrettyStyle, Board, Piece, SearchConfig, Searcher};
use log::{debug, info};
use std::env;

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let depth = args
        .next()
        .map(|s| s.parse().expect("bad depth"))
        .unwrap_or(kingside::config::DEFAULT_DEPTH);
    let max_plies: usize = args
        .next()
        .map(|s| s.parse().expect("bad ply limit"))
        .unwrap_or(200);

    let mut board = Board::initial();
    let mut searcher = Searcher::new(SearchConfig::default().with_depth(depth));
    let mut knight_moves = 0;

    for ply in 1..=max_plies {
        let side = board.whose_turn();
        let res = match searcher.best_move(&mut board, side) {
            Ok(res) => res,
            Err(e) => {
                info!("search stopped: {}", e);
                break;
            }
        };

        if res.mv.piece().piece() == Some(Piece::Knight) {
            knight_moves += 1;
            debug!("knight moved from {} to {}", res.src(), res.dst());
        }
        info!(
            "move {}: {} plays {} (score {}, {} nodes)",
            ply,
            side.name(),
            res.mv,
            res.score,
            searcher.stats().nodes
        );

        board.apply_move(res.mv, true).expect("search returned illegal move");
        println!("{}. {} {}", ply, side.name(), res.mv);
        println!("{}", board.pretty(PrettyStyle::Utf8));

        let status = board.status();
        if status.is_finished() {
            println!("Game over: {}", status);
            break;
        }
    }

    let captured: Vec<_> = board
        .captives(kingside::Color::White)
        .iter()
        .chain(board.captives(kingside::Color::Black))
        .map(|p| p.name())
        .collect();
    println!("Moves played: {}", board.move_log().len());
    println!("Captured: {}", captured.join(", "));
    info!("total knight moves: {}", knight_moves);
}
