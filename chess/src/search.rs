//! Minimax search with alpha-beta pruning

use crate::board::Board;
use crate::config::SearchConfig;
use crate::eval;
use crate::movegen;
use crate::moves::Move;
use crate::types::{Color, Coord};

use log::debug;
use thiserror::Error;

/// Error running a search
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SearchError {
    /// The color to move at the root has no legal moves, so there is nothing to choose from
    #[error("no legal moves for {}", .0.name())]
    NoLegalMoves(Color),
    /// Search depth must be at least one ply
    #[error("bad search depth {0}")]
    BadDepth(u32),
    /// The initial window is empty
    #[error("empty search window [{alpha}, {beta}]")]
    BadBounds { alpha: i32, beta: i32 },
    /// The color asked to move first at the root is not the side to move
    #[error("{} is not to move", .0.name())]
    NotToMove(Color),
}

/// Move chosen by the search, together with its score
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub mv: Move,
    pub score: i32,
}

impl SearchResult {
    #[inline]
    pub fn src(&self) -> Coord {
        self.mv.src()
    }

    #[inline]
    pub fn dst(&self) -> Coord {
        self.mv.dst()
    }
}

/// Counters of the last search
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of positions visited, including the root
    pub nodes: u64,
    /// Number of times the remaining siblings were skipped
    pub cutoffs: u64,
}

/// Depth-limited minimax searcher
///
/// The search walks the game tree by applying and reverting moves on the board itself, so the
/// board must not be touched by anyone else while the search runs. After the search, the board
/// is exactly the same as before.
///
/// Moves are examined in generation order, and a move replaces the current best one only if it
/// scores strictly better. So the search is deterministic, and ties go to the move found first.
#[derive(Debug, Default, Clone)]
pub struct Searcher {
    config: SearchConfig,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Searcher {
        Searcher {
            config,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the counters of the last search
    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Finds the best move for `side`
    ///
    /// Uses the configured depth and window. Fails with [`SearchError::NotToMove`] if `side` is
    /// not the color to move.
    pub fn best_move(&mut self, board: &mut Board, side: Color) -> Result<SearchResult, SearchError> {
        self.config.validate()?;
        let SearchConfig { depth, alpha, beta } = self.config;
        self.search_best_move(board, depth, alpha, beta, true, side)
    }

    /// Searches `depth` plies ahead and returns the best move at the root
    ///
    /// Scores are computed from the point of view of `side`. If `maximizing` is `true`, `side`
    /// moves first and the root picks the move with the highest score. Otherwise, the opponent of
    /// `side` moves first and the root picks the move with the lowest score. The color moving
    /// first must be the side to move on `board`.
    pub fn search_best_move(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        side: Color,
    ) -> Result<SearchResult, SearchError> {
        if depth == 0 {
            return Err(SearchError::BadDepth(depth));
        }
        let mover = if maximizing { side } else { side.inv() };
        if mover != board.side() {
            return Err(SearchError::NotToMove(mover));
        }
        self.stats = SearchStats {
            nodes: 1,
            cutoffs: 0,
        };

        let moves = movegen::legal::gen_for(board, mover);
        let mut best: Option<SearchResult> = None;
        for &mv in &moves {
            let entry = board.make_move_unchecked(mv);
            let score = self.alpha_beta(board, depth - 1, alpha, beta, !maximizing, side, mover.inv());
            board.unmake_move_unchecked(&entry);

            let improves = best.map_or(true, |b| {
                if maximizing {
                    score > b.score
                } else {
                    score < b.score
                }
            });
            if improves {
                best = Some(SearchResult { mv, score });
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        let res = best.ok_or(SearchError::NoLegalMoves(mover))?;
        debug!(
            "best move {} for {} scores {} ({} nodes, {} cutoffs)",
            res.mv,
            mover.name(),
            res.score,
            self.stats.nodes,
            self.stats.cutoffs,
        );
        Ok(res)
    }

    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        side: Color,
        mover: Color,
    ) -> i32 {
        self.stats.nodes += 1;
        if depth == 0 {
            return eval::evaluate(board, side);
        }

        let moves = movegen::legal::gen_for(board, mover);
        if moves.is_empty() {
            return eval::terminal(board, side, mover, depth);
        }

        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for &mv in &moves {
            let entry = board.make_move_unchecked(mv);
            let score = self.alpha_beta(board, depth - 1, alpha, beta, !maximizing, side, mover.inv());
            board.unmake_move_unchecked(&entry);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RawBoard;
    use crate::types::{Cell, Piece};

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn board(side: Color, pieces: &[(&str, Color, Piece)]) -> Board {
        let mut raw = RawBoard::empty();
        raw.side = side;
        for &(c, color, piece) in pieces {
            raw.put(coord(c), Cell::from_parts(color, piece));
        }
        raw.try_into().unwrap()
    }

    #[test]
    fn test_mate_in_one() {
        use Color::*;
        use Piece::*;
        // Back rank mate: Ra1-a8#
        let mut b = board(
            White,
            &[
                ("g1", White, King),
                ("a1", White, Rook),
                ("g8", Black, King),
                ("f7", Black, Pawn),
                ("g7", Black, Pawn),
                ("h7", Black, Pawn),
            ],
        );
        let before = b.clone();
        let mut searcher = Searcher::default();
        let res = searcher.best_move(&mut b, White).unwrap();
        assert_eq!(res.src(), coord("a1"));
        assert_eq!(res.dst(), coord("a8"));
        assert!(res.score > eval::MATE_SCORE);
        assert_eq!(b, before);
        assert!(searcher.stats().nodes > 1);
    }

    #[test]
    fn test_hanging_queen() {
        use Color::*;
        use Piece::*;
        let mut b = board(
            Black,
            &[
                ("a1", White, King),
                ("d4", White, Queen),
                ("h7", Black, King),
                ("d8", Black, Rook),
            ],
        );
        let res = Searcher::default().best_move(&mut b, Black).unwrap();
        assert_eq!(res.mv.to_string(), "d8d4");
        assert_eq!(
            res.mv.captured(),
            Some((Cell::from_parts(White, Queen), coord("d4")))
        );
        assert_eq!(b.side(), Black);
        assert!(b.move_log().is_empty());
        assert!(b.captives(White).is_empty());
    }

    #[test]
    fn test_no_moves() {
        use Color::*;
        use Piece::*;
        let mut b = board(
            Black,
            &[("f7", White, King), ("g6", White, Queen), ("h8", Black, King)],
        );
        assert_eq!(
            Searcher::default().best_move(&mut b, Black),
            Err(SearchError::NoLegalMoves(Black))
        );
    }

    #[test]
    fn test_bad_config() {
        let mut b = Board::initial();
        let mut searcher = Searcher::new(SearchConfig::default().with_depth(0));
        assert_eq!(
            searcher.best_move(&mut b, Color::White),
            Err(SearchError::BadDepth(0))
        );
        assert_eq!(
            Searcher::default().search_best_move(&mut b, 0, -1, 1, true, Color::White),
            Err(SearchError::BadDepth(0))
        );
    }

    #[test]
    fn test_wrong_side() {
        let mut b = Board::initial();
        assert_eq!(
            Searcher::default().best_move(&mut b, Color::Black),
            Err(SearchError::NotToMove(Color::Black))
        );
        // Minimizing for Black means White moves first, which is fine
        let res = Searcher::new(SearchConfig::default().with_depth(1))
            .search_best_move(&mut b, 1, -100_000, 100_000, false, Color::Black)
            .unwrap();
        assert_eq!(res.mv.color(), Color::White);
        let res = Searcher::default().search_best_move(
            &mut b,
            2,
            -100_000,
            100_000,
            false,
            Color::White,
        );
        assert_eq!(res, Err(SearchError::NotToMove(Color::Black)));
        assert_eq!(b, Board::initial());
    }

    #[test]
    fn test_deterministic() {
        let mut b = Board::initial();
        let mut searcher = Searcher::new(SearchConfig::default().with_depth(2));
        let first = searcher.best_move(&mut b, Color::White).unwrap();
        let second = searcher.best_move(&mut b, Color::White).unwrap();
        assert_eq!(first, second);
        // All moves score the same at this depth, so the first generated one wins
        assert_eq!(first.score, 0);
        assert_eq!(first.mv, b.legal_moves()[0]);
        assert_eq!(b, Board::initial());
    }

    #[test]
    fn test_minimizing_root() {
        use Color::*;
        use Piece::*;
        // White asks what Black, moving first, will do to it
        let mut b = board(
            Black,
            &[
                ("a1", White, King),
                ("d4", White, Queen),
                ("h7", Black, King),
                ("d8", Black, Rook),
            ],
        );
        let res = Searcher::default()
            .search_best_move(&mut b, 1, -100_000, 100_000, false, White)
            .unwrap();
        assert_eq!(res.mv.to_string(), "d8d4");
        assert_eq!(res.score, -500);
    }
}
