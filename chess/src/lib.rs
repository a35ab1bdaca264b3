//! # Kingside
//!
//! Kingside is a two-player chess rules engine with a small minimax search on top of it.
//!
//! It keeps the authoritative game state, generates legal moves (including castling, en passant
//! and promotions), detects checkmate and stalemate, records a reversible move history and picks
//! moves for an automated player using a depth-limited alpha-beta search.
//!
//! # Example
//!
//! ```
//! use kingside::{Board, Color, GameStatus, Searcher};
//!
//! let mut board = Board::initial();
//!
//! // Play 1. e4 using coordinates
//! let e2 = "e2".parse().unwrap();
//! let e4 = "e4".parse().unwrap();
//! board.apply_coords(e2, e4, true).unwrap();
//! assert_eq!(board.whose_turn(), Color::Black);
//!
//! // Let the engine answer for Black
//! let mut searcher = Searcher::default();
//! let found = searcher.best_move(&mut board, Color::Black).unwrap();
//! board.apply_move(found.mv, true).unwrap();
//!
//! assert_eq!(board.status(), GameStatus::Ongoing);
//! assert_eq!(board.move_log().len(), 2);
//!
//! // Take back the engine's move
//! assert_eq!(board.undo_last_move(), Some(found.mv));
//! ```

pub mod board;
pub mod config;
pub mod eval;
pub mod movegen;
pub mod moves;
pub mod search;

mod castling;

pub use kingside_base::bitboard;
pub use kingside_base::geometry;
pub use kingside_base::types;

pub use bitboard::Bitboard;
pub use board::{Board, PrettyStyle, RawBoard};
pub use config::{GameConfig, SearchConfig};
pub use movegen::MoveList;
pub use moves::{IllegalMoveError, LogEntry, Move, MoveKind, PromotePiece};
pub use search::{SearchError, SearchResult, Searcher};
pub use types::{
    CastlingRights, CastlingSide, Cell, Color, Coord, File, GameStatus, OutOfBoundsError, Piece,
    Rank,
};
