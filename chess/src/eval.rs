//! Static evaluation
//!
//! Positions are scored by material balance only. Scores are always given from the point of
//! view of some fixed color, so larger is better for that color.

use crate::board::Board;
use crate::types::{Color, Piece};

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 300;
pub const BISHOP_VALUE: i32 = 300;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

/// Base score of a checkmate
///
/// Stays well inside the default search window, so mate scores are never confused with
/// the infinite bounds.
pub const MATE_SCORE: i32 = 50_000;

/// Returns the material value of piece `p`
///
/// The king is never captured, so it is worth nothing.
#[inline]
pub const fn piece_value(p: Piece) -> i32 {
    match p {
        Piece::Pawn => PAWN_VALUE,
        Piece::King => 0,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
    }
}

/// Returns the total value of the pieces of color `c`
pub fn material(b: &Board, c: Color) -> i32 {
    b.color(c)
        .into_iter()
        .filter_map(|coord| b.get(coord).piece())
        .map(piece_value)
        .sum()
}

/// Returns the material balance from the point of view of `side`
#[inline]
pub fn evaluate(b: &Board, side: Color) -> i32 {
    material(b, side) - material(b, side.inv())
}

/// Scores a position in which `mover` has no legal moves, from the point of view of `side`
///
/// A checkmate found with more plies left to search scores further from zero, so the search
/// prefers faster mates and slower losses. Stalemate is a draw.
pub fn terminal(b: &Board, side: Color, mover: Color, depth: u32) -> i32 {
    let in_check = b
        .king_pos(mover)
        .map_or(false, |k| b.is_attacked(k, mover.inv()));
    if !in_check {
        return 0;
    }
    let mated = MATE_SCORE + depth as i32;
    if mover == side {
        -mated
    } else {
        mated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RawBoard;
    use crate::types::{Cell, Coord};

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_initial_balance() {
        let b = Board::initial();
        assert_eq!(
            material(&b, Color::White),
            8 * PAWN_VALUE + 2 * (KNIGHT_VALUE + BISHOP_VALUE + ROOK_VALUE) + QUEEN_VALUE
        );
        assert_eq!(material(&b, Color::White), 3900);
        assert_eq!(evaluate(&b, Color::White), 0);
        assert_eq!(evaluate(&b, Color::Black), 0);
    }

    #[test]
    fn test_missing_queen() {
        let mut raw = RawBoard::initial();
        raw.put(coord("d8"), Cell::EMPTY);
        let b: Board = raw.try_into().unwrap();
        assert_eq!(evaluate(&b, Color::White), QUEEN_VALUE);
        assert_eq!(evaluate(&b, Color::Black), -QUEEN_VALUE);
        assert_eq!(b.material(Color::Black), 3000);
    }

    #[test]
    fn test_terminal() {
        use crate::types::Piece::*;
        let mut raw = RawBoard::empty();
        raw.put(coord("f7"), Cell::from_parts(Color::White, King));
        raw.put(coord("g7"), Cell::from_parts(Color::White, Queen));
        raw.put(coord("h8"), Cell::from_parts(Color::Black, King));
        raw.side = Color::Black;
        let b: Board = raw.try_into().unwrap();
        assert_eq!(terminal(&b, Color::White, Color::Black, 2), MATE_SCORE + 2);
        assert_eq!(terminal(&b, Color::Black, Color::Black, 0), -MATE_SCORE);

        raw.put(coord("g7"), Cell::EMPTY);
        raw.put(coord("g6"), Cell::from_parts(Color::White, Queen));
        let b: Board = raw.try_into().unwrap();
        assert_eq!(terminal(&b, Color::White, Color::Black, 2), 0);
    }
}
