use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{CastlingSide, Color, Coord, File};

const fn on_back_rank(c: Color, x: u64) -> Bitboard {
    Bitboard::from_raw(match c {
        Color::White => x << 56,
        Color::Black => x,
    })
}

/// Squares between the king and the rook, which must be empty to castle
#[inline]
pub const fn pass(c: Color, s: CastlingSide) -> Bitboard {
    on_back_rank(
        c,
        match s {
            CastlingSide::King => 0x60,
            CastlingSide::Queen => 0x0e,
        },
    )
}

/// Initial squares of the king and the rook
///
/// A move from or to any of these squares loses the corresponding castling right.
#[inline]
pub const fn srcs(c: Color, s: CastlingSide) -> Bitboard {
    on_back_rank(
        c,
        match s {
            CastlingSide::King => 0x90,
            CastlingSide::Queen => 0x11,
        },
    )
}

pub const ALL_SRCS: Bitboard = Bitboard::from_raw(0x91 | (0x91 << 56));

#[inline]
pub const fn king_src(c: Color) -> Coord {
    Coord::from_parts(File::E, geometry::castling_rank(c))
}

/// Square the king passes over on its way, which must not be attacked
#[inline]
pub const fn king_transit(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

#[inline]
pub const fn king_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

/// Source and destination of the rook
#[inline]
pub const fn rook_move(c: Color, s: CastlingSide) -> (Coord, Coord) {
    let rank = geometry::castling_rank(c);
    match s {
        CastlingSide::King => (
            Coord::from_parts(File::H, rank),
            Coord::from_parts(File::F, rank),
        ),
        CastlingSide::Queen => (
            Coord::from_parts(File::A, rank),
            Coord::from_parts(File::D, rank),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        for c in [Color::White, Color::Black] {
            for s in [CastlingSide::King, CastlingSide::Queen] {
                let (rook_src, rook_dst) = rook_move(c, s);
                assert!(srcs(c, s).has(king_src(c)));
                assert!(srcs(c, s).has(rook_src));
                assert!(pass(c, s).has(rook_dst));
                assert!(pass(c, s).has(king_transit(c, s)));
                assert!(pass(c, s).has(king_dst(c, s)));
                assert!((pass(c, s) & srcs(c, s)).is_empty());
                assert_eq!(srcs(c, s) & ALL_SRCS, srcs(c, s));
            }
        }
        assert_eq!(pass(Color::White, CastlingSide::Queen).len(), 3);
        assert_eq!(pass(Color::Black, CastlingSide::King).len(), 2);
    }
}
