//! Moves and their application to the board

use crate::bitboard::Bitboard;
use crate::board::Position;
use crate::castling;
use crate::geometry;
use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, Piece};

use std::fmt;

use thiserror::Error;

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl From<PromotePiece> for Piece {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => Piece::Knight,
            PromotePiece::Bishop => Piece::Bishop,
            PromotePiece::Rook => Piece::Rook,
            PromotePiece::Queen => Piece::Queen,
        }
    }
}

impl TryFrom<Piece> for PromotePiece {
    type Error = ();

    #[inline]
    fn try_from(p: Piece) -> Result<Self, Self::Error> {
        match p {
            Piece::Knight => Ok(PromotePiece::Knight),
            Piece::Bishop => Ok(PromotePiece::Bishop),
            Piece::Rook => Ok(PromotePiece::Rook),
            Piece::Queen => Ok(PromotePiece::Queen),
            _ => Err(()),
        }
    }
}

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Non-pawn move or capture (except castling)
    Simple,
    /// Single pawn step, either non-capture or capture, without promotion
    PawnSimple,
    /// Pawn advancing two squares from its initial rank
    PawnDouble,
    /// Pawn capturing en passant
    Enpassant,
    /// Kingside castling
    CastlingKingside,
    /// Queenside castling
    CastlingQueenside,
    /// Pawn reaching the last rank, either non-capture or capture
    Promote(PromotePiece),
}

impl MoveKind {
    /// Returns the piece after promote if this move kind represents a promote
    #[inline]
    pub fn promote(self) -> Option<Piece> {
        match self {
            MoveKind::Promote(p) => Some(p.into()),
            _ => None,
        }
    }
}

impl From<CastlingSide> for MoveKind {
    #[inline]
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => Self::CastlingKingside,
            CastlingSide::Queen => Self::CastlingQueenside,
        }
    }
}

impl TryFrom<MoveKind> for CastlingSide {
    type Error = ();

    #[inline]
    fn try_from(kind: MoveKind) -> Result<Self, Self::Error> {
        match kind {
            MoveKind::CastlingKingside => Ok(Self::King),
            MoveKind::CastlingQueenside => Ok(Self::Queen),
            _ => Err(()),
        }
    }
}

/// Chess move
///
/// A move remembers everything needed to apply and to take it back: its source and destination,
/// the piece being moved and the piece being captured together with the square it stands on.
/// The captured square differs from the destination only for en passant.
///
/// Moves are only created by the move generator, so any move obtained from a [`Board`](crate::Board)
/// is legal in the position it was generated for. Applying it to some other position is rejected
/// by [`Board::apply_move()`](crate::Board::apply_move).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    src: Coord,
    dst: Coord,
    piece: Cell,
    captured: Option<(Cell, Coord)>,
}

impl Move {
    #[inline]
    pub(crate) const fn new_unchecked(
        kind: MoveKind,
        src: Coord,
        dst: Coord,
        piece: Cell,
        captured: Option<(Cell, Coord)>,
    ) -> Move {
        Move {
            kind,
            src,
            dst,
            piece,
            captured,
        }
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    /// Returns the moved piece, as it stood on the source square
    #[inline]
    pub const fn piece(&self) -> Cell {
        self.piece
    }

    /// Returns the color of the side making this move
    #[inline]
    pub fn color(&self) -> Color {
        self.piece.color().unwrap_or(Color::White)
    }

    /// Returns the captured piece and the square it is captured on
    #[inline]
    pub const fn captured(&self) -> Option<(Cell, Coord)> {
        self.captured
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns the piece standing on the destination square after the move
    pub fn landed(&self) -> Cell {
        match self.kind.promote() {
            Some(p) => Cell::from_parts(self.color(), p),
            None => self.piece,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.kind.promote() {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

/// History record of an applied move
///
/// Besides the move itself, it keeps the state which cannot be recomputed after the move is made,
/// so the move can be taken back exactly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LogEntry {
    mv: Move,
    castling: CastlingRights,
    ep_target: Option<Coord>,
    side: Color,
}

impl LogEntry {
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Castling rights before the move
    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// En passant target square before the move
    #[inline]
    pub fn ep_target(&self) -> Option<Coord> {
        self.ep_target
    }

    /// Side to move before the move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }
}

/// Error indicating that a move cannot be applied
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum IllegalMoveError {
    /// The move is not produced by the legal move generator in this position
    #[error("move {0} is not legal")]
    NotLegal(Move),
    /// There is no legal move between the given squares
    #[error("no legal move from {src} to {dst}")]
    NoSuchMove { src: Coord, dst: Coord },
    /// The move to take back is not the last unlogged move made on this board
    #[error("move {0} is not the last one to take back")]
    NotLast(Move),
}

fn update_castling(p: &mut Position, change: Bitboard) {
    if (change & castling::ALL_SRCS).is_empty() {
        return;
    }

    for (c, s) in [
        (Color::White, CastlingSide::Queen),
        (Color::White, CastlingSide::King),
        (Color::Black, CastlingSide::Queen),
        (Color::Black, CastlingSide::King),
    ] {
        if (change & castling::srcs(c, s)).is_nonempty() {
            p.r.castling.unset(c, s);
        }
    }
}

fn relocate(p: &mut Position, src: Coord, dst: Coord) {
    let cell = p.get(src);
    p.put(src, Cell::EMPTY);
    p.put(dst, cell);
}

/// Applies the move without checking its legality
///
/// The move is made by the color of the moved piece, which becomes the side not to move.
pub(crate) fn make_move_unchecked(p: &mut Position, mv: Move) -> LogEntry {
    let color = mv.color();
    let undo = LogEntry {
        mv,
        castling: p.r.castling,
        ep_target: p.r.ep_target,
        side: p.r.side,
    };

    let mut change = Bitboard::from_coord(mv.src) | Bitboard::from_coord(mv.dst);
    p.r.ep_target = None;
    if let Some((_, at)) = mv.captured {
        p.put(at, Cell::EMPTY);
        change.set(at);
    }

    match mv.kind {
        MoveKind::Simple | MoveKind::PawnSimple | MoveKind::Enpassant => {
            relocate(p, mv.src, mv.dst);
        }
        MoveKind::PawnDouble => {
            relocate(p, mv.src, mv.dst);
            p.r.ep_target = mv.src.offset(geometry::pawn_forward(color), 0);
        }
        MoveKind::CastlingKingside | MoveKind::CastlingQueenside => {
            let side = match mv.kind {
                MoveKind::CastlingKingside => CastlingSide::King,
                _ => CastlingSide::Queen,
            };
            let (rook_src, rook_dst) = castling::rook_move(color, side);
            relocate(p, mv.src, mv.dst);
            relocate(p, rook_src, rook_dst);
        }
        MoveKind::Promote(piece) => {
            p.put(mv.src, Cell::EMPTY);
            p.put(mv.dst, Cell::from_parts(color, piece.into()));
        }
    }

    update_castling(p, change);
    p.r.side = color.inv();
    undo
}

/// Takes back the move described by `u`
///
/// `u` must describe the last move applied to `p`.
pub(crate) fn unmake_move_unchecked(p: &mut Position, u: &LogEntry) {
    let mv = u.mv;
    match mv.kind {
        MoveKind::CastlingKingside | MoveKind::CastlingQueenside => {
            let side = match mv.kind {
                MoveKind::CastlingKingside => CastlingSide::King,
                _ => CastlingSide::Queen,
            };
            let (rook_src, rook_dst) = castling::rook_move(mv.color(), side);
            relocate(p, rook_dst, rook_src);
            relocate(p, mv.dst, mv.src);
        }
        _ => {
            p.put(mv.dst, Cell::EMPTY);
            p.put(mv.src, mv.piece);
        }
    }
    if let Some((cell, at)) = mv.captured {
        p.put(at, cell);
    }

    p.r.castling = u.castling;
    p.r.ep_target = u.ep_target;
    p.r.side = u.side;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, RawBoard};
    use crate::types::{File, Rank};

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn find(b: &Board, src: &str, dst: &str) -> Move {
        b.find_move(coord(src), coord(dst)).unwrap()
    }

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        let mv = find(&b, "g1", "f3");
        assert_eq!(mv.kind(), MoveKind::Simple);
        assert_eq!(mv.piece(), Cell::from_parts(Color::White, Piece::Knight));
        assert_eq!(mv.captured(), None);
        assert_eq!(mv.to_string(), "g1f3");

        let u = make_move_unchecked(&mut b.pos, mv);
        assert_eq!(b.get(coord("g1")), Cell::EMPTY);
        assert_eq!(b.get(coord("f3")), mv.piece());
        assert_eq!(b.side(), Color::Black);
        assert!(b.color(Color::White).has(coord("f3")));
        assert!(!b.color(Color::White).has(coord("g1")));

        unmake_move_unchecked(&mut b.pos, &u);
        assert_eq!(b, Board::initial());
    }

    #[test]
    fn test_pawn_double() {
        let mut b = Board::initial();
        let mv = find(&b, "e2", "e4");
        assert_eq!(mv.kind(), MoveKind::PawnDouble);
        let u = make_move_unchecked(&mut b.pos, mv);
        assert_eq!(b.en_passant_target(), Some(coord("e3")));
        assert_eq!(u.ep_target(), None);
        assert_eq!(u.side(), Color::White);
        unmake_move_unchecked(&mut b.pos, &u);
        assert_eq!(b.en_passant_target(), None);
    }

    #[test]
    fn test_castling_rights() {
        let mut raw = RawBoard::empty();
        raw.castling = CastlingRights::FULL;
        raw.put2(File::E, Rank::R1, Cell::from_parts(Color::White, Piece::King));
        raw.put2(File::A, Rank::R1, Cell::from_parts(Color::White, Piece::Rook));
        raw.put2(File::H, Rank::R1, Cell::from_parts(Color::White, Piece::Rook));
        raw.put2(File::E, Rank::R8, Cell::from_parts(Color::Black, Piece::King));
        raw.put2(File::H, Rank::R8, Cell::from_parts(Color::Black, Piece::Rook));
        let mut b: Board = raw.try_into().unwrap();
        assert_eq!(b.castling().to_string(), "KQk");

        // Rook takes rook on its home square: both sides lose the kingside right
        let mv = find(&b, "h1", "h8");
        assert_eq!(
            mv.captured(),
            Some((Cell::from_parts(Color::Black, Piece::Rook), coord("h8")))
        );
        let u = make_move_unchecked(&mut b.pos, mv);
        assert_eq!(b.castling().to_string(), "Q");
        unmake_move_unchecked(&mut b.pos, &u);
        assert_eq!(b.castling().to_string(), "KQk");

        let mv = find(&b, "e1", "c1");
        assert_eq!(mv.kind(), MoveKind::CastlingQueenside);
        let u = make_move_unchecked(&mut b.pos, mv);
        assert_eq!(
            b.get(coord("c1")),
            Cell::from_parts(Color::White, Piece::King)
        );
        assert_eq!(
            b.get(coord("d1")),
            Cell::from_parts(Color::White, Piece::Rook)
        );
        assert_eq!(b.get(coord("a1")), Cell::EMPTY);
        assert_eq!(b.castling().to_string(), "k");
        unmake_move_unchecked(&mut b.pos, &u);
        assert_eq!(
            b.get(coord("a1")),
            Cell::from_parts(Color::White, Piece::Rook)
        );
        assert_eq!(
            b.get(coord("e1")),
            Cell::from_parts(Color::White, Piece::King)
        );
        assert_eq!(b.get(coord("d1")), Cell::EMPTY);
        assert_eq!(b.get(coord("c1")), Cell::EMPTY);
    }

    #[test]
    fn test_promote() {
        let mut raw = RawBoard::empty();
        raw.put2(File::A, Rank::R1, Cell::from_parts(Color::White, Piece::King));
        raw.put2(File::H, Rank::R1, Cell::from_parts(Color::Black, Piece::King));
        raw.put2(File::B, Rank::R7, Cell::from_parts(Color::White, Piece::Pawn));
        raw.put2(File::C, Rank::R8, Cell::from_parts(Color::Black, Piece::Knight));
        let mut b: Board = raw.try_into().unwrap();

        let mv = find(&b, "b7", "c8");
        assert_eq!(mv.kind(), MoveKind::Promote(PromotePiece::Queen));
        assert_eq!(mv.kind().promote(), Some(Piece::Queen));
        assert_eq!(mv.landed(), Cell::from_parts(Color::White, Piece::Queen));
        assert_eq!(mv.to_string(), "b7c8q");

        let u = make_move_unchecked(&mut b.pos, mv);
        assert_eq!(b.get(coord("c8")), mv.landed());
        assert_eq!(b.get(coord("b7")), Cell::EMPTY);
        unmake_move_unchecked(&mut b.pos, &u);
        assert_eq!(
            b.get(coord("b7")),
            Cell::from_parts(Color::White, Piece::Pawn)
        );
        assert_eq!(
            b.get(coord("c8")),
            Cell::from_parts(Color::Black, Piece::Knight)
        );
    }

    #[test]
    fn test_promote_piece() {
        for p in [
            PromotePiece::Knight,
            PromotePiece::Bishop,
            PromotePiece::Rook,
            PromotePiece::Queen,
        ] {
            assert_eq!(PromotePiece::try_from(Piece::from(p)), Ok(p));
        }
        assert_eq!(PromotePiece::try_from(Piece::King), Err(()));
        assert_eq!(PromotePiece::try_from(Piece::Pawn), Err(()));
    }
}
