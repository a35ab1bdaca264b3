//! Move generation and attack detection

use crate::board::{Board, Position};
use crate::castling;
use crate::geometry;
use crate::moves::{self, Move, MoveKind, PromotePiece};
use crate::types::{CastlingSide, Cell, Color, Coord, Piece};

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

fn leaper_hits(p: &Position, coord: Coord, steps: &[(isize, isize)], attacker: Cell) -> bool {
    steps
        .iter()
        .filter_map(|&(dr, dc)| coord.offset(dr, dc))
        .any(|src| p.get(src) == attacker)
}

fn slider_hits(p: &Position, coord: Coord, dirs: &[(isize, isize)], by: Color, piece: Piece) -> bool {
    let slider = Cell::from_parts(by, piece);
    let queen = Cell::from_parts(by, Piece::Queen);
    dirs.iter().any(|&(dr, dc)| {
        let mut cur = coord;
        while let Some(next) = cur.offset(dr, dc) {
            let cell = p.get(next);
            if cell.is_occupied() {
                return cell == slider || cell == queen;
            }
            cur = next;
        }
        false
    })
}

pub(crate) fn is_attacked(p: &Position, coord: Coord, by: Color) -> bool {
    // Trace the pawn attack back from the destination square, so step against the attacker's
    // forward direction
    let pawn = Cell::from_parts(by, Piece::Pawn);
    let back = -geometry::pawn_forward(by);
    if [-1, 1]
        .into_iter()
        .filter_map(|dc| coord.offset(back, dc))
        .any(|src| p.get(src) == pawn)
    {
        return true;
    }

    // Near attacks
    if leaper_hits(p, coord, &geometry::KNIGHT_STEPS, Cell::from_parts(by, Piece::Knight))
        || leaper_hits(p, coord, &geometry::KING_STEPS, Cell::from_parts(by, Piece::King))
    {
        return true;
    }

    // Far attacks
    slider_hits(p, coord, &geometry::DIAG_DIRS, by, Piece::Bishop)
        || slider_hits(p, coord, &geometry::LINE_DIRS, by, Piece::Rook)
}

/// Returns `true` if square `coord` is attacked by any piece of color `color`
pub fn is_cell_attacked(b: &Board, coord: Coord, color: Color) -> bool {
    is_attacked(&b.pos, coord, color)
}

trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// List of moves with fixed capacity
///
/// No position has more than 256 moves for one side, so the list never overflows.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Sink for generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

/// Passes only the moves which don't leave the mover's king under attack
///
/// Each move is made on a scratch copy of the position, checked and unmade, so the game
/// history is never touched.
struct LegalFilter<'a, P> {
    scratch: Position,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> LegalFilter<'a, P> {
    fn new(pos: &Position, inner: &'a mut P) -> Self {
        Self {
            scratch: *pos,
            inner,
        }
    }
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        let u = moves::make_move_unchecked(&mut self.scratch, mv);
        let is_legal = !self.scratch.is_king_attacked(mv.color());
        moves::unmake_move_unchecked(&mut self.scratch, &u);
        match is_legal {
            true => self.inner.push(mv),
            false => Ok(()),
        }
    }
}

/// Pseudo-legal move generator for one color
///
/// Moves are emitted square by square in board-scan order. For a single piece, the order is
/// fixed: pawn pushes before captures, steps and rays in the order of the geometry tables, and
/// castling after the ordinary king moves.
struct MoveGenImpl<'a, P> {
    pos: &'a Position,
    color: Color,
    promote: PromotePiece,
    with_enpassant: bool,
    dst: &'a mut P,
}

impl<'a, P: MaybeMovePush> MoveGenImpl<'a, P> {
    fn new(board: &'a Board, color: Color, dst: &'a mut P) -> Self {
        MoveGenImpl {
            pos: &board.pos,
            color,
            promote: board.config().promote_to,
            // The en passant target belongs to the side to move only
            with_enpassant: color == board.side(),
            dst,
        }
    }

    fn add_move(
        &mut self,
        kind: MoveKind,
        src: Coord,
        dst: Coord,
        captured: Option<(Cell, Coord)>,
    ) -> Result<(), P::Err> {
        let piece = self.pos.get(src);
        self.dst
            .push(Move::new_unchecked(kind, src, dst, piece, captured))
    }

    /// Classifies the destination square for a non-pawn move
    ///
    /// Returns `None` if the square is blocked, i.e. holds an own piece or the enemy king.
    fn target(&self, dst: Coord) -> Option<Option<(Cell, Coord)>> {
        let cell = self.pos.get(dst);
        if cell.is_empty() {
            return Some(None);
        }
        if cell.is_color(self.color.inv()) && cell.piece() != Some(Piece::King) {
            return Some(Some((cell, dst)));
        }
        None
    }

    fn add_pawn_move(
        &mut self,
        src: Coord,
        dst: Coord,
        captured: Option<(Cell, Coord)>,
    ) -> Result<(), P::Err> {
        let kind = if dst.rank() == geometry::promote_rank(self.color) {
            MoveKind::Promote(self.promote)
        } else {
            MoveKind::PawnSimple
        };
        self.add_move(kind, src, dst, captured)
    }

    fn gen_pawn(&mut self, src: Coord) -> Result<(), P::Err> {
        let fwd = geometry::pawn_forward(self.color);

        if let Some(one) = src.offset(fwd, 0) {
            if self.pos.get(one).is_empty() {
                self.add_pawn_move(src, one, None)?;
                if src.rank() == geometry::double_move_src_rank(self.color) {
                    if let Some(two) = one.offset(fwd, 0) {
                        if self.pos.get(two).is_empty() {
                            self.add_move(MoveKind::PawnDouble, src, two, None)?;
                        }
                    }
                }
            }
        }

        for dc in [-1, 1] {
            let dst = match src.offset(fwd, dc) {
                Some(dst) => dst,
                None => continue,
            };
            let cell = self.pos.get(dst);
            if cell.is_color(self.color.inv()) {
                if cell.piece() != Some(Piece::King) {
                    self.add_pawn_move(src, dst, Some((cell, dst)))?;
                }
            } else if cell.is_empty()
                && self.with_enpassant
                && self.pos.r.ep_target == Some(dst)
            {
                // The pawn that made the double move stands right behind the target square
                if let Some(victim) = dst.offset(-fwd, 0) {
                    let victim_cell = self.pos.get(victim);
                    if victim_cell == Cell::from_parts(self.color.inv(), Piece::Pawn) {
                        self.add_move(MoveKind::Enpassant, src, dst, Some((victim_cell, victim)))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn gen_leaper(&mut self, src: Coord, steps: &[(isize, isize)]) -> Result<(), P::Err> {
        for &(dr, dc) in steps {
            if let Some(dst) = src.offset(dr, dc) {
                if let Some(captured) = self.target(dst) {
                    self.add_move(MoveKind::Simple, src, dst, captured)?;
                }
            }
        }
        Ok(())
    }

    fn gen_slider(&mut self, src: Coord, dirs: &[(isize, isize)]) -> Result<(), P::Err> {
        for &(dr, dc) in dirs {
            let mut cur = src;
            while let Some(dst) = cur.offset(dr, dc) {
                match self.target(dst) {
                    Some(None) => self.add_move(MoveKind::Simple, src, dst, None)?,
                    Some(captured) => {
                        self.add_move(MoveKind::Simple, src, dst, captured)?;
                        break;
                    }
                    None => break,
                }
                cur = dst;
            }
        }
        Ok(())
    }

    fn gen_castling(&mut self, src: Coord) -> Result<(), P::Err> {
        if src != castling::king_src(self.color) {
            return Ok(());
        }
        let enemy = self.color.inv();
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if !self.pos.r.castling.has(self.color, side) {
                continue;
            }
            let all = self.pos.white | self.pos.black;
            let dst = castling::king_dst(self.color, side);
            if (castling::pass(self.color, side) & all).is_empty()
                && !is_attacked(self.pos, src, enemy)
                && !is_attacked(self.pos, castling::king_transit(self.color, side), enemy)
                && !is_attacked(self.pos, dst, enemy)
            {
                self.add_move(MoveKind::from(side), src, dst, None)?;
            }
        }
        Ok(())
    }

    fn gen_from(&mut self, src: Coord) -> Result<(), P::Err> {
        let cell = self.pos.get(src);
        if !cell.is_color(self.color) {
            return Ok(());
        }
        match cell.piece() {
            Some(Piece::Pawn) => self.gen_pawn(src),
            Some(Piece::Knight) => self.gen_leaper(src, &geometry::KNIGHT_STEPS),
            Some(Piece::Bishop) => self.gen_slider(src, &geometry::DIAG_DIRS),
            Some(Piece::Rook) => self.gen_slider(src, &geometry::LINE_DIRS),
            Some(Piece::Queen) => {
                self.gen_slider(src, &geometry::DIAG_DIRS)?;
                self.gen_slider(src, &geometry::LINE_DIRS)
            }
            Some(Piece::King) => {
                self.gen_leaper(src, &geometry::KING_STEPS)?;
                self.gen_castling(src)
            }
            None => Ok(()),
        }
    }

    fn gen_all(&mut self) -> Result<(), P::Err> {
        for src in self.pos.color(self.color) {
            self.gen_from(src)?;
        }
        Ok(())
    }
}

/// Generation of semilegal moves, i.e. moves which may leave the king under attack
pub mod semilegal {
    use super::{MoveGenImpl, MoveList};
    use crate::board::Board;
    use crate::types::{Color, Coord};

    /// Generates the moves of color `c`
    pub fn gen_for(b: &Board, c: Color) -> MoveList {
        let mut res = MoveList::new();
        let _ = MoveGenImpl::new(b, c, &mut res).gen_all();
        res
    }

    /// Generates the moves of the side to move
    pub fn gen_all(b: &Board) -> MoveList {
        gen_for(b, b.side())
    }

    /// Generates the moves of the piece on `src`, whatever its color
    pub fn gen_from(b: &Board, src: Coord) -> MoveList {
        let mut res = MoveList::new();
        if let Some(c) = b.get(src).color() {
            let _ = MoveGenImpl::new(b, c, &mut res).gen_from(src);
        }
        res
    }
}

/// Generation of legal moves
pub mod legal {
    use super::{LegalFilter, MoveGenImpl, MoveList};
    use crate::board::Board;
    use crate::types::{Color, Coord};

    /// Generates the legal moves of color `c`
    pub fn gen_for(b: &Board, c: Color) -> MoveList {
        let mut res = MoveList::new();
        let mut p = LegalFilter::new(&b.pos, &mut res);
        let _ = MoveGenImpl::new(b, c, &mut p).gen_all();
        res
    }

    /// Generates the legal moves of the side to move
    pub fn gen_all(b: &Board) -> MoveList {
        gen_for(b, b.side())
    }

    /// Generates the legal moves of the piece on `src`, whatever its color
    pub fn gen_from(b: &Board, src: Coord) -> MoveList {
        let mut res = MoveList::new();
        if let Some(c) = b.get(src).color() {
            let mut p = LegalFilter::new(&b.pos, &mut res);
            let _ = MoveGenImpl::new(b, c, &mut p).gen_from(src);
        }
        res
    }
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

/// Returns `true` if the side to move has at least one legal move
///
/// Stops at the first legal move found.
pub fn has_legal_moves(b: &Board) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut p = LegalFilter::new(&b.pos, &mut err_on_first);
    MoveGenImpl::new(b, b.side(), &mut p).gen_all().is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RawBoard;
    use std::collections::BTreeSet;

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

    fn move_set(ml: &MoveList) -> BTreeSet<String> {
        ml.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_attacks() {
        use Color::*;
        use Piece::*;
        let b = board(
            White,
            &[
                ("h1", White, King),
                ("h8", Black, King),
                ("d6", White, Rook),
                ("b5", White, Knight),
                ("c3", White, Pawn),
                ("f2", White, Bishop),
                ("e6", Black, Pawn),
            ],
        );
        let d4 = coord("d4");
        assert!(is_cell_attacked(&b, d4, White));
        assert!(!is_cell_attacked(&b, d4, Black));
        // Rook on d6 hits d5 and d4, the bishop hits e3 and d4, the knight hits d4 and a3
        assert!(is_cell_attacked(&b, coord("a3"), White));
        assert!(is_cell_attacked(&b, coord("e3"), White));
        // Pawn on e6 attacks d5 and f5, but not e5
        assert!(is_cell_attacked(&b, coord("d5"), Black));
        assert!(is_cell_attacked(&b, coord("f5"), Black));
        assert!(!is_cell_attacked(&b, coord("e5"), Black));
        // The rook ray is blocked by the black pawn
        assert!(!is_cell_attacked(&b, coord("f6"), White));
        assert!(is_cell_attacked(&b, coord("e6"), White));
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        let ml = legal::gen_all(&b);
        assert_eq!(ml.len(), 20);
        assert_eq!(semilegal::gen_all(&b).len(), 20);
        assert_eq!(legal::gen_for(&b, Color::Black).len(), 20);

        // Board-scan order: the pawns on rank 2 come before the knights on rank 1
        let order: Vec<_> = ml.iter().map(ToString::to_string).collect();
        assert_eq!(&order[..4], ["a2a3", "a2a4", "b2b3", "b2b4"]);
        assert_eq!(&order[16..], ["b1a3", "b1c3", "g1f3", "g1h3"]);
    }

    #[test]
    fn test_pins() {
        use Color::*;
        use Piece::*;
        let b = board(
            White,
            &[
                ("e1", White, King),
                ("e2", White, Bishop),
                ("e8", Black, Rook),
                ("a8", Black, King),
            ],
        );
        // The bishop is pinned and cannot move at all
        assert_eq!(semilegal::gen_from(&b, coord("e2")).len(), 9);
        assert!(legal::gen_from(&b, coord("e2")).is_empty());
        assert!(has_legal_moves(&b));
    }

    #[test]
    fn test_castling() {
        use Color::*;
        use Piece::*;
        let mut raw = RawBoard::empty();
        raw.castling = crate::types::CastlingRights::FULL;
        for (c, color, piece) in [
            ("e1", White, King),
            ("a1", White, Rook),
            ("h1", White, Rook),
            ("e8", Black, King),
            ("c6", Black, Bishop),
        ] {
            raw.put(coord(c), Cell::from_parts(color, piece));
        }
        let b: Board = raw.try_into().unwrap();
        // The bishop on c6 hits f3, g2 and h1 but not the king path on the first rank
        let castlings: BTreeSet<_> = move_set(&legal::gen_from(&b, coord("e1")))
            .into_iter()
            .filter(|s| s == "e1g1" || s == "e1c1")
            .collect();
        assert_eq!(castlings, BTreeSet::from(["e1c1".into(), "e1g1".into()]));

        // Bishop on a6 covers f1, so kingside castling passes through check
        raw.put(coord("c6"), Cell::EMPTY);
        raw.put(coord("a6"), Cell::from_parts(Black, Bishop));
        let b: Board = raw.try_into().unwrap();
        let ml = move_set(&legal::gen_from(&b, coord("e1")));
        assert!(!ml.contains("e1g1"));
        assert!(ml.contains("e1c1"));

        // Knight on b1 blocks queenside castling, even though the king never passes b1
        raw.put(coord("b1"), Cell::from_parts(White, Knight));
        let b: Board = raw.try_into().unwrap();
        let ml = move_set(&legal::gen_from(&b, coord("e1")));
        assert!(!ml.contains("e1c1"));

        // No castling out of check
        raw.put(coord("b1"), Cell::EMPTY);
        raw.put(coord("a6"), Cell::EMPTY);
        raw.put(coord("e5"), Cell::from_parts(Black, Rook));
        let b: Board = raw.try_into().unwrap();
        assert!(b.is_check());
        let ml = move_set(&legal::gen_from(&b, coord("e1")));
        assert!(!ml.contains("e1c1"));
        assert!(!ml.contains("e1g1"));
    }

    #[test]
    fn test_enpassant_side() {
        use Color::*;
        use Piece::*;
        let mut raw = RawBoard::empty();
        for (c, color, piece) in [
            ("e1", White, King),
            ("e8", Black, King),
            ("e5", White, Pawn),
            ("d5", Black, Pawn),
        ] {
            raw.put(coord(c), Cell::from_parts(color, piece));
        }
        raw.ep_target = Some(coord("d6"));
        let b: Board = raw.try_into().unwrap();
        let ml = legal::gen_from(&b, coord("e5"));
        let ep: Vec<_> = ml
            .iter()
            .filter(|mv| mv.kind() == MoveKind::Enpassant)
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].dst(), coord("d6"));
        assert_eq!(
            ep[0].captured(),
            Some((Cell::from_parts(Black, Pawn), coord("d5")))
        );

        // Moves of the side not to move never include en passant
        assert!(legal::gen_for(&b, Black)
            .iter()
            .all(|mv| mv.kind() != MoveKind::Enpassant));
    }

    #[test]
    fn test_no_king_capture() {
        use Color::*;
        use Piece::*;
        // White is in check; Black's moves must not include capturing the king
        let b = board(
            White,
            &[("e1", White, King), ("e4", Black, Rook), ("a8", Black, King)],
        );
        assert!(b.is_check());
        assert!(legal::gen_for(&b, Black)
            .iter()
            .all(|mv| mv.dst() != coord("e1")));
    }
}
