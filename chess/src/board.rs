//! Board and game state

use crate::bitboard::Bitboard;
use crate::config::GameConfig;
use crate::movegen::{self, MoveList};
use crate::moves::{self, IllegalMoveError, LogEntry, Move};
use crate::types::{
    CastlingRights, CastlingSide, Cell, Color, Coord, File, GameStatus, OutOfBoundsError, Piece,
    Rank,
};
use crate::{eval, geometry};

use std::fmt::{self, Display};

use log::{trace, warn};
use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// En passant target is located on a rank where no pawn could have passed
    #[error("invalid enpassant target {0}")]
    InvalidEnpassant(Coord),
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the first or on the eighth rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// The king of the side not to move is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Raw position, which is not guaranteed to be valid
///
/// It is used to set up custom positions, which are then converted into [`Board`] with
/// `TryFrom`. The conversion checks the position for validity.
///
/// # Example
///
/// ```
/// # use kingside::{Board, Cell, Color, Piece, RawBoard, File, Rank};
/// #
/// let mut raw = RawBoard::empty();
/// raw.put2(File::B, Rank::R2, Cell::from_parts(Color::White, Piece::King));
/// raw.put2(File::D, Rank::R5, Cell::from_parts(Color::Black, Piece::King));
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.king_pos(Color::Black), Some("d5".parse().unwrap()));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Contents of the board, indexed by [`Coord::index()`]
    pub cells: [Cell; 64],
    /// Side to move
    pub side: Color,
    /// Castling rights
    pub castling: CastlingRights,
    /// En passant target square
    ///
    /// It is `None` if no en passant is allowed. Otherwise, it is the square which the pawn
    /// that has just made a double move passed over. A capturing pawn lands on this square.
    pub ep_target: Option<Coord>,
}

impl RawBoard {
    /// Returns an empty `RawBoard` with White to move
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep_target: None,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> RawBoard {
        let mut res = RawBoard {
            castling: CastlingRights::FULL,
            ..RawBoard::empty()
        };
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for color in [Color::White, Color::Black] {
            let back = geometry::castling_rank(color);
            let pawns = geometry::double_move_src_rank(color);
            for (file, piece) in File::iter().zip(BACK_RANK) {
                res.put2(file, back, Cell::from_parts(color, piece));
                res.put2(file, pawns, Cell::from_parts(color, Piece::Pawn));
            }
        }
        res
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` to the square with coordinate `c`
    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Wraps the board to allow pretty-printing with the given style
    ///
    /// # Example
    ///
    /// ```
    /// # use kingside::{RawBoard, PrettyStyle};
    /// #
    /// let r = RawBoard::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

/// Cells together with occupancy sets
///
/// This is the part of the game state touched by making and unmaking moves. It is `Copy`, so the
/// legality check can simulate moves on a scratch copy without touching the game history.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Position {
    pub(crate) r: RawBoard,
    pub(crate) white: Bitboard,
    pub(crate) black: Bitboard,
}

impl Position {
    fn new(r: RawBoard) -> Position {
        let mut res = Position {
            r,
            white: Bitboard::EMPTY,
            black: Bitboard::EMPTY,
        };
        for coord in Coord::iter() {
            match r.get(coord).color() {
                Some(Color::White) => res.white.set(coord),
                Some(Color::Black) => res.black.set(coord),
                None => {}
            }
        }
        res
    }

    #[inline]
    pub(crate) fn get(&self, c: Coord) -> Cell {
        self.r.get(c)
    }

    /// Puts `cell` to `c`, keeping the occupancy sets in sync
    #[inline]
    pub(crate) fn put(&mut self, c: Coord, cell: Cell) {
        self.white.unset(c);
        self.black.unset(c);
        match cell.color() {
            Some(Color::White) => self.white.set(c),
            Some(Color::Black) => self.black.set(c),
            None => {}
        }
        self.r.put(c, cell);
    }

    #[inline]
    pub(crate) fn color(&self, c: Color) -> Bitboard {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub(crate) fn king_pos(&self, c: Color) -> Option<Coord> {
        let king = Cell::from_parts(c, Piece::King);
        self.color(c).into_iter().find(|&p| self.get(p) == king)
    }

    pub(crate) fn is_king_attacked(&self, c: Color) -> bool {
        self.king_pos(c)
            .map_or(false, |k| movegen::is_attacked(self, k, c.inv()))
    }
}

/// Chess game state
///
/// Unlike [`RawBoard`], it is always valid: each side has exactly one king, and the side not
/// to move is not in check. Besides the position itself, it tracks the captured pieces and the
/// history of the applied moves.
///
/// The board is mutated only by applying and undoing moves. To start a new game, just create a
/// new board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) pos: Position,
    captives: [Vec<Piece>; 2],
    log: Vec<LogEntry>,
    // Unlogged moves applied and not yet reverted
    pending: usize,
    config: GameConfig,
}

impl Board {
    fn from_valid(raw: RawBoard, config: GameConfig) -> Board {
        Board {
            pos: Position::new(raw),
            captives: [Vec::new(), Vec::new()],
            log: Vec::new(),
            pending: 0,
            config,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board::with_config(GameConfig::default())
    }

    /// Returns a board with the initial position and custom rules configuration
    pub fn with_config(config: GameConfig) -> Board {
        Board::from_valid(RawBoard::initial(), config)
    }

    /// Validates `raw` and creates a board from it, using the given rules configuration
    pub fn from_raw(raw: RawBoard, config: GameConfig) -> Result<Board, ValidateError> {
        let mut board = Board::try_from(raw)?;
        board.config = config;
        Ok(board)
    }

    /// Returns a view over the raw board
    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.pos.r
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.pos.get(c)
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.pos.r.get2(file, rank)
    }

    /// Returns the contents of the square at `row` and `col`
    #[inline]
    pub fn piece_at(&self, row: usize, col: usize) -> Result<Cell, OutOfBoundsError> {
        Ok(self.get(Coord::from_row_col(row, col)?))
    }

    /// Returns `true` if the square at `row` and `col` holds a piece of color `c`
    #[inline]
    pub fn is_occupied_by(&self, row: usize, col: usize, c: Color) -> Result<bool, OutOfBoundsError> {
        Ok(self.piece_at(row, col)?.is_color(c))
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.pos.r.side
    }

    /// Same as [`Board::side()`]
    #[inline]
    pub fn whose_turn(&self) -> Color {
        self.side()
    }

    /// Returns the set of squares occupied by pieces of color `c`
    #[inline]
    pub fn color(&self, c: Color) -> Bitboard {
        self.pos.color(c)
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.pos.r.castling
    }

    /// Returns `true` if color `c` can still castle to side `s` at some point of the game
    #[inline]
    pub fn can_castle(&self, c: Color, s: CastlingSide) -> bool {
        self.pos.r.castling.has(c, s)
    }

    #[inline]
    pub fn en_passant_target(&self) -> Option<Coord> {
        self.pos.r.ep_target
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king_pos(&self, c: Color) -> Option<Coord> {
        self.pos.king_pos(c)
    }

    /// Returns `true` if the current side is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        self.pos.is_king_attacked(self.side())
    }

    /// Returns `true` if square `c` is attacked by any piece of color `by`
    #[inline]
    pub fn is_attacked(&self, c: Coord, by: Color) -> bool {
        movegen::is_attacked(&self.pos, c, by)
    }

    /// Returns the pieces of color `c` captured so far, in order of capture
    #[inline]
    pub fn captives(&self, c: Color) -> &[Piece] {
        &self.captives[c.index()]
    }

    /// Returns the recorded moves, oldest first
    #[inline]
    pub fn move_log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Returns the material value of the pieces of color `c`
    #[inline]
    pub fn material(&self, c: Color) -> i32 {
        eval::material(self, c)
    }

    /// Returns the legal moves of the piece at `row` and `col`
    ///
    /// The result is empty if the square is empty or holds a piece of the side not to move.
    pub fn legal_moves_for(&self, row: usize, col: usize) -> Result<MoveList, OutOfBoundsError> {
        let coord = Coord::from_row_col(row, col)?;
        if !self.get(coord).is_color(self.side()) {
            return Ok(MoveList::new());
        }
        Ok(movegen::legal::gen_from(self, coord))
    }

    /// Returns the legal moves of all the pieces of color `c`, in board-scan order
    ///
    /// If `c` is not the side to move, the moves are generated as if it were its turn, except
    /// that en passant captures are never included.
    #[inline]
    pub fn legal_moves_for_player(&self, c: Color) -> MoveList {
        movegen::legal::gen_for(self, c)
    }

    /// Returns the legal moves of the side to move
    #[inline]
    pub fn legal_moves(&self) -> MoveList {
        movegen::legal::gen_all(self)
    }

    /// Returns `true` if the current side has at least one legal move
    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        movegen::has_legal_moves(self)
    }

    /// Finds the legal move of the side to move from `src` to `dst`
    pub fn find_move(&self, src: Coord, dst: Coord) -> Option<Move> {
        if !self.get(src).is_color(self.side()) {
            return None;
        }
        movegen::legal::gen_from(self, src)
            .iter()
            .copied()
            .find(|mv| mv.dst() == dst)
    }

    /// Calculates the state of the game for the side to move
    pub fn status(&self) -> GameStatus {
        if self.has_legal_moves() {
            GameStatus::Ongoing
        } else if self.is_check() {
            GameStatus::Checkmate {
                winner: self.side().inv(),
            }
        } else {
            GameStatus::Stalemate
        }
    }

    /// Applies the move without checking whether it is legal
    ///
    /// The returned entry must be passed to [`Board::unmake_move_unchecked()`] before any other
    /// move is taken back.
    pub(crate) fn make_move_unchecked(&mut self, mv: Move) -> LogEntry {
        let entry = moves::make_move_unchecked(&mut self.pos, mv);
        if let Some((cell, _)) = mv.captured() {
            if let (Some(color), Some(piece)) = (cell.color(), cell.piece()) {
                self.captives[color.index()].push(piece);
            }
        }
        entry
    }

    /// Takes back the move described by `entry`, which must be the last move made
    pub(crate) fn unmake_move_unchecked(&mut self, entry: &LogEntry) {
        moves::unmake_move_unchecked(&mut self.pos, entry);
        if let Some((cell, _)) = entry.mv().captured() {
            if let Some(color) = cell.color() {
                self.captives[color.index()].pop();
            }
        }
    }

    /// Applies the legal move `mv`
    ///
    /// If `record` is `true`, the move is appended to the move log and can be taken back with
    /// [`Board::undo_last_move()`]. Otherwise, the move must be taken back with
    /// [`Board::revert()`] using the returned entry, and no recorded move can be undone until
    /// then.
    ///
    /// If the move is not legal, the board is left untouched.
    pub fn apply_move(&mut self, mv: Move, record: bool) -> Result<LogEntry, IllegalMoveError> {
        if mv.color() != self.side() || !movegen::legal::gen_from(self, mv.src()).contains(&mv) {
            warn!("rejected illegal move {}", mv);
            return Err(IllegalMoveError::NotLegal(mv));
        }
        let entry = self.make_move_unchecked(mv);
        if record {
            self.log.push(entry);
            trace!("applied move {} by {}", mv, mv.color().name());
            if log::log_enabled!(log::Level::Trace) {
                trace!("status after {}: {}", mv, self.status());
            }
        } else {
            self.pending += 1;
        }
        Ok(entry)
    }

    /// Finds the legal move from `src` to `dst` and applies it
    pub fn apply_coords(
        &mut self,
        src: Coord,
        dst: Coord,
        record: bool,
    ) -> Result<LogEntry, IllegalMoveError> {
        match self.find_move(src, dst) {
            Some(mv) => self.apply_move(mv, record),
            None => {
                warn!("rejected move from {} to {}", src, dst);
                Err(IllegalMoveError::NoSuchMove { src, dst })
            }
        }
    }

    /// Takes back the unlogged move described by `entry`
    ///
    /// `entry` must be the one returned by the last unlogged [`Board::apply_move()`] which is not
    /// taken back yet. Recorded moves are taken back with [`Board::undo_last_move()`] instead.
    ///
    /// If `entry` does not describe the last move made on this board, the board is left
    /// untouched.
    pub fn revert(&mut self, entry: &LogEntry) -> Result<(), IllegalMoveError> {
        let mv = entry.mv();
        if self.pending == 0
            || self.side() != entry.side().inv()
            || self.get(mv.dst()) != mv.landed()
        {
            warn!("rejected revert of move {}", mv);
            return Err(IllegalMoveError::NotLast(mv));
        }
        self.unmake_move_unchecked(entry);
        self.pending -= 1;
        Ok(())
    }

    /// Takes back the last recorded move
    ///
    /// Returns `None` if there are no recorded moves, or if some unlogged move is not reverted
    /// yet.
    pub fn undo_last_move(&mut self) -> Option<Move> {
        if self.pending != 0 {
            warn!("cannot undo while {} unlogged moves are applied", self.pending);
            return None;
        }
        let entry = self.log.pop()?;
        self.unmake_move_unchecked(&entry);
        trace!("undone move {}", entry.mv());
        Some(entry.mv())
    }

    /// Wraps the board to allow pretty-printing with the given style
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.pos.r.pretty(style)
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::initial()
    }
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(mut raw: RawBoard) -> Result<Board, ValidateError> {
        // Check en passant target
        if let Some(p) = raw.ep_target {
            if p.rank() != geometry::enpassant_dst_rank(raw.side) {
                return Err(ValidateError::InvalidEnpassant(p));
            }

            // Reset the target if there is no pawn that could have just passed over it
            let enemy = raw.side.inv();
            let fwd = geometry::pawn_forward(enemy);
            let pawn = p.offset(fwd, 0).map(|c| raw.get(c));
            let from = p.offset(-fwd, 0).map(|c| raw.get(c));
            if pawn != Some(Cell::from_parts(enemy, Piece::Pawn))
                || from != Some(Cell::EMPTY)
                || raw.get(p) != Cell::EMPTY
            {
                raw.ep_target = None;
            }
        }

        // Reset bad castling flags
        for color in [Color::White, Color::Black] {
            let rank = geometry::castling_rank(color);
            if raw.get2(File::E, rank) != Cell::from_parts(color, Piece::King) {
                raw.castling.unset_color(color);
            }
            if raw.get2(File::A, rank) != Cell::from_parts(color, Piece::Rook) {
                raw.castling.unset(color, CastlingSide::Queen);
            }
            if raw.get2(File::H, rank) != Cell::from_parts(color, Piece::Rook) {
                raw.castling.unset(color, CastlingSide::King);
            }
        }

        let pos = Position::new(raw);

        // Check TooManyPieces, NoKing, TooManyKings
        for color in [Color::White, Color::Black] {
            let pieces = pos.color(color);
            if pieces.len() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            let king = Cell::from_parts(color, Piece::King);
            match pieces.into_iter().filter(|&c| raw.get(c) == king).count() {
                0 => return Err(ValidateError::NoKing(color)),
                1 => {}
                _ => return Err(ValidateError::TooManyKings(color)),
            }
        }

        // Check InvalidPawn
        let edges = Bitboard::from_rank(Rank::R1) | Bitboard::from_rank(Rank::R8);
        if let Some(bad) = (edges & (pos.white | pos.black))
            .into_iter()
            .find(|&c| raw.get(c).piece() == Some(Piece::Pawn))
        {
            return Err(ValidateError::InvalidPawn(bad));
        }

        // Check OpponentKingAttacked
        if pos.is_king_attacked(raw.side.inv()) {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(Board::from_valid(raw, GameConfig::default()))
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

/// Style for [`RawBoard::pretty()`] and [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as Unicode chess symbols and box-drawing characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`RawBoard::pretty()`] for more details.
pub struct Pretty<'a> {
    raw: &'a RawBoard,
    style: PrettyStyle,
}

struct StyleTable {
    horz: char,
    vert: char,
    angle: char,
    indicators: [char; 2],
    cell: fn(&Cell) -> char,
}

const ASCII_TABLE: StyleTable = StyleTable {
    horz: '-',
    vert: '|',
    angle: '+',
    indicators: ['W', 'B'],
    cell: Cell::as_char,
};

const UTF8_TABLE: StyleTable = StyleTable {
    horz: '─',
    vert: '│',
    angle: '┼',
    indicators: ['○', '●'],
    cell: Cell::as_utf8_char,
};

impl StyleTable {
    fn fmt(&self, r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, self.vert)?;
            for file in File::iter() {
                write!(f, "{}", (self.cell)(&r.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", self.horz, self.angle)?;
        for _ in File::iter() {
            write!(f, "{}", self.horz)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", self.indicators[r.side.index()], self.vert)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => ASCII_TABLE.fmt(self.raw, f),
            PrettyStyle::Utf8 => UTF8_TABLE.fmt(self.raw, f),
        }
    }
}
