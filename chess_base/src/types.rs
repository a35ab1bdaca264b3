use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

/// Row or column index outside of the 8x8 grid
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("square ({row}, {col}) is outside of the board")]
pub struct OutOfBoundsError {
    pub row: usize,
    pub col: usize,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

/// Board column, from `a` to `h`
///
/// The index of the file is the column index on the board.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the file with column index `val`, or `None` if `val >= 8`
    #[inline]
    pub const fn try_from_index(val: usize) -> Option<Self> {
        if val < 8 {
            Some(Self::ALL[val])
        } else {
            None
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Self::try_from_index(c as usize - 'a' as usize),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Board row, from the eighth rank down to the first one
///
/// The index of the rank is the row index on the board, so row 0 is Black's back rank and
/// row 7 is White's back rank.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R8 = 0,
    R7 = 1,
    R6 = 2,
    R5 = 3,
    R4 = 4,
    R3 = 5,
    R2 = 6,
    R1 = 7,
}

impl Rank {
    const ALL: [Rank; 8] = [
        Rank::R8,
        Rank::R7,
        Rank::R6,
        Rank::R5,
        Rank::R4,
        Rank::R3,
        Rank::R2,
        Rank::R1,
    ];

    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the rank with row index `val`, or `None` if `val >= 8`
    #[inline]
    pub const fn try_from_index(val: usize) -> Option<Self> {
        if val < 8 {
            Some(Self::ALL[val])
        } else {
            None
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Self::try_from_index('8' as usize - c as usize),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'8' - *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// Internally, a square is stored as `row * 8 + col`, so iterating over indices `0..64` walks
/// the board in scan order: row 0 to row 7, and column 0 to column 7 inside each row.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord(u8);

impl Coord {
    /// Creates a square from its row and column, failing if either is outside `0..8`
    #[inline]
    pub const fn from_row_col(row: usize, col: usize) -> Result<Coord, OutOfBoundsError> {
        if row >= 8 || col >= 8 {
            return Err(OutOfBoundsError { row, col });
        }
        Ok(Coord((row * 8 + col) as u8))
    }

    /// Creates a square from its index
    ///
    /// # Panics
    ///
    /// Panics if `val >= 64`.
    #[inline]
    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    #[inline]
    pub const fn from_parts(file: File, rank: Rank) -> Coord {
        Coord(((rank as u8) << 3) | file as u8)
    }

    #[inline]
    pub const fn row(&self) -> usize {
        (self.0 >> 3) as usize
    }

    #[inline]
    pub const fn col(&self) -> usize {
        (self.0 & 7) as usize
    }

    #[inline]
    pub const fn file(&self) -> File {
        File::ALL[self.col()]
    }

    #[inline]
    pub const fn rank(&self) -> Rank {
        Rank::ALL[self.row()]
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the square shifted by `d_row` rows and `d_col` columns, or `None` if it leaves
    /// the board
    #[inline]
    pub const fn offset(self, d_row: isize, d_col: isize) -> Option<Coord> {
        let row = self.row() as isize + d_row;
        let col = self.col() as isize + d_col;
        if row < 0 || row >= 8 || col < 0 || col >= 8 {
            return None;
        }
        Some(Coord((row * 8 + col) as u8))
    }

    /// Iterates over all the squares in board-scan order
    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Coord)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Coord({})", self);
        }
        write!(f, "Coord(?{:?})", self.0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => (f, r),
            _ => return Err(CoordParseError::BadLength),
        };
        Ok(Coord::from_parts(
            File::from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(CoordParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

/// Side of the game
///
/// White is player A and always moves first, Black is player B.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    /// Returns the human-readable name of the color
    pub fn name(&self) -> &'static str {
        match *self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_char(c).ok_or(ColorParseError::UnexpectedChar(c)),
            _ => Err(ColorParseError::BadLength),
        }
    }
}

/// Kind of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl Piece {
    pub const COUNT: usize = 6;

    const ALL: [Piece; Self::COUNT] = [
        Piece::Pawn,
        Piece::King,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ];

    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    /// Returns the lowercase letter of the piece (`p`, `k`, `n`, `b`, `r`, `q`)
    pub fn as_char(&self) -> char {
        b"pknbrq"[self.index()] as char
    }

    /// Returns the full lowercase name of the piece
    pub fn name(&self) -> &'static str {
        match *self {
            Piece::Pawn => "pawn",
            Piece::King => "king",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
        }
    }
}

/// Contents of a board square: either a piece of some color or [`Cell::EMPTY`]
///
/// Cells are plain values. The location of a piece is implied by the square holding the
/// cell and is never stored inside the cell itself.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const COUNT: usize = 13;

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn from_parts(c: Color, p: Piece) -> Cell {
        Cell(1 + (c as u8) * 6 + p as u8)
    }

    #[inline]
    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    #[inline]
    pub const fn piece(&self) -> Option<Piece> {
        match self.0 {
            0 => None,
            v => Some(Piece::ALL[((v - 1) % 6) as usize]),
        }
    }

    /// Returns `true` if the cell holds a piece of color `c`
    #[inline]
    pub const fn is_color(&self, c: Color) -> bool {
        self.0 != 0 && (self.0 - 1) / 6 == c as u8
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Cell)
    }

    pub fn as_char(&self) -> char {
        b".PKNBRQpknbrq"[self.index()] as char
    }

    pub fn as_utf8_char(&self) -> char {
        [
            '.', '♙', '♔', '♘', '♗', '♖', '♕', '♟', '♚', '♞', '♝', '♜', '♛',
        ][self.index()]
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'k' => Piece::King,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            _ => return None,
        };
        Some(Cell::from_parts(color, piece))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.index() < Self::COUNT {
            return write!(f, "Cell({})", self.as_char());
        }
        write!(f, "Cell(?{:?})", self.0)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Cell::from_char(c).ok_or(CellParseError::UnexpectedChar(c)),
            _ => Err(CellParseError::BadLength),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

/// Castling rights of both players
///
/// A right, once lost, is never regained during normal play. It is restored only when a
/// move is undone.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    const fn to_index(c: Color, s: CastlingSide) -> u8 {
        ((c as u8) << 1) | s as u8
    }

    pub const EMPTY: CastlingRights = CastlingRights(0);
    pub const FULL: CastlingRights = CastlingRights(15);

    #[inline]
    pub const fn has(&self, c: Color, s: CastlingSide) -> bool {
        ((self.0 >> Self::to_index(c, s)) & 1) != 0
    }

    #[inline]
    pub const fn with(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 | (1_u8 << Self::to_index(c, s)))
    }

    #[inline]
    pub const fn without(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 & !(1_u8 << Self::to_index(c, s)))
    }

    pub fn set(&mut self, c: Color, s: CastlingSide) {
        *self = self.with(c, s)
    }

    pub fn unset(&mut self, c: Color, s: CastlingSide) {
        *self = self.without(c, s)
    }

    pub fn unset_color(&mut self, c: Color) {
        self.unset(c, CastlingSide::King);
        self.unset(c, CastlingSide::Queen);
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "CastlingRights({})", self)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if *self == Self::EMPTY {
            return write!(f, "-");
        }
        for (c, s, ch) in [
            (Color::White, CastlingSide::King, 'K'),
            (Color::White, CastlingSide::Queen, 'Q'),
            (Color::Black, CastlingSide::King, 'k'),
            (Color::Black, CastlingSide::Queen, 'q'),
        ] {
            if self.has(c, s) {
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

/// State of the game as seen by the side to move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The side to move has at least one legal move
    Ongoing,
    /// The side to move is in check and has no legal moves
    Checkmate { winner: Color },
    /// The side to move is not in check and has no legal moves
    Stalemate,
}

impl GameStatus {
    #[inline]
    pub fn is_finished(&self) -> bool {
        !matches!(*self, GameStatus::Ongoing)
    }

    #[inline]
    pub fn winner(&self) -> Option<Color> {
        match *self {
            GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            GameStatus::Ongoing => write!(f, "game in progress"),
            GameStatus::Checkmate { winner } => write!(f, "{} wins by checkmate", winner.name()),
            GameStatus::Stalemate => write!(f, "draw by stalemate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord() {
        let mut coords = Vec::new();
        for rank in Rank::iter() {
            for file in File::iter() {
                let coord = Coord::from_parts(file, rank);
                assert_eq!(coord.file(), file);
                assert_eq!(coord.rank(), rank);
                assert_eq!(coord.row(), rank.index());
                assert_eq!(coord.col(), file.index());
                coords.push(coord);
            }
        }
        assert_eq!(coords, Coord::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_row_col() {
        let c = Coord::from_row_col(6, 4).unwrap();
        assert_eq!(c.to_string(), "e2");
        assert_eq!(
            Coord::from_row_col(8, 0),
            Err(OutOfBoundsError { row: 8, col: 0 })
        );
        assert_eq!(
            Coord::from_row_col(3, 11),
            Err(OutOfBoundsError { row: 3, col: 11 })
        );
        assert_eq!(c.offset(-2, 0), Some(Coord::from_parts(File::E, Rank::R4)));
        assert_eq!(c.offset(2, 0), None);
        assert_eq!(c.offset(0, 4), None);
    }

    #[test]
    fn test_cell() {
        assert_eq!(Cell::EMPTY.color(), None);
        assert_eq!(Cell::EMPTY.piece(), None);
        let mut cells = vec![Cell::EMPTY];
        for color in [Color::White, Color::Black] {
            for piece in Piece::iter() {
                let cell = Cell::from_parts(color, piece);
                assert_eq!(cell.color(), Some(color));
                assert_eq!(cell.piece(), Some(piece));
                assert!(cell.is_color(color));
                assert!(!cell.is_color(color.inv()));
                cells.push(cell);
            }
        }
        assert_eq!(cells, Cell::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_castling() {
        let full = CastlingRights::FULL;
        assert!(full.has(Color::White, CastlingSide::Queen));
        assert!(full.has(Color::Black, CastlingSide::King));
        assert_eq!(full.to_string(), "KQkq");
        assert_eq!(CastlingRights::EMPTY.to_string(), "-");

        let mut rights = CastlingRights::FULL;
        rights.unset_color(Color::White);
        rights.unset(Color::Black, CastlingSide::King);
        assert!(!rights.has(Color::White, CastlingSide::King));
        assert!(!rights.has(Color::White, CastlingSide::Queen));
        assert!(!rights.has(Color::Black, CastlingSide::King));
        assert!(rights.has(Color::Black, CastlingSide::Queen));
        assert_eq!(rights.to_string(), "q");
        rights.set(Color::White, CastlingSide::King);
        assert_eq!(rights.to_string(), "Kq");
    }

    #[test]
    fn test_coord_str() {
        assert_eq!(Coord::from_parts(File::B, Rank::R4).to_string(), "b4");
        assert_eq!(
            Coord::from_str("a1"),
            Ok(Coord::from_parts(File::A, Rank::R1))
        );
        assert_eq!(Coord::from_str("h9"), Err(CoordParseError::UnexpectedRankChar('9')));
        assert_eq!(Coord::from_str("i4"), Err(CoordParseError::UnexpectedFileChar('i')));
        assert_eq!(Coord::from_str("a"), Err(CoordParseError::BadLength));
    }

    #[test]
    fn test_cell_str() {
        for cell in Cell::iter() {
            let s = cell.to_string();
            assert_eq!(Cell::from_str(&s), Ok(cell));
        }
    }

    #[test]
    fn test_status() {
        assert!(!GameStatus::Ongoing.is_finished());
        assert!(GameStatus::Stalemate.is_finished());
        let mate = GameStatus::Checkmate {
            winner: Color::Black,
        };
        assert_eq!(mate.winner(), Some(Color::Black));
        assert_eq!(mate.to_string(), "Black wins by checkmate");
    }
}
