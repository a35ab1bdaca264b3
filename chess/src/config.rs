//! Rule and search configuration

use crate::moves::PromotePiece;
use crate::search::SearchError;

/// Search depth used by default, in plies
pub const DEFAULT_DEPTH: u32 = 3;

/// Lower bound used as minus infinity by the search
pub const DEFAULT_ALPHA: i32 = -100_000;

/// Upper bound used as plus infinity by the search
pub const DEFAULT_BETA: i32 = 100_000;

/// Rule options stored on the [`Board`](crate::board::Board)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GameConfig {
    /// Piece a pawn turns into when it reaches the last rank
    pub promote_to: PromotePiece,
}

impl GameConfig {
    #[inline]
    pub fn with_promote_to(mut self, piece: PromotePiece) -> Self {
        self.promote_to = piece;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            promote_to: PromotePiece::Queen,
        }
    }
}

/// Options of the [`Searcher`](crate::search::Searcher)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SearchConfig {
    /// Number of plies to look ahead
    pub depth: u32,
    /// Initial lower bound of the alpha-beta window
    pub alpha: i32,
    /// Initial upper bound of the alpha-beta window
    pub beta: i32,
}

impl SearchConfig {
    #[inline]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    #[inline]
    pub fn with_bounds(mut self, alpha: i32, beta: i32) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Checks that the search can be run with these options
    ///
    /// The depth must be positive and the window must be non-empty.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.depth == 0 {
            return Err(SearchError::BadDepth(self.depth));
        }
        if self.alpha >= self.beta {
            return Err(SearchError::BadBounds {
                alpha: self.alpha,
                beta: self.beta,
            });
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: DEFAULT_DEPTH,
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
        }
    }
}
