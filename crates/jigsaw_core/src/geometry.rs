//! Pure mapping from grid cells to board percentages.
//!
//! All positions are expressed as percentages of the board's width and
//! height, with the origin at the top-left corner and `y` growing downwards.

use core::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{PuzzleError, RandomSource};

pub const MIN_GRID_SIZE: u32 = 3;
pub const MAX_GRID_SIZE: u32 = 5;

/// Side length of a square puzzle, validated to `3..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridSize(u32);

impl GridSize {
    pub fn new(size: u32) -> Result<Self, PuzzleError> {
        if size < MIN_GRID_SIZE || size > MAX_GRID_SIZE {
            return Err(PuzzleError::GridSizeOutOfRange(size));
        }
        Ok(Self(size))
    }

    /// Picks one of the supported sizes uniformly.
    pub fn random(rng: &mut impl RandomSource) -> Self {
        let span = (MAX_GRID_SIZE - MIN_GRID_SIZE + 1) as usize;
        Self(MIN_GRID_SIZE + rng.below(span) as u32)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn total_pieces(self) -> usize {
        (self.0 * self.0) as usize
    }

    pub fn piece_extent(self) -> f32 {
        piece_extent_percent(self.0)
    }

    pub fn target(self, row: u32, col: u32) -> Vec2 {
        target_position(self.0, row, col)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(MIN_GRID_SIZE)
    }
}

impl TryFrom<u32> for GridSize {
    type Error = PuzzleError;

    fn try_from(size: u32) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<GridSize> for u32 {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

impl Display for GridSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.0)
    }
}

/// Width (and height) of one piece as a percentage of the board.
pub fn piece_extent_percent(grid_size: u32) -> f32 {
    assert!(grid_size > 0, "grid size must be positive");
    100. / grid_size as f32
}

/// Top-left corner of the slot at `(row, col)`.
pub fn target_position(grid_size: u32, row: u32, col: u32) -> Vec2 {
    let extent = piece_extent_percent(grid_size);
    Vec2::new(col as f32 * extent, row as f32 * extent)
}

/// Fractional offset, in percent, used to sample the `(row, col)` tile of an
/// image scaled to `grid_size` times the piece size.
///
/// Follows CSS `background-position` semantics: `0%` aligns the left edges,
/// `100%` aligns the right edges.
pub fn background_sample_origin(grid_size: u32, row: u32, col: u32) -> Vec2 {
    if grid_size <= 1 {
        return Vec2::ZERO;
    }
    let last = (grid_size - 1) as f32;
    Vec2::new(col as f32 / last * 100., row as f32 / last * 100.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_bounds() {
        assert!(GridSize::new(2).is_err(), "too small");
        assert!(GridSize::new(6).is_err(), "too large");
        for size in MIN_GRID_SIZE..=MAX_GRID_SIZE {
            let grid = GridSize::new(size).expect("supported size");
            assert_eq!(grid.total_pieces(), (size * size) as usize, "square count");
        }
    }

    #[test]
    fn targets_follow_columns_and_rows() {
        let target = target_position(4, 1, 3);
        assert!((target.x - 75.).abs() < 1e-4, "x follows the column");
        assert!((target.y - 25.).abs() < 1e-4, "y follows the row");
    }

    #[test]
    fn sample_origin_spans_full_range() {
        assert_eq!(background_sample_origin(3, 0, 0), Vec2::ZERO, "first tile");
        assert_eq!(background_sample_origin(3, 1, 2), Vec2::new(100., 50.), "last column");
        assert_eq!(background_sample_origin(1, 0, 0), Vec2::ZERO, "single piece");
    }

    #[test]
    #[should_panic(expected = "grid size must be positive")]
    fn zero_grid_is_a_precondition_violation() {
        piece_extent_percent(0);
    }

    #[test]
    fn grid_size_json_is_a_bare_number() {
        let grid: GridSize = serde_json::from_str("4").expect("valid size");
        assert_eq!(grid.get(), 4, "parsed");
        assert!(serde_json::from_str::<GridSize>("9").is_err(), "out of range rejected");
        assert_eq!(grid.to_string(), "4x4", "display");
    }
}
