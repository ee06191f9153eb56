use bevy::prelude::*;
use tracing::debug;

use crate::geometry::GridSize;
use crate::{BoardRules, RandomSource};

/// One tile of the puzzle image.
#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    /// `correct_row * grid_size + correct_col`.
    pub id: usize,
    pub correct_row: u32,
    pub correct_col: u32,
    /// Top-left corner in board percentages. Only meaningful once unlocked.
    pub position: Vec2,
    pub is_unlocked: bool,
    pub is_locked: bool,
    /// Revealed but not yet placed.
    pub is_scattered: bool,
    pub z_index: i32,
}

impl Piece {
    fn hidden(id: usize, correct_row: u32, correct_col: u32, rules: &BoardRules) -> Self {
        Self {
            id,
            correct_row,
            correct_col,
            position: Vec2::ZERO,
            is_unlocked: false,
            is_locked: false,
            is_scattered: false,
            z_index: rules.locked_z,
        }
    }

    /// Can be picked up by a drag.
    pub const fn is_movable(&self) -> bool {
        self.is_unlocked && !self.is_locked
    }

    pub fn target(&self, grid: GridSize) -> Vec2 {
        grid.target(self.correct_row, self.correct_col)
    }

    /// Euclidean distance in percentage points between where the piece is and
    /// where it belongs.
    pub fn distance_to_target(&self, grid: GridSize) -> f32 {
        self.position.distance(self.target(grid))
    }
}

/// Every piece of one board, in row-major order so that index == id.
#[derive(Clone, Debug)]
pub struct PieceSet {
    grid: GridSize,
    pieces: Vec<Piece>,
}

impl PieceSet {
    pub fn new(grid: GridSize, rules: &BoardRules) -> Self {
        Self {
            grid,
            pieces: Self::layout(grid, rules),
        }
    }

    /// Throws away every piece and lays out a fresh, fully hidden board.
    pub fn initialize(&mut self, grid: GridSize, rules: &BoardRules) {
        self.grid = grid;
        self.pieces = Self::layout(grid, rules);
    }

    fn layout(grid: GridSize, rules: &BoardRules) -> Vec<Piece> {
        let size = grid.get();
        (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .enumerate()
            .map(|(id, (row, col))| Piece::hidden(id, row, col, rules))
            .collect()
    }

    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn get(&self, id: usize) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn total(&self) -> usize {
        self.pieces.len()
    }

    pub fn unlocked_count(&self) -> usize {
        self.pieces.iter().filter(|piece| piece.is_unlocked).count()
    }

    pub fn locked_count(&self) -> usize {
        self.pieces.iter().filter(|piece| piece.is_locked).count()
    }

    /// Reveals hidden pieces, lowest id first, until `how_many` (clamped to
    /// the board size) are unlocked. Already revealed pieces keep their
    /// position. Returns the ids revealed by this call.
    pub fn unlock_next(
        &mut self,
        how_many: usize,
        rng: &mut impl RandomSource,
        rules: &BoardRules,
    ) -> Vec<usize> {
        let target = how_many.min(self.total());
        let missing = target.saturating_sub(self.unlocked_count());
        if missing == 0 {
            return Vec::new();
        }

        let span = 100. - self.grid.piece_extent();
        let mut revealed = Vec::with_capacity(missing);
        for piece in self
            .pieces
            .iter_mut()
            .filter(|piece| !piece.is_unlocked)
            .take(missing)
        {
            piece.is_unlocked = true;
            piece.is_scattered = true;
            piece.position = Vec2::new(rng.unit() * span, rng.unit() * span);
            piece.z_index = rules.scattered_z(piece.id);
            revealed.push(piece.id);
        }
        debug!("Revealed pieces {revealed:?}");
        revealed
    }

    /// Places the piece at `position` for good.
    pub fn lock_piece(&mut self, id: usize, position: Vec2, rules: &BoardRules) -> bool {
        let Some(piece) = self.pieces.get_mut(id) else {
            return false;
        };
        piece.position = position;
        piece.is_locked = true;
        piece.is_scattered = false;
        piece.z_index = rules.locked_z;
        true
    }

    /// Moves a revealed, not yet locked piece. Positions are not clamped.
    pub fn move_unlocked(&mut self, id: usize, position: Vec2) -> bool {
        match self.pieces.get_mut(id) {
            Some(piece) if piece.is_movable() => {
                piece.position = position;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_z(&mut self, id: usize, z_index: i32) {
        if let Some(piece) = self.pieces.get_mut(id) {
            piece.z_index = z_index;
        }
    }

    /// Locks every piece on its own slot in one step.
    pub fn lock_all_at_targets(&mut self, rules: &BoardRules) {
        let grid = self.grid;
        for piece in &mut self.pieces {
            piece.position = piece.target(grid);
            piece.is_locked = true;
            piece.is_scattered = false;
            piece.z_index = rules.locked_z;
        }
    }

    /// Non-empty and every piece locked.
    pub fn is_complete(&self) -> bool {
        !self.pieces.is_empty() && self.pieces.iter().all(|piece| piece.is_locked)
    }

    /// Topmost movable piece whose square covers `point` (board percentages).
    pub fn piece_at(&self, point: Vec2) -> Option<usize> {
        let extent = self.grid.piece_extent();
        self.pieces
            .iter()
            .filter(|piece| piece.is_movable())
            .filter(|piece| {
                Rect::from_corners(piece.position, piece.position + Vec2::splat(extent))
                    .contains(point)
            })
            .max_by_key(|piece| piece.z_index)
            .map(|piece| piece.id)
    }
}
