use bevy::prelude::*;
use tracing::{debug, info};

use crate::{BoardRules, PieceSet};

/// One pointer-down to pointer-up cycle on a single piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
    pub piece_id: usize,
    /// Pointer position, in client coordinates, when the gesture started.
    pub pointer_start: Vec2,
    /// Piece position, in board percentages, when the gesture started.
    pub piece_start: Vec2,
    /// Z-index restored when the piece is dropped without snapping.
    pub resting_z: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragOutcome {
    /// No gesture was active.
    Ignored,
    /// Released close enough to its slot, now locked there.
    Locked { piece_id: usize, position: Vec2 },
    /// Released elsewhere, left where it was dropped.
    Dropped { piece_id: usize, position: Vec2 },
}

/// Owns the single active drag gesture of a board.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    gesture: Option<DragGesture>,
}

impl InteractionController {
    /// Starts dragging `piece_id`. Rejected when read-only, when another
    /// gesture is active, or when the piece is hidden or already locked.
    pub fn begin(
        &mut self,
        pieces: &mut PieceSet,
        piece_id: usize,
        pointer: Vec2,
        read_only: bool,
        rules: &BoardRules,
    ) -> bool {
        if read_only || self.gesture.is_some() {
            return false;
        }
        let Some(piece) = pieces.get(piece_id).filter(|piece| piece.is_movable()) else {
            return false;
        };

        self.gesture = Some(DragGesture {
            piece_id,
            pointer_start: pointer,
            piece_start: piece.position,
            resting_z: piece.z_index,
        });
        pieces.set_z(piece_id, rules.dragging_z);
        debug!("Dragging piece {piece_id}");
        true
    }

    /// Follows the pointer. `board` is the on-screen rectangle of the board in
    /// the same client coordinates as `pointer`; the piece is not clamped to it.
    pub fn drag_to(&mut self, pieces: &mut PieceSet, pointer: Vec2, board: Rect) -> bool {
        let Some(gesture) = self.gesture else {
            return false;
        };
        let size = board.size();
        if size.x <= 0. || size.y <= 0. {
            return false;
        }
        let delta = (pointer - gesture.pointer_start) / size * 100.;
        pieces.move_unlocked(gesture.piece_id, gesture.piece_start + delta)
    }

    /// Ends the gesture, on release and on cancellation alike, and runs the
    /// snap test.
    pub fn end(&mut self, pieces: &mut PieceSet, rules: &BoardRules) -> DragOutcome {
        let Some(gesture) = self.gesture.take() else {
            return DragOutcome::Ignored;
        };
        let grid = pieces.grid();
        let Some(piece) = pieces.get(gesture.piece_id) else {
            return DragOutcome::Ignored;
        };
        let (distance, target, dropped_at) =
            (piece.distance_to_target(grid), piece.target(grid), piece.position);

        if distance < rules.snap_threshold {
            pieces.lock_piece(gesture.piece_id, target, rules);
            info!("Piece {} snapped into place", gesture.piece_id);
            DragOutcome::Locked {
                piece_id: gesture.piece_id,
                position: target,
            }
        } else {
            pieces.set_z(gesture.piece_id, gesture.resting_z);
            DragOutcome::Dropped {
                piece_id: gesture.piece_id,
                position: dropped_at,
            }
        }
    }

    pub const fn active(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    pub const fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Puts the dragged piece back where and how high it was when the
    /// gesture started, without a snap test.
    pub fn abandon(&mut self, pieces: &mut PieceSet) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        pieces.move_unlocked(gesture.piece_id, gesture.piece_start);
        pieces.set_z(gesture.piece_id, gesture.resting_z);
        true
    }

    /// Drops the gesture without touching any piece, for board rebuilds.
    pub fn clear(&mut self) {
        self.gesture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridSize;
    use crate::random::testing::Sequence;

    const BOARD: Rect = Rect {
        min: Vec2::new(10., 10.),
        max: Vec2::new(410., 410.),
    };

    fn board_with_revealed(count: usize, sample: f32) -> (PieceSet, BoardRules) {
        let rules = BoardRules::default();
        let mut pieces = PieceSet::new(GridSize::default(), &rules);
        pieces.unlock_next(count, &mut Sequence::new(&[sample]), &rules);
        (pieces, rules)
    }

    #[test]
    fn drag_converts_pixels_to_percent() {
        let (mut pieces, rules) = board_with_revealed(1, 0.5);
        let start = pieces.get(0).map(|piece| piece.position).expect("piece 0");
        let mut controller = InteractionController::default();

        assert!(controller.begin(&mut pieces, 0, Vec2::new(100., 100.), false, &rules), "begins");
        assert_eq!(pieces.get(0).map(|piece| piece.z_index), Some(100), "raised");
        assert!(controller.drag_to(&mut pieces, Vec2::new(140., 60.), BOARD), "moves");

        let moved = pieces.get(0).map(|piece| piece.position).expect("piece 0");
        assert!(moved.distance(start + Vec2::new(10., -10.)) < 1e-4, "40px of 400px is 10%");
    }

    #[test]
    fn drag_is_not_clamped_to_the_board() {
        let (mut pieces, rules) = board_with_revealed(1, 0.5);
        let mut controller = InteractionController::default();
        controller.begin(&mut pieces, 0, Vec2::ZERO, false, &rules);
        controller.drag_to(&mut pieces, Vec2::new(-2000., 0.), BOARD);
        let position = pieces.get(0).map(|piece| piece.position).expect("piece 0");
        assert!(position.x < -400., "left of the board");
    }

    #[test]
    fn release_far_from_target_keeps_the_drop() {
        let (mut pieces, rules) = board_with_revealed(1, 0.5);
        let mut controller = InteractionController::default();
        controller.begin(&mut pieces, 0, Vec2::ZERO, false, &rules);

        let outcome = controller.end(&mut pieces, &rules);
        let piece = pieces.get(0).expect("piece 0");
        assert!(matches!(outcome, DragOutcome::Dropped { piece_id: 0, .. }), "dropped");
        assert!(piece.is_scattered && !piece.is_locked, "still scattered");
        assert_eq!(piece.z_index, 10, "back to its scatter tier");
        assert!(!controller.is_dragging(), "gesture discarded");
    }

    #[test]
    fn second_gesture_and_locked_pieces_are_rejected() {
        let (mut pieces, rules) = board_with_revealed(2, 0.0);
        let mut controller = InteractionController::default();
        assert!(controller.begin(&mut pieces, 0, Vec2::ZERO, false, &rules), "first gesture");
        assert!(!controller.begin(&mut pieces, 1, Vec2::ZERO, false, &rules), "one at a time");

        // Piece 0 starts on its own slot, so releasing it locks it.
        assert!(matches!(controller.end(&mut pieces, &rules), DragOutcome::Locked { piece_id: 0, .. }), "locks");
        assert!(!controller.begin(&mut pieces, 0, Vec2::ZERO, false, &rules), "locked piece");
        assert!(!controller.begin(&mut pieces, 5, Vec2::ZERO, false, &rules), "hidden piece");
        assert!(!controller.begin(&mut pieces, 1, Vec2::ZERO, true, &rules), "read-only");
        assert_eq!(controller.end(&mut pieces, &rules), DragOutcome::Ignored, "nothing to end");
    }

    #[test]
    fn zero_sized_board_ignores_moves() {
        let (mut pieces, rules) = board_with_revealed(1, 0.5);
        let mut controller = InteractionController::default();
        controller.begin(&mut pieces, 0, Vec2::ZERO, false, &rules);
        let collapsed = Rect::from_corners(Vec2::ZERO, Vec2::new(0., 300.));
        assert!(!controller.drag_to(&mut pieces, Vec2::new(50., 50.), collapsed), "no size");
    }
}
