use bevy::prelude::*;
use tracing::{info, warn};

use crate::{
    BoardRules, DragGesture, DragOutcome, GridSize, InteractionController, Piece, PieceSet,
    RandomSource, UnlockDriver,
};

/// Per-session board settings, fixed when the session is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub grid: GridSize,
    /// Opaque reference to the image the pieces sample.
    pub image: String,
}

/// Committed state changes, queued for the host to drain.
#[derive(Clone, Debug, PartialEq)]
pub enum BoardEvent {
    Rebuilt { grid: GridSize },
    Unlocked { ids: Vec<usize> },
    Dropped { piece_id: usize, position: Vec2 },
    Locked { piece_id: usize },
    AutoAssembled,
    /// The player confirmed the finished board. Sent once per session.
    Archived,
}

/// The board as seen by the rest of the application.
#[derive(Resource, Debug)]
pub struct PuzzleBoard {
    config: BoardConfig,
    rules: BoardRules,
    pieces: PieceSet,
    controller: InteractionController,
    driver: UnlockDriver,
    read_only: bool,
    all_tasks_completed: bool,
    events: Vec<BoardEvent>,
}

impl PuzzleBoard {
    pub fn new(config: BoardConfig, rules: BoardRules) -> Self {
        let pieces = PieceSet::new(config.grid, &rules);
        Self {
            config,
            rules,
            pieces,
            controller: InteractionController::default(),
            driver: UnlockDriver::default(),
            read_only: false,
            all_tasks_completed: false,
            events: Vec::new(),
        }
    }

    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub const fn rules(&self) -> &BoardRules {
        &self.rules
    }

    pub const fn grid(&self) -> GridSize {
        self.config.grid
    }

    pub fn pieces(&self) -> &[Piece] {
        self.pieces.pieces()
    }

    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    pub const fn active_drag(&self) -> Option<&DragGesture> {
        self.controller.active()
    }

    /// Swaps in another session's settings. A different grid size throws the
    /// whole board away; a new image alone keeps the pieces.
    pub fn reconfigure(&mut self, config: BoardConfig) {
        let rebuild = config.grid != self.config.grid;
        self.config = config;
        if rebuild {
            self.rebuild();
        }
    }

    /// Switches to another session: new settings, fresh hidden pieces and
    /// cleared flags, whatever the grid size.
    pub fn load(&mut self, config: BoardConfig) {
        self.config = config;
        self.read_only = false;
        self.all_tasks_completed = false;
        self.rebuild();
    }

    /// Lays out a fresh hidden board for the current grid size.
    pub fn rebuild(&mut self) {
        self.pieces.initialize(self.config.grid, &self.rules);
        self.controller.clear();
        self.driver.reset();
        info!("Board rebuilt as {}", self.config.grid);
        self.events.push(BoardEvent::Rebuilt {
            grid: self.config.grid,
        });
    }

    /// Archived boards are frozen and always shown complete.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if read_only {
            self.controller.abandon(&mut self.pieces);
        }
    }

    pub fn set_all_tasks_completed(&mut self, all_completed: bool) {
        self.all_tasks_completed = all_completed;
    }

    /// Feeds the completed-task count into the board.
    pub fn apply_progress(&mut self, completed: usize, rng: &mut impl RandomSource) {
        if self.read_only {
            return;
        }
        let ids = self
            .driver
            .apply_progress(&mut self.pieces, completed, rng, &self.rules);
        if !ids.is_empty() {
            self.events.push(BoardEvent::Unlocked { ids });
        }
    }

    pub fn begin_drag(&mut self, piece_id: usize, pointer: Vec2) -> bool {
        self.controller
            .begin(&mut self.pieces, piece_id, pointer, self.read_only, &self.rules)
    }

    /// Starts dragging whichever movable piece is on top at `point`, given in
    /// board percentages. `pointer` is the same position in client space.
    pub fn begin_drag_at(&mut self, point: Vec2, pointer: Vec2) -> Option<usize> {
        let piece_id = self.pieces.piece_at(point)?;
        self.begin_drag(piece_id, pointer).then_some(piece_id)
    }

    pub fn drag_to(&mut self, pointer: Vec2, board: Rect) -> bool {
        if self.read_only {
            return false;
        }
        self.controller.drag_to(&mut self.pieces, pointer, board)
    }

    /// Release and cancellation both end up here.
    pub fn end_drag(&mut self) -> DragOutcome {
        let outcome = self.controller.end(&mut self.pieces, &self.rules);
        match outcome {
            DragOutcome::Locked { piece_id, .. } => {
                self.events.push(BoardEvent::Locked { piece_id });
            }
            DragOutcome::Dropped { piece_id, position } => {
                self.events.push(BoardEvent::Dropped { piece_id, position });
            }
            DragOutcome::Ignored => {}
        }
        outcome
    }

    pub fn can_auto_assemble(&self) -> bool {
        !self.read_only
            && self.all_tasks_completed
            && self.pieces.unlocked_count() == self.pieces.total()
            && !self.pieces.is_complete()
    }

    /// Locks every piece on its slot at once.
    pub fn auto_assemble(&mut self) -> bool {
        if !self.can_auto_assemble() {
            return false;
        }
        self.controller.clear();
        self.pieces.lock_all_at_targets(&self.rules);
        info!("Board auto-assembled");
        self.events.push(BoardEvent::AutoAssembled);
        true
    }

    /// Archived boards report complete whatever their pieces say.
    pub fn is_complete(&self) -> bool {
        self.read_only || self.pieces.is_complete()
    }

    pub fn can_archive(&self) -> bool {
        !self.read_only && self.pieces.is_complete()
    }

    /// Confirms a finished board. Freezes it and emits
    /// [`BoardEvent::Archived`] the first time only.
    pub fn archive(&mut self) -> bool {
        if !self.can_archive() {
            if !self.read_only {
                warn!("Archive requested before the board was assembled");
            }
            return false;
        }
        self.set_read_only(true);
        info!("Board archived");
        self.events.push(BoardEvent::Archived);
        true
    }

    pub fn unlocked_count(&self) -> usize {
        self.pieces.unlocked_count()
    }

    pub fn locked_count(&self) -> usize {
        self.pieces.locked_count()
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.total()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Events committed since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        core::mem::take(&mut self.events)
    }
}
