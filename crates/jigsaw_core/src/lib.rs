//! Progressive jigsaw board driven by daily task completion.
//!
//! Pieces start hidden, get revealed one by one as tasks are completed, and
//! are locked into place either by dragging them close to their slot or by
//! auto-assembly once every task for the day is done.

mod board;
pub use board::*;

mod calendar;
pub use calendar::CalendarDay;

mod drag;
pub use drag::*;

mod error;
pub use error::PuzzleError;

pub mod geometry;
pub use geometry::GridSize;

pub mod journal;

mod piece;
pub use piece::*;

mod random;
pub use random::RandomSource;

mod rules;
pub use rules::BoardRules;

pub mod tasks;

mod unlock;
pub use unlock::UnlockDriver;
