use tracing::debug;

use crate::{BoardRules, PieceSet, RandomSource};

/// Turns the completed-task count into revealed pieces.
///
/// Unlocking only ever grows: a count that drops (a task un-ticked) leaves
/// the board as it is.
#[derive(Clone, Debug, Default)]
pub struct UnlockDriver {
    last_progress: Option<usize>,
}

impl UnlockDriver {
    /// Reveals pieces up to `min(completed, total)`. Safe to call with the
    /// same count repeatedly. Returns the ids revealed by this call.
    pub fn apply_progress(
        &mut self,
        pieces: &mut PieceSet,
        completed: usize,
        rng: &mut impl RandomSource,
        rules: &BoardRules,
    ) -> Vec<usize> {
        if let Some(last) = self.last_progress.filter(|last| completed < *last) {
            debug!("Progress dropped from {last} to {completed}, keeping revealed pieces");
        }
        self.last_progress = Some(completed);

        let target = completed.min(pieces.total());
        pieces.unlock_next(target, rng, rules)
    }

    /// Forgets the last seen count, used when the board is rebuilt.
    pub fn reset(&mut self) {
        self.last_progress = None;
    }

    pub const fn last_progress(&self) -> Option<usize> {
        self.last_progress
    }
}
