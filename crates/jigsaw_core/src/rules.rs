use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Euclidean distance, in board percentage points, under which a released
/// piece locks into its slot.
pub const SNAP_THRESHOLD: f32 = 15.;
/// Stacking tier of locked (and never revealed) pieces.
pub const LOCKED_Z: i32 = 1;
/// Revealed pieces sit at `SCATTERED_Z_BASE + id`.
pub const SCATTERED_Z_BASE: i32 = 10;
/// Stacking tier of the piece under an active drag.
pub const DRAGGING_Z: i32 = 100;

/// Tunables of the board. Every field falls back to its default when missing
/// from a rules file.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardRules {
    pub snap_threshold: f32,
    pub locked_z: i32,
    pub scattered_z_base: i32,
    pub dragging_z: i32,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            locked_z: LOCKED_Z,
            scattered_z_base: SCATTERED_Z_BASE,
            dragging_z: DRAGGING_Z,
        }
    }
}

impl BoardRules {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn scattered_z(&self, id: usize) -> i32 {
        self.scattered_z_base + id as i32
    }
}
