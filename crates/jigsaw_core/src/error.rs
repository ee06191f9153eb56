use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::{MAX_GRID_SIZE, MIN_GRID_SIZE};

#[derive(Error, Debug)]
pub enum PuzzleError {
    #[error(
        "Grid size {0} is outside the supported range {min}..={max}",
        min = MIN_GRID_SIZE,
        max = MAX_GRID_SIZE
    )]
    GridSizeOutOfRange(u32),

    #[error("Invalid calendar day {0:?}, expected YYYY-MM-DD")]
    InvalidDay(String),

    #[error("Could not access journal file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Journal data is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("Generator failed: {0}")]
    Generator(String),
}
