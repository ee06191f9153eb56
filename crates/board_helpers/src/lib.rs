mod app;
pub use app::*;

pub mod input;
