//! Timeliner API - Shared document types for the Timeliner editing engine.

mod block;
mod document;
mod grid;

pub use block::*;
pub use document::*;
pub use grid::*;
