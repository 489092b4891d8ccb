//! Sheet layout calculation
//!
//! This module handles the geometry of placing cards on a print sheet:
//! - Grid spacing derived from page size, card size and margins
//! - Cell positions in row-major order
//! - Chunking card lists into per-sheet batches

mod grid;
mod types;

pub use grid::*;
pub use types::*;
