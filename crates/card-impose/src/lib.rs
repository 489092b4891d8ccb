mod constants;
pub mod layout;
mod merge;
mod options;
mod series;
mod sheet;
mod stats;
mod types;

pub use constants::*;
pub use layout::{CellPosition, GridLayout, GridPosition, batch, create_grid_layout};
pub use merge::*;
pub use options::*;
pub use series::*;
pub use sheet::*;
pub use stats::calculate_print_statistics;
pub use types::*;
