use card_compose::CardError;
use thiserror::Error;

use crate::constants::mm_to_px;

#[derive(Error, Debug)]
pub enum ImposeError {
    #[error("Layout overflow: {axis} needs {required}px but the page has {available}px")]
    LayoutOverflow {
        axis: Axis,
        required: u32,
        available: u32,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("No pages to assemble")]
    NoPages,
    #[error("{items} items do not fit a sheet of {capacity} cells")]
    CapacityExceeded { items: usize, capacity: usize },
    #[error("Series {job} failed: {message}")]
    MergeFailure { job: usize, message: String },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Composition error: {0}")]
    Compose(#[from] CardError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ImposeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("width"),
            Axis::Vertical => f.write_str("height"),
        }
    }
}

/// Printed face of a sheet or card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Recto,
    Verso,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Recto => "recto",
            Side::Verso => "verso",
        }
    }
}

/// Integer size in raster pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Raster size of the sheet at `dpi`
    pub fn pixels(self, orientation: Orientation, dpi: f32) -> PixelSize {
        let (w, h) = self.dimensions_with_orientation(orientation);
        PixelSize::new(mm_to_px(w, dpi), mm_to_px(h, dpi))
    }
}

/// Statistics about a print run
#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatistics {
    /// Card images to place
    pub cards: usize,
    /// Cells per sheet
    pub capacity: usize,
    /// Recto sheets needed
    pub recto_sheets: usize,
    /// Empty cells on the last recto sheet
    pub blank_cells: usize,
    /// Merge jobs the series stage will run
    pub series_jobs: usize,
    /// Pages across all series documents
    pub output_pages: usize,
}
