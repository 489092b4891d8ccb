//! Trading card composition
//!
//! Turns person records into card images: cover-fit photo placement, caption
//! wrapping, stat generation and the composition plans that a
//! [`Compositor`] renders.

pub mod composer;
pub mod deck;
pub mod fetch;
pub mod geometry;
pub mod naming;
mod options;
pub mod plan;
pub mod records;
pub mod render;
pub mod stats;
mod types;
pub mod wrap;

pub use composer::{CardPlan, build_plans, resolve_template};
pub use deck::{DeckGenerator, DeckReport, SkipReason, SkippedRecord, photo_dimensions};
pub use fetch::{HttpFetcher, PhotoFetcher};
pub use geometry::{CoverFit, fit};
pub use options::*;
pub use plan::{
    Anchor, CompositionOp, CompositionPlan, Compositor, ExportFormat, ImageSource, Layer,
    RecordingCompositor, TextStyle,
};
pub use records::load_records;
pub use render::RasterCompositor;
pub use stats::{RandomStats, StatSource, compute_stat};
pub use types::*;
pub use wrap::{MAX_LINES, WrappedText, wrap};
