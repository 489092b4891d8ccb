//! Composition plans
//!
//! A plan is an ordered list of raster operations with exact integer
//! geometry. Plans are built here and executed by a [`Compositor`]; nothing
//! in this module touches pixels.

use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Working image a plan operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The image being built and finally exported
    Base,
    /// An image that gets composited onto the base
    Overlay,
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    File(PathBuf),
    Bytes(Arc<[u8]>),
    /// Opaque white canvas
    Blank { width: u32, height: u32 },
}

/// Reference point for text placement, like ImageMagick gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// Offset from the top-left corner to the text's top-left corner
    NorthWest,
    /// Offset from the top-right corner to the text's top-right corner
    NorthEast,
    /// Offset from the image center to the text block's center
    Center,
}

/// Font and placement for one kind of annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// TrueType font file
    pub font: PathBuf,
    /// Font size in pixels
    pub size: f32,
    /// RGBA fill color
    pub color: [u8; 4],
    pub anchor: Anchor,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Png,
    /// Single-page PDF, page size derived from pixel size and dpi
    Pdf { dpi: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompositionOp {
    Open {
        layer: Layer,
        source: ImageSource,
    },
    /// Resize to exactly `width` x `height`, ignoring aspect ratio
    Resize {
        layer: Layer,
        width: u32,
        height: u32,
    },
    Crop {
        layer: Layer,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Draw the overlay over the base with its top-left corner at `(x, y)`
    Composite { x: u32, y: u32 },
    /// Draw `text` on the base. Lines are separated by `\n`.
    Annotate { text: String, style: TextStyle },
    Export { path: PathBuf, format: ExportFormat },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionPlan {
    pub ops: Vec<CompositionOp>,
}

impl CompositionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: CompositionOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Output path of the final export, if the plan has one.
    pub fn output(&self) -> Option<&PathBuf> {
        self.ops.iter().rev().find_map(|op| match op {
            CompositionOp::Export { path, .. } => Some(path),
            _ => None,
        })
    }
}

/// Executes composition plans.
pub trait Compositor {
    fn execute(&mut self, plan: &CompositionPlan) -> Result<()>;
}

/// Compositor that only records the plans it receives.
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    pub plans: Vec<CompositionPlan>,
}

impl Compositor for RecordingCompositor {
    fn execute(&mut self, plan: &CompositionPlan) -> Result<()> {
        self.plans.push(plan.clone());
        Ok(())
    }
}
