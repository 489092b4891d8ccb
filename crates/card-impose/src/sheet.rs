//! Sheet composition
//!
//! A sheet is one printable page holding a grid of card images. Recto sheets
//! carry the card faces in order; the verso sheet repeats one back image in
//! every cell and serves all recto sheets.

use crate::constants::*;
use crate::layout::{GridLayout, batch};
use crate::options::SheetOptions;
use crate::types::*;
use card_compose::{CompositionOp, CompositionPlan, Compositor, ExportFormat, ImageSource, Layer};
use std::path::{Path, PathBuf};

/// One card image placed on a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub image: PathBuf,
    pub x: u32,
    pub y: u32,
}

/// Placement of card images on one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub page: PixelSize,
    pub card: PixelSize,
    pub cells: Vec<SheetCell>,
}

impl SheetPlan {
    /// Place `images` into the first cells of `grid`, row-major.
    pub fn new(grid: &GridLayout, images: &[PathBuf]) -> Result<Self> {
        if images.len() > grid.capacity() {
            return Err(ImposeError::CapacityExceeded {
                items: images.len(),
                capacity: grid.capacity(),
            });
        }

        let cells = images
            .iter()
            .zip(&grid.cells)
            .map(|(image, pos)| SheetCell {
                image: image.clone(),
                x: pos.x,
                y: pos.y,
            })
            .collect();

        Ok(Self {
            page: grid.page,
            card: grid.card,
            cells,
        })
    }

    /// Fill every cell of `grid` with the same image.
    pub fn uniform(grid: &GridLayout, image: &Path) -> Self {
        let cells = grid
            .cells
            .iter()
            .map(|pos| SheetCell {
                image: image.to_path_buf(),
                x: pos.x,
                y: pos.y,
            })
            .collect();

        Self {
            page: grid.page,
            card: grid.card,
            cells,
        }
    }

    /// Raster operations that draw this sheet on a white page and export it
    /// as a single-page PDF.
    pub fn composition(&self, output: &Path, dpi: f32, resize_cards: bool) -> CompositionPlan {
        let mut plan = CompositionPlan::new();
        plan.push(CompositionOp::Open {
            layer: Layer::Base,
            source: ImageSource::Blank {
                width: self.page.width,
                height: self.page.height,
            },
        });

        for cell in &self.cells {
            plan.push(CompositionOp::Open {
                layer: Layer::Overlay,
                source: ImageSource::File(cell.image.clone()),
            });
            if resize_cards {
                plan.push(CompositionOp::Resize {
                    layer: Layer::Overlay,
                    width: self.card.width,
                    height: self.card.height,
                });
            }
            plan.push(CompositionOp::Composite {
                x: cell.x,
                y: cell.y,
            });
        }

        plan.push(CompositionOp::Export {
            path: output.to_path_buf(),
            format: ExportFormat::Pdf { dpi },
        });
        plan
    }
}

/// Sheets written by one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetReport {
    /// Recto sheets in page order
    pub rectos: Vec<PathBuf>,
    pub verso: Option<PathBuf>,
}

/// Lay out `card_images` on recto sheets and build the shared verso sheet.
///
/// Card images are placed in the given order. The layout is checked before
/// anything is written, so an overflow leaves `output_dir` untouched.
pub fn render_sheets<C: Compositor>(
    card_images: &[PathBuf],
    verso_image: Option<&Path>,
    options: &SheetOptions,
    compositor: &mut C,
    output_dir: &Path,
) -> Result<SheetReport> {
    options.validate()?;
    let grid = options.grid()?;
    std::fs::create_dir_all(output_dir)?;

    let mut report = SheetReport::default();
    let batches = batch(card_images, grid.capacity())?;
    log::info!(
        "Laying out {} cards on {} sheets ({} per sheet)",
        card_images.len(),
        batches.len(),
        grid.capacity()
    );

    for (index, images) in batches.iter().enumerate() {
        let output = output_dir.join(sheet_file_name(index + 1, Side::Recto));
        let plan = SheetPlan::new(&grid, images)?;
        compositor.execute(&plan.composition(&output, options.dpi, options.resize_cards))?;
        log::info!("Sheet written: {}", output.display());
        report.rectos.push(output);
    }

    if let Some(verso) = verso_image {
        let output = output_dir.join(VERSO_SHEET_NAME);
        render_uniform_sheet(&grid, verso, options, compositor, &output)?;
        report.verso = Some(output);
    }

    Ok(report)
}

/// Build a uniform recto sheet from `recto_image` and, when given, the
/// matching uniform verso sheet.
pub fn render_uniform_sheets<C: Compositor>(
    recto_image: &Path,
    verso_image: Option<&Path>,
    options: &SheetOptions,
    compositor: &mut C,
    output_dir: &Path,
) -> Result<SheetReport> {
    options.validate()?;
    let grid = options.grid()?;
    std::fs::create_dir_all(output_dir)?;

    let recto = output_dir.join(UNIFORM_RECTO_SHEET_NAME);
    render_uniform_sheet(&grid, recto_image, options, compositor, &recto)?;
    let mut report = SheetReport {
        rectos: vec![recto],
        verso: None,
    };

    if let Some(verso) = verso_image {
        let output = output_dir.join(VERSO_SHEET_NAME);
        render_uniform_sheet(&grid, verso, options, compositor, &output)?;
        report.verso = Some(output);
    }

    Ok(report)
}

/// Write one sheet with `image` in every cell.
pub fn render_uniform_sheet<C: Compositor>(
    grid: &GridLayout,
    image: &Path,
    options: &SheetOptions,
    compositor: &mut C,
    output: &Path,
) -> Result<()> {
    let plan = SheetPlan::uniform(grid, image);
    compositor.execute(&plan.composition(output, options.dpi, options.resize_cards))?;
    log::info!("Uniform sheet written: {}", output.display());
    Ok(())
}
