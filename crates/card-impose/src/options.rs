use crate::constants::*;
use crate::layout::{GridLayout, create_grid_layout};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sheet layout configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetOptions {
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub dpi: f32,

    // Card size on paper
    pub card_width_mm: f32,
    pub card_height_mm: f32,

    /// Clear border on every page edge (pixels)
    pub margin_px: u32,
    pub rows: usize,
    pub columns: usize,

    /// Scale each card image to the card size before placing it
    pub resize_cards: bool,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            dpi: DEFAULT_DPI,
            card_width_mm: CARD_WIDTH_MM,
            card_height_mm: CARD_HEIGHT_MM,
            margin_px: DEFAULT_MARGIN_PX,
            rows: 3,
            columns: 3,
            resize_cards: true,
        }
    }
}

impl SheetOptions {
    pub fn page_px(&self) -> PixelSize {
        self.paper_size.pixels(self.orientation, self.dpi)
    }

    pub fn card_px(&self) -> PixelSize {
        PixelSize::new(
            mm_to_px(self.card_width_mm, self.dpi),
            mm_to_px(self.card_height_mm, self.dpi),
        )
    }

    /// Grid for these options; fails when the cards do not fit the page
    pub fn grid(&self) -> Result<GridLayout> {
        create_grid_layout(
            self.page_px(),
            self.card_px(),
            self.rows,
            self.columns,
            self.margin_px,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dpi > 0.0) {
            return Err(ImposeError::Config(format!(
                "DPI must be positive, got {}",
                self.dpi
            )));
        }
        if !(self.card_width_mm > 0.0 && self.card_height_mm > 0.0) {
            return Err(ImposeError::Config(format!(
                "Card size must be positive, got {}x{}mm",
                self.card_width_mm, self.card_height_mm
            )));
        }
        self.grid().map(|_| ())
    }
}

/// How verso pages are combined with recto pages in a series document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterleaveMode {
    /// Every recto page is followed by the verso page (duplex printing)
    #[default]
    Paired,
    /// Recto pages first, the verso page once at the end
    Appended,
}

/// Tool used to concatenate sheets into series documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MergeBackend {
    /// In-process merge with lopdf
    #[default]
    Lopdf,
    /// External `qpdf` executable
    Qpdf,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SeriesOptions {
    pub mode: InterleaveMode,
    pub max_pages_per_job: usize,
    pub merger: MergeBackend,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            mode: InterleaveMode::Paired,
            max_pages_per_job: DEFAULT_MAX_PAGES_PER_JOB,
            merger: MergeBackend::Lopdf,
        }
    }
}

impl SeriesOptions {
    /// Recto pages that fit one series document
    pub fn rectos_per_job(&self) -> Result<usize> {
        if self.max_pages_per_job < 2 {
            return Err(ImposeError::Config(format!(
                "A series needs room for at least one recto and one verso page, got max {}",
                self.max_pages_per_job
            )));
        }
        Ok(match self.mode {
            InterleaveMode::Paired => self.max_pages_per_job / 2,
            InterleaveMode::Appended => self.max_pages_per_job - 1,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.rectos_per_job().map(|_| ())
    }
}

/// Printing configuration: sheet layout plus series assembly
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrintOptions {
    pub sheets: SheetOptions,
    pub series: SeriesOptions,
}

impl PrintOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ImposeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ImposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.sheets.validate()?;
        self.series.validate()
    }
}
