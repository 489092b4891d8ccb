//! Shared constants for sheet layout and printing

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Convert millimeters to whole pixels at `dpi`, rounded to the nearest pixel
#[inline]
pub fn mm_to_px(mm: f32, dpi: f32) -> u32 {
    (mm * dpi / MM_PER_INCH).round() as u32
}

// =============================================================================
// Print Defaults
// =============================================================================

/// Raster resolution of sheets (dots per inch)
pub const DEFAULT_DPI: f32 = 300.0;

/// Trading card width (mm)
pub const CARD_WIDTH_MM: f32 = 63.0;

/// Trading card height (mm)
pub const CARD_HEIGHT_MM: f32 = 88.0;

/// Cutting margin around the card grid (pixels)
pub const DEFAULT_MARGIN_PX: u32 = 60;

/// Upper bound on pages in one series document
pub const DEFAULT_MAX_PAGES_PER_JOB: usize = 50;

// =============================================================================
// Output Names
// =============================================================================

/// Verso sheet shared by every recto sheet
pub const VERSO_SHEET_NAME: &str = "verso_all_page.pdf";

/// Recto sheet of one repeated image
pub const UNIFORM_RECTO_SHEET_NAME: &str = "recto_all_page.pdf";

/// Sheet document for a 1-based page index and side
pub fn sheet_file_name(page: usize, side: crate::types::Side) -> String {
    format!("page_{}_{}.pdf", page, side.name())
}

/// Series document for a 1-based series number
pub fn series_file_name(number: usize) -> String {
    format!("series_{}.pdf", number)
}
