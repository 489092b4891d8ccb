//! Grid layout calculation
//!
//! Cards are laid out in a fixed grid inside a uniform page margin. The
//! leftover space is spread evenly between columns and between rows.

use crate::types::{Axis, ImposeError, PixelSize, Result};

use super::{CellPosition, GridLayout, GridPosition};

// =============================================================================
// Grid Creation
// =============================================================================

/// Create the card grid for one sheet.
///
/// # Arguments
/// * `page` - Sheet size in pixels
/// * `card` - Card size in pixels
/// * `rows` - Number of card rows
/// * `cols` - Number of card columns
/// * `margin` - Margin kept clear on every page edge, in pixels
///
/// # Errors
/// `LayoutOverflow` when the cards and margins do not fit the page, `Config`
/// for an empty grid.
pub fn create_grid_layout(
    page: PixelSize,
    card: PixelSize,
    rows: usize,
    cols: usize,
    margin: u32,
) -> Result<GridLayout> {
    if rows == 0 || cols == 0 {
        return Err(ImposeError::Config(format!(
            "Grid must have at least one row and one column, got {rows}x{cols}"
        )));
    }
    if card.width == 0 || card.height == 0 {
        return Err(ImposeError::Config("Card size must be positive".to_string()));
    }

    let h_gap = gap(Axis::Horizontal, page.width, card.width, cols, margin)?;
    let v_gap = gap(Axis::Vertical, page.height, card.height, rows, margin)?;

    let cells = (0..rows * cols)
        .map(|index| {
            let pos = GridPosition::from_index(index, cols);
            CellPosition::new(
                margin + pos.col as u32 * (card.width + h_gap),
                margin + pos.row as u32 * (card.height + v_gap),
            )
        })
        .collect();

    Ok(GridLayout {
        page,
        card,
        rows,
        cols,
        margin,
        h_gap,
        v_gap,
        cells,
    })
}

/// Spacing between neighbouring cards along one axis.
///
/// The leftover is floor-divided between the `count - 1` gaps. A single card
/// has no gap, but must still fit between the margins.
fn gap(axis: Axis, page: u32, card: u32, count: usize, margin: u32) -> Result<u32> {
    let required = 2 * margin as u64 + count as u64 * card as u64;
    let leftover = page as i64 - required as i64;
    if leftover < 0 {
        return Err(ImposeError::LayoutOverflow {
            axis,
            required: required.min(u32::MAX as u64) as u32,
            available: page,
        });
    }

    if count == 1 {
        return Ok(0);
    }
    Ok((leftover as u64 / (count as u64 - 1)) as u32)
}

// =============================================================================
// Batching
// =============================================================================

/// Split `items` into consecutive batches of `capacity`, the last one possibly
/// shorter. Order is preserved.
pub fn batch<T: Clone>(items: &[T], capacity: usize) -> Result<Vec<Vec<T>>> {
    if capacity == 0 {
        return Err(ImposeError::Config(
            "Batch capacity must be positive".to_string(),
        ));
    }
    Ok(items.chunks(capacity).map(<[T]>::to_vec).collect())
}

// =============================================================================
// Tests
// =============================================================================
