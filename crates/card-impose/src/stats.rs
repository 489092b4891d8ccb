use crate::options::{InterleaveMode, PrintOptions};
use crate::types::*;

/// Calculate sheet and series counts for printing `cards` card images
pub fn calculate_print_statistics(cards: usize, options: &PrintOptions) -> Result<PrintStatistics> {
    if cards == 0 {
        return Err(ImposeError::NoPages);
    }

    let capacity = options.sheets.grid()?.capacity();
    let rectos_per_job = options.series.rectos_per_job()?;

    let recto_sheets = cards.div_ceil(capacity);
    let blank_cells = recto_sheets * capacity - cards;
    let series_jobs = recto_sheets.div_ceil(rectos_per_job);

    // One verso per recto, or one per job
    let output_pages = match options.series.mode {
        InterleaveMode::Paired => recto_sheets * 2,
        InterleaveMode::Appended => recto_sheets + series_jobs,
    };

    Ok(PrintStatistics {
        cards,
        capacity,
        recto_sheets,
        blank_cells,
        series_jobs,
        output_pages,
    })
}
