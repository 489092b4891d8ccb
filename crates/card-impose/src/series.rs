//! Series assembly
//!
//! Recto sheets are grouped into print jobs ("series") that each stay under
//! a page limit. Every series carries the verso sheet, either after each
//! recto page or once at the end.

use crate::constants::series_file_name;
use crate::options::{InterleaveMode, SeriesOptions};
use crate::types::*;
use std::path::{Path, PathBuf};

/// One page source in a series document
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub document: PathBuf,
    pub side: Side,
}

impl SeriesEntry {
    fn recto(document: &Path) -> Self {
        Self {
            document: document.to_path_buf(),
            side: Side::Recto,
        }
    }

    fn verso(document: &Path) -> Self {
        Self {
            document: document.to_path_buf(),
            side: Side::Verso,
        }
    }
}

/// Ordered documents to concatenate into one series file
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesJob {
    /// 1-based series number
    pub number: usize,
    pub entries: Vec<SeriesEntry>,
}

impl SeriesJob {
    pub fn file_name(&self) -> String {
        series_file_name(self.number)
    }

    pub fn recto_count(&self) -> usize {
        self.entries.iter().filter(|e| e.side == Side::Recto).count()
    }

    pub fn page_count(&self) -> usize {
        self.entries.len()
    }
}

/// Split `rectos` into series jobs with the verso interleaved per `options`.
///
/// Recto order is preserved across and within jobs; no job exceeds
/// `max_pages_per_job` pages.
pub fn assemble_series(
    rectos: &[PathBuf],
    verso: &Path,
    options: &SeriesOptions,
) -> Result<Vec<SeriesJob>> {
    if rectos.is_empty() {
        return Err(ImposeError::NoPages);
    }
    let per_job = options.rectos_per_job()?;

    let jobs = rectos
        .chunks(per_job)
        .enumerate()
        .map(|(index, chunk)| {
            let entries = match options.mode {
                InterleaveMode::Paired => chunk
                    .iter()
                    .flat_map(|recto| [SeriesEntry::recto(recto), SeriesEntry::verso(verso)])
                    .collect(),
                InterleaveMode::Appended => chunk
                    .iter()
                    .map(|recto| SeriesEntry::recto(recto))
                    .chain(std::iter::once(SeriesEntry::verso(verso)))
                    .collect(),
            };
            SeriesJob {
                number: index + 1,
                entries,
            }
        })
        .collect();

    Ok(jobs)
}
