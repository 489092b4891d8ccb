//! Deck generation: records in, card images out
//!
//! Records are processed strictly in input order. A record that cannot be
//! turned into cards is reported as skipped and the run moves on; only
//! configuration problems and output name collisions abort the run.

use crate::composer::build_plans;
use crate::fetch::PhotoFetcher;
use crate::naming::{ArtifactNames, card_file_name};
use crate::options::CardOptions;
use crate::plan::{Compositor, ImageSource};
use crate::stats::StatSource;
use crate::types::*;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why a record produced no cards.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoHandle,
    NoPhoto,
    NoQuestions,
    Fetch(String),
    InvalidPhoto(String),
    Render(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoHandle => write!(f, "no handle"),
            SkipReason::NoPhoto => write!(f, "no photo"),
            SkipReason::NoQuestions => write!(f, "no usable questions"),
            SkipReason::Fetch(msg) => write!(f, "photo fetch failed: {msg}"),
            SkipReason::InvalidPhoto(msg) => write!(f, "unreadable photo: {msg}"),
            SkipReason::Render(msg) => write!(f, "render failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the record in the input
    pub index: usize,
    pub handle: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckReport {
    /// Card images in generation order
    pub generated: Vec<PathBuf>,
    pub skipped: Vec<SkippedRecord>,
}

pub struct DeckGenerator<'a, F, C, S> {
    options: &'a CardOptions,
    fetcher: F,
    compositor: C,
    stats: S,
}

impl<'a, F, C, S> DeckGenerator<'a, F, C, S>
where
    F: PhotoFetcher,
    C: Compositor,
    S: StatSource,
{
    pub fn new(options: &'a CardOptions, fetcher: F, compositor: C, stats: S) -> Self {
        Self {
            options,
            fetcher,
            compositor,
            stats,
        }
    }

    pub fn into_compositor(self) -> C {
        self.compositor
    }

    /// Generate cards for every record into `output_dir`.
    pub fn generate(&mut self, records: &[PersonRecord], output_dir: &Path) -> Result<DeckReport> {
        self.options.validate()?;
        std::fs::create_dir_all(output_dir)?;

        let mut names = ArtifactNames::new();
        let mut report = DeckReport::default();

        for (index, record) in records.iter().enumerate() {
            log::info!(
                "Processing record {} of {} ({})",
                index + 1,
                records.len(),
                record.display_handle()
            );

            match self.generate_record(record, output_dir, &mut names) {
                Ok(paths) => {
                    log::info!("{}: {} cards", record.display_handle(), paths.len());
                    report.generated.extend(paths);
                }
                Err(RecordFailure::Skip(reason)) => {
                    log::warn!("Skipping {}: {}", record.display_handle(), reason);
                    report.skipped.push(SkippedRecord {
                        index,
                        handle: record.handle.clone(),
                        reason,
                    });
                }
                Err(RecordFailure::Fatal(err)) => return Err(err),
            }
        }

        Ok(report)
    }

    fn generate_record(
        &mut self,
        record: &PersonRecord,
        output_dir: &Path,
        names: &mut ArtifactNames,
    ) -> std::result::Result<Vec<PathBuf>, RecordFailure> {
        let handle = record.normalized_handle();
        if handle.is_empty() {
            return Err(RecordFailure::Skip(SkipReason::NoHandle));
        }
        let photo = record.photos.first().ok_or(RecordFailure::Skip(SkipReason::NoPhoto))?;
        if record.usable_questions().next().is_none() {
            return Err(RecordFailure::Skip(SkipReason::NoQuestions));
        }

        let bytes = self
            .fetcher
            .fetch(photo)
            .map_err(|e| RecordFailure::Skip(SkipReason::Fetch(e.to_string())))?;
        let dimensions = photo_dimensions(&bytes)
            .map_err(|e| RecordFailure::Skip(SkipReason::InvalidPhoto(e.to_string())))?;

        let plans = build_plans(record, dimensions, self.options, &mut self.stats).map_err(
            |e| match e {
                CardError::InvalidDimensions { .. } => {
                    RecordFailure::Skip(SkipReason::InvalidPhoto(e.to_string()))
                }
                other => RecordFailure::Fatal(other),
            },
        )?;

        let photo: Arc<[u8]> = bytes.into();
        let mut generated = Vec::with_capacity(plans.len());

        for plan in &plans {
            let output = names
                .claim(output_dir, &card_file_name(&handle, &plan.question))
                .map_err(RecordFailure::Fatal)?;
            let composition =
                plan.composition(self.options, ImageSource::Bytes(photo.clone()), &output);
            if let Err(e) = self.compositor.execute(&composition) {
                // A skipped record leaves no cards behind
                generated.push(output);
                discard(&generated);
                return Err(RecordFailure::Skip(SkipReason::Render(e.to_string())));
            }
            log::debug!("Card written: {}", output.display());
            generated.push(output);
        }

        Ok(generated)
    }
}

/// Remove card files of a record that failed part way.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => log::debug!("Removed partial card {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

enum RecordFailure {
    Skip(SkipReason),
    Fatal(CardError),
}

/// Pixel size of an encoded image, read from its header.
pub fn photo_dimensions(bytes: &[u8]) -> Result<Rectangle> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(Rectangle::from((width, height)))
}
