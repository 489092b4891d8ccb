//! Series document merging
//!
//! Each series job is concatenated into one PDF. Pages are copied object by
//! object and streams are never re-encoded.

use crate::series::SeriesJob;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Concatenates the documents of a series job into one output file.
pub trait DocumentMerger {
    fn merge(&self, job: &SeriesJob, output: &Path) -> Result<()>;
}

// =============================================================================
// In-process merge
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfMerger;

impl DocumentMerger for LopdfMerger {
    fn merge(&self, job: &SeriesJob, output: &Path) -> Result<()> {
        let mut merged = merge_job(job)?;
        merged.compress();
        let mut writer = Vec::new();
        merged.save_to(&mut writer)?;
        std::fs::write(output, writer)?;
        Ok(())
    }
}

/// Build the merged document for `job` in memory.
pub fn merge_job(job: &SeriesJob) -> Result<Document> {
    if job.entries.is_empty() {
        return Err(ImposeError::NoPages);
    }

    let mut output = Document::with_version("1.5");
    let pages_id = output.new_object_id();

    // A document used several times (the verso) is loaded once and its shared
    // objects are copied once.
    let mut sources: HashMap<&Path, (Document, HashMap<ObjectId, ObjectId>)> = HashMap::new();
    let mut kids = Vec::new();

    for entry in &job.entries {
        let path = entry.document.as_path();
        if !sources.contains_key(path) {
            let doc = Document::load(path)?;
            sources.insert(path, (doc, HashMap::new()));
        }
        let Some((source, cache)) = sources.get_mut(path) else {
            continue;
        };

        let pages = source.get_pages();
        if pages.is_empty() {
            return Err(ImposeError::Config(format!(
                "{} has no pages",
                path.display()
            )));
        }
        for page_id in pages.into_values() {
            let page = copy_page(&mut output, source, page_id, pages_id, cache)?;
            kids.push(Object::Reference(page));
        }
    }

    let count = kids.len() as i64;
    output.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ])),
    );
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    Ok(output)
}

/// Copy one page under a new parent, resolving inherited attributes.
fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    parent: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page = source.get_dictionary(page_id)?;

    let mut copied = Dictionary::new();
    for (key, value) in page.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        copied.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }

    for key in INHERITABLE {
        if copied.has(key) {
            continue;
        }
        if let Some(value) = inherited(source, page, key) {
            copied.set(key.to_vec(), copy_object_deep(output, source, &value, cache)?);
        }
    }
    copied.set("Parent", Object::Reference(parent));

    Ok(output.add_object(copied))
}

/// Look up `key` on the ancestors of `page`.
fn inherited(source: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut node = page;
    // Bounded walk; malformed files can contain parent cycles
    for _ in 0..64 {
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = source.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
    }
    None
}

/// Deep copy an object into `output`, following references.
///
/// `cache` maps source ids to ids already copied into `output`.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            // Reserve the id first so self-references terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);
            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let items: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(items?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut copied = Dictionary::new();
    for (key, value) in dict.iter() {
        copied.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(copied)
}

// =============================================================================
// External merge
// =============================================================================

/// Merges with the `qpdf` command line tool.
#[derive(Debug, Clone)]
pub struct QpdfMerger {
    pub program: PathBuf,
}

impl Default for QpdfMerger {
    fn default() -> Self {
        Self {
            program: PathBuf::from("qpdf"),
        }
    }
}

impl DocumentMerger for QpdfMerger {
    fn merge(&self, job: &SeriesJob, output: &Path) -> Result<()> {
        let result = Command::new(&self.program)
            .arg("--empty")
            .arg("--pages")
            .args(job.entries.iter().map(|e| e.document.as_os_str()))
            .arg("--")
            .arg(output)
            .output()
            .map_err(|e| ImposeError::MergeFailure {
                job: job.number,
                message: format!("failed to start {}: {}", self.program.display(), e),
            })?;

        if !result.status.success() {
            return Err(ImposeError::MergeFailure {
                job: job.number,
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    result.status,
                    String::from_utf8_lossy(&result.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Running jobs
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FailedSeries {
    pub number: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesReport {
    /// Series documents in job order
    pub produced: Vec<PathBuf>,
    pub failed: Vec<FailedSeries>,
}

/// Merge every job into `output_dir`, in order.
///
/// A failing job is recorded and the remaining jobs still run.
pub async fn run_series<M>(
    jobs: Vec<SeriesJob>,
    merger: Arc<M>,
    output_dir: &Path,
) -> Result<SeriesReport>
where
    M: DocumentMerger + Send + Sync + 'static,
{
    tokio::fs::create_dir_all(output_dir).await?;
    let mut report = SeriesReport::default();

    for job in jobs {
        let output = output_dir.join(job.file_name());
        let number = job.number;
        let merger = Arc::clone(&merger);
        let target = output.clone();

        let result = tokio::task::spawn_blocking(move || merger.merge(&job, &target))
            .await
            .map_err(ImposeError::from)
            .and_then(|r| r);

        match result {
            Ok(()) => {
                log::info!("Series written: {}", output.display());
                report.produced.push(output);
            }
            Err(e) => {
                log::warn!("Series {} failed: {}", number, e);
                report.failed.push(FailedSeries {
                    number,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}
