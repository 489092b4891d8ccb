use crate::types::{Gender, PersonRecord, PhotoRef, Result};
use serde::Deserialize;
use std::path::Path;

/// Load person records from a `.csv` or `.json` file, in file order.
pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<PersonRecord>> {
    let path = path.as_ref().to_owned();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let contents = tokio::fs::read_to_string(&path).await?;

    let records = tokio::task::spawn_blocking(move || {
        if is_json {
            parse_json(&contents)
        } else {
            parse_csv(&contents)
        }
    })
    .await??;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default, alias = "instagram")]
    handle: String,
    #[serde(default)]
    photo: String,
    #[serde(default, alias = "genre")]
    gender: String,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    question_2: Option<String>,
    #[serde(default)]
    question_3: Option<String>,
    #[serde(default)]
    question_4: Option<String>,
    #[serde(default)]
    question_5: Option<String>,
}

/// CSV with a header row. The photo column may hold several references
/// separated by whitespace.
pub fn parse_csv(contents: &str) -> Result<Vec<PersonRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row?;
        records.push(PersonRecord {
            handle: row.handle,
            photos: row
                .photo
                .split_whitespace()
                .map(|url| PhotoRef {
                    url: url.to_string(),
                })
                .collect(),
            gender: Gender::parse(&row.gender),
            questions: [
                row.question,
                row.question_2,
                row.question_3,
                row.question_4,
                row.question_5,
            ]
            .into_iter()
            .flatten()
            .collect(),
        });
    }
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default, alias = "instagram")]
    handle: String,
    #[serde(default, alias = "photo")]
    photos: Vec<PhotoRef>,
    #[serde(default, alias = "genre")]
    gender: Option<String>,
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    question_2: Option<String>,
    #[serde(default)]
    question_3: Option<String>,
    #[serde(default)]
    question_4: Option<String>,
    #[serde(default)]
    question_5: Option<String>,
}

/// Table exports wrap each record's columns in `fields`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonEntry {
    Wrapped { fields: JsonRecord },
    Flat(JsonRecord),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Table { records: Vec<JsonEntry> },
    List(Vec<JsonEntry>),
}

/// JSON array of records, or a `{ "records": [...] }` table export.
///
/// Like CSV rows, records without a handle are kept; the deck skips them.
pub fn parse_json(contents: &str) -> Result<Vec<PersonRecord>> {
    let document: JsonDocument = serde_json::from_str(contents)?;
    let entries = match document {
        JsonDocument::Table { records } => records,
        JsonDocument::List(records) => records,
    };

    let records = entries
        .into_iter()
        .map(|entry| {
            let record = match entry {
                JsonEntry::Wrapped { fields } => fields,
                JsonEntry::Flat(record) => record,
            };
            let mut questions = record.questions;
            questions.extend(
                [
                    record.question,
                    record.question_2,
                    record.question_3,
                    record.question_4,
                    record.question_5,
                ]
                .into_iter()
                .flatten(),
            );
            PersonRecord {
                handle: record.handle,
                photos: record.photos,
                gender: Gender::parse(record.gender.as_deref().unwrap_or_default()),
                questions,
            }
        })
        .collect();
    Ok(records)
}
