use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Fetch error: {0}")]
    Fetch(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Output name collision: {0}")]
    DuplicateArtifact(PathBuf),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CardError>;

/// Width and height of a photo, frame, page or card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Fails with `InvalidDimensions` unless both sides are finite and positive.
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(CardError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

impl From<(u32, u32)> for Rectangle {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Parse the free-text gender column. Unrecognized values map to `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "homme" | "male" | "man" | "m" => Gender::Male,
            "femme" | "female" | "woman" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// Card template variant. Every record resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub url: String,
}

/// One person as read from the record source. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub handle: String,
    pub photos: Vec<PhotoRef>,
    pub gender: Gender,
    pub questions: Vec<String>,
}

impl PersonRecord {
    /// Handle lower-cased with leading `@` removed, as used in file names.
    pub fn normalized_handle(&self) -> String {
        normalize_handle(&self.handle)
    }

    /// Handle as printed on the card.
    pub fn display_handle(&self) -> String {
        format!("@{}", self.normalized_handle())
    }

    pub fn usable_questions(&self) -> impl Iterator<Item = &str> {
        self.questions
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
    }
}

pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}
