use crate::plan::{Anchor, TextStyle};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_FONT: &str = "assets/fonts/Arial-Bold.ttf";
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Where the photo lands on the card template, in template pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameOptions {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl FrameOptions {
    pub fn size(&self) -> Rectangle {
        Rectangle::from((self.width, self.height))
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            width: 740,
            height: 540,
            x: 115,
            y: 167,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionOptions {
    pub style: TextStyle,
    pub max_chars_per_line: usize,
    /// Printed before the first caption line
    pub label: String,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            style: TextStyle {
                font: PathBuf::from(DEFAULT_FONT),
                size: 34.0,
                color: BLACK,
                anchor: Anchor::Center,
                x: 25,
                y: 260,
            },
            max_chars_per_line: 30,
            label: "Question: ".to_string(),
        }
    }
}

/// How the stat value is chosen for a handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatPolicy {
    /// Handles that always get `privileged_value`, compared after normalization
    pub privileged_handles: Vec<String>,
    pub privileged_value: u32,
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Default for StatPolicy {
    fn default() -> Self {
        Self {
            privileged_handles: ["lioruby_", "vintagetran", "theoaudace", "haimlivai"]
                .into_iter()
                .map(String::from)
                .collect(),
            privileged_value: 500,
            min: 10,
            max: 340,
            step: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateOptions {
    pub male: PathBuf,
    pub female: PathBuf,
}

impl TemplateOptions {
    pub fn path_for(&self, kind: TemplateKind) -> &Path {
        match kind {
            TemplateKind::Male => &self.male,
            TemplateKind::Female => &self.female,
        }
    }
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            male: PathBuf::from("assets/card_template_male.png"),
            female: PathBuf::from("assets/card_template_female.png"),
        }
    }
}

/// Everything needed to compose one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardOptions {
    pub frame: FrameOptions,
    pub templates: TemplateOptions,
    pub stat_style: TextStyle,
    pub handle_style: TextStyle,
    pub caption: CaptionOptions,
    pub stats: StatPolicy,
    /// Per-photo download timeout
    pub fetch_timeout_secs: u64,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            frame: FrameOptions::default(),
            templates: TemplateOptions::default(),
            stat_style: TextStyle {
                font: PathBuf::from(DEFAULT_FONT),
                size: 52.0,
                color: BLACK,
                anchor: Anchor::NorthEast,
                x: 250,
                y: 80,
            },
            handle_style: TextStyle {
                font: PathBuf::from(DEFAULT_FONT),
                size: 32.0,
                color: BLACK,
                anchor: Anchor::NorthWest,
                x: 99,
                y: 99,
            },
            caption: CaptionOptions::default(),
            stats: StatPolicy::default(),
            fetch_timeout_secs: 30,
        }
    }
}

impl CardOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(CardError::Config(
                "Photo frame must have a positive size".to_string(),
            ));
        }

        if self.caption.max_chars_per_line == 0 {
            return Err(CardError::Config(
                "Caption line width must be at least one character".to_string(),
            ));
        }

        let stats = &self.stats;
        if stats.step == 0 || stats.min > stats.max {
            return Err(CardError::Config(format!(
                "Invalid stat range {}..={} step {}",
                stats.min, stats.max, stats.step
            )));
        }

        for style in [&self.stat_style, &self.handle_style, &self.caption.style] {
            if !(style.size.is_finite() && style.size > 0.0) {
                return Err(CardError::Config(format!(
                    "Font size must be positive, got {}",
                    style.size
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CardOptions::default().validate().is_ok());
    }

    #[test]
    fn test_template_lookup() {
        let templates = TemplateOptions::default();
        assert!(templates.path_for(TemplateKind::Female).ends_with("card_template_female.png"));
        assert!(templates.path_for(TemplateKind::Male).ends_with("card_template_male.png"));
    }

    #[test]
    fn test_rejects_zero_step() {
        let mut options = CardOptions::default();
        options.stats.step = 0;
        assert!(matches!(options.validate(), Err(CardError::Config(_))));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let options: CardOptions =
            serde_json::from_str(r#"{ "caption": { "max_chars_per_line": 24 } }"#).unwrap();
        assert_eq!(options.caption.max_chars_per_line, 24);
        assert_eq!(options.caption.label, "Question: ");
        assert_eq!(options.frame, FrameOptions::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");

        let mut options = CardOptions::default();
        options.frame.x = 12;
        options.save(&path).await.unwrap();

        let loaded = CardOptions::load(&path).await.unwrap();
        assert_eq!(loaded, options);
    }
}
