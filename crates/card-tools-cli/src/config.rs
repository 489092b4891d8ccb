use anyhow::{Context, Result};
use card_compose::CardOptions;
use card_impose::PrintOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of the `--config` file. Missing sections use their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub cards: CardOptions,
    pub print: PrintOptions,
}

impl ToolConfig {
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Check both sections before any work starts
    pub fn validate(&self) -> Result<()> {
        self.cards.validate().context("Invalid card configuration")?;
        self.print.validate().context("Invalid print configuration")?;
        Ok(())
    }
}
