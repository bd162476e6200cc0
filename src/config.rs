use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::compiler::BarStyles;
use crate::sanitize::CustomDefaults;
use crate::style::StyleMap;
use crate::subplots::SubplotLayout;
use crate::ticks::{Orientation, Rotation};

/// Chart configuration, loadable from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct BarplotConfig {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    #[serde(default = "default_space_width")]
    pub space_width: f64,
    #[serde(default)]
    pub minor_rotation: Rotation,
    #[serde(default)]
    pub major_rotation: Rotation,
    /// Avoid repeating minor labels on subplots sharing an axis
    #[serde(default = "default_true")]
    pub unique_minor_labels: bool,
    /// Avoid repeating major labels on subplots sharing an axis
    #[serde(default = "default_true")]
    pub unique_major_labels: bool,
    /// Avoid repeating the value-axis label on subplots
    #[serde(default = "default_true")]
    pub unique_data_label: bool,
    #[serde(default)]
    pub subplots: SubplotLayout,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub colors: StyleMap<String>,
    #[serde(default)]
    pub alphas: StyleMap<f64>,
    #[serde(default)]
    pub hatches: Option<StyleMap<String>>,
    #[serde(default)]
    pub custom_defaults: CustomDefaults,
}

fn default_bar_width() -> f64 { 0.3 }
fn default_space_width() -> f64 { 0.3 }
fn default_true() -> bool { true }

impl Default for BarplotConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            bar_width: default_bar_width(),
            space_width: default_space_width(),
            minor_rotation: Rotation::Auto,
            major_rotation: Rotation::Auto,
            unique_minor_labels: true,
            unique_major_labels: true,
            unique_data_label: true,
            subplots: SubplotLayout::Grid,
            title: None,
            colors: StyleMap::new(),
            alphas: StyleMap::new(),
            hatches: None,
            custom_defaults: CustomDefaults::new(),
        }
    }
}

impl BarplotConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn styles(&self) -> BarStyles {
        BarStyles {
            colors: self.colors.clone(),
            alphas: self.alphas.clone(),
            hatches: self.hatches.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: BarplotConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.bar_width, 0.3);
        assert_eq!(config.minor_rotation, Rotation::Auto);
        assert!(config.unique_minor_labels);
        assert!(config.hatches.is_none());
        assert_eq!(config.orientation, Orientation::Vertical);
    }

    #[test]
    fn test_full_config() {
        let config: BarplotConfig = serde_json::from_str(
            r##"{
                "orientation": "horizontal",
                "bar_width": 0.5,
                "minor_rotation": 45,
                "major_rotation": "auto",
                "unique_major_labels": false,
                "subplots": "column",
                "colors": {"cnn": "red", "run1/mlp": "#00ff00"},
                "alphas": {"cnn": 0.4},
                "hatches": {"mlp": "//"},
                "custom_defaults": {"AUROC": ["roc"]}
            }"##,
        )
        .unwrap();
        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.minor_rotation, Rotation::Fixed(45.0));
        assert!(!config.unique_major_labels);
        assert_eq!(config.subplots, SubplotLayout::Column);
        assert_eq!(config.colors.len(), 2);
        assert_eq!(config.styles().hatches.map(|h| h.len()), Some(1));
        assert_eq!(config.custom_defaults["AUROC"], vec!["roc"]);
    }

    #[test]
    fn test_bad_orientation_rejected() {
        let res: Result<BarplotConfig, _> = serde_json::from_str(r#"{"orientation": "diagonal"}"#);
        assert!(res.is_err());
    }
}
