use crate::errors::ConfigError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::rewrite::ModelTier;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "sitedit.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum number of history entries kept
    pub history_limit: usize,

    /// Tags that open an inline edit session when clicked in direct-edit mode
    pub editable_tags: Vec<String>,

    pub markers: MarkerConfig,

    /// Overlay padding around hovered and selected elements, in px
    pub highlight_padding: f64,

    /// Distance of the tag label above the hovered element, in px
    pub label_offset: f64,

    pub zoom: ZoomConfig,

    pub rewrite: RewriteConfig,

    pub services: ServiceConfig,
}

/// Transient classes and attributes the editor puts on the live surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerConfig {
    pub hovered: String,
    pub selected: String,
    pub editing: String,
    pub editable_attribute: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoomConfig {
    pub min: u16,
    pub max: u16,
    pub step: u16,
    pub initial: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteConfig {
    pub model_tier: ModelTier,
    pub creativity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when there
    /// is no config file.
    pub fn load(cwd: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn is_editable_tag(&self, tag: &str) -> bool {
        self.editable_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            editable_tags: ["p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "div"]
                .into_iter()
                .map(String::from)
                .collect(),
            markers: MarkerConfig::default(),
            highlight_padding: 4.0,
            label_offset: 16.0,
            zoom: ZoomConfig::default(),
            rewrite: RewriteConfig::default(),
            services: ServiceConfig::default(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            hovered: "hovered-element".to_string(),
            selected: "selected-element".to_string(),
            editing: "editing-element".to_string(),
            editable_attribute: "contenteditable".to_string(),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 50,
            max: 200,
            step: 10,
            initial: 100,
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            model_tier: ModelTier::default(),
            creativity: 0.1,
        }
    }
}
