//! Replay scripts: a page's editing session written down as JSON.
//!
//! ```json
//! {
//!   "steps": [
//!     { "step": "toggleDirectEdit" },
//!     { "step": "click", "target": "#intro" },
//!     { "step": "selectText", "start": 0, "end": 5 },
//!     { "step": "format", "format": { "action": "bold" } },
//!     { "step": "blur" }
//!   ]
//! }
//! ```
//!
//! Targets are node paths in their written form: `#id` or
//! `body > section:nth-of-type(1) > p:nth-of-type(2)`.

use serde::{Deserialize, Serialize};
use sitedit_editor::{FormatAction, KeyEvent, Mutation};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    TogglePick,
    ToggleDirectEdit,
    ExitMode,
    Hover {
        target: String,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    PointerOut {
        target: String,
    },
    Click {
        target: String,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    SelectText {
        start: usize,
        end: usize,
    },
    Type {
        text: String,
    },
    Format {
        format: FormatAction,
    },
    FocusToolbar,
    Blur,
    Key {
        key: KeyEvent,
    },
    Undo,
    Redo,
    Escape,
    Mutate {
        target: String,
        mutation: Mutation,
    },
    ImageSource {
        url: String,
    },
    LinkImage {
        href: String,
    },
    CloseImageActions,
    /// Upload a file through the configured asset endpoint.
    Upload {
        file: PathBuf,
        #[serde(rename = "contentType")]
        content_type: String,
    },
    /// Without `response` the configured rewrite endpoint is called.
    Rewrite {
        instruction: String,
        #[serde(default)]
        response: Option<String>,
    },
    UndoRewrite,
    ZoomIn,
    ZoomOut,
    Save,
    ChangePage {
        page: String,
        file: PathBuf,
    },
}

impl Script {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitedit_editor::{Alignment, Key};

    #[test]
    fn test_parse_script() {
        let script = Script::from_json(
            r##"{
                "steps": [
                    { "step": "toggleDirectEdit" },
                    { "step": "click", "target": "#intro", "x": 4 },
                    { "step": "format", "format": { "action": "align", "value": "center" } },
                    { "step": "key", "key": { "key": "escape" } },
                    { "step": "mutate", "target": "#intro", "mutation": { "op": "setText", "text": "Hi" } },
                    { "step": "rewrite", "instruction": "shorter" }
                ]
            }"##,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 6);
        assert_eq!(
            script.steps[1],
            Step::Click {
                target: "#intro".into(),
                x: 4.0,
                y: 0.0
            }
        );
        assert_eq!(
            script.steps[2],
            Step::Format {
                format: FormatAction::Align(Alignment::Center)
            }
        );
        assert_eq!(
            script.steps[3],
            Step::Key {
                key: KeyEvent::new(Key::Escape)
            }
        );
        assert_eq!(
            script.steps[5],
            Step::Rewrite {
                instruction: "shorter".into(),
                response: None
            }
        );
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Script::from_json(r#"{ "steps": [{ "step": "dance" }] }"#).is_err());
    }
}
