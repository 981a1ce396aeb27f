//! Global key bindings: undo, redo and escape.
//!
//! Undo and redo belong to the text field while an edit session is open,
//! so they pass through to it untouched.

use crate::editor::Editor;
use crate::surface::Marker;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    /// `key` with Ctrl held.
    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            ..Self::new(Key::Char(key))
        }
    }

    /// `key` with Cmd held.
    pub fn meta(key: char) -> Self {
        Self {
            meta: true,
            ..Self::new(Key::Char(key))
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn command(&self) -> Option<KeyCommand> {
        let modifier = self.ctrl || self.meta;
        match self.key {
            Key::Escape => Some(KeyCommand::Escape),
            Key::Char(c) if modifier => match c.to_ascii_lowercase() {
                'z' if self.shift => Some(KeyCommand::Redo),
                'z' => Some(KeyCommand::Undo),
                'y' => Some(KeyCommand::Redo),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Undo,
    Redo,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Left for the focused text field.
    PassedThrough,
    Ignored,
}

impl Editor {
    pub fn on_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let Some(command) = event.command() else {
            return KeyOutcome::Ignored;
        };
        debug!(?command, "Key command");

        match command {
            KeyCommand::Undo | KeyCommand::Redo if self.session.is_some() => {
                KeyOutcome::PassedThrough
            }
            KeyCommand::Undo => {
                self.undo();
                KeyOutcome::Handled
            }
            KeyCommand::Redo => {
                self.redo();
                KeyOutcome::Handled
            }
            KeyCommand::Escape => {
                if self.escape() {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    /// Drop the selection, prompt or edit session. The mode stays.
    pub fn escape(&mut self) -> bool {
        let had_session = self.session.is_some();
        if !had_session && self.selection.selected_path().is_none() && !self.selection.is_locked() {
            return false;
        }
        self.commit_session();
        self.surface.clear_marker(Marker::Selected);
        self.selection.deselect();
        self.refresh_overlay();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_mapping() {
        assert_eq!(KeyEvent::ctrl('z').command(), Some(KeyCommand::Undo));
        assert_eq!(KeyEvent::meta('Z').command(), Some(KeyCommand::Undo));
        assert_eq!(KeyEvent::ctrl('y').command(), Some(KeyCommand::Redo));
        assert_eq!(KeyEvent::meta('z').with_shift().command(), Some(KeyCommand::Redo));
        assert_eq!(KeyEvent::new(Key::Escape).command(), Some(KeyCommand::Escape));
        assert_eq!(KeyEvent::new(Key::Char('z')).command(), None);
        assert_eq!(KeyEvent::ctrl('s').command(), None);
    }

    #[test]
    fn test_key_event_from_json() {
        let event: KeyEvent = serde_json::from_str(r#"{ "key": { "char": "z" }, "meta": true }"#).unwrap();
        assert_eq!(event, KeyEvent::meta('z'));
    }
}
