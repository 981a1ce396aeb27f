//! # Sitedit Editor
//!
//! Live document editing engine for the site editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: page text → tree → page text        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one page open for editing           │
//! │  - Document store (serialized page)         │
//! │  - Bounded undo/redo history                │
//! │  - Live surface with transient markers      │
//! │  - Pick / direct-edit interaction modes     │
//! │  - Inline text sessions and formatting      │
//! │  - AI rewrite of the selected element       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ effects: saves and notifications for host   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The serialized document is the source of truth**: the surface is
//!    rebuilt from it after every committed change
//! 2. **Addresses, not references**: nodes are found again by path each
//!    time they are needed, and a path that no longer resolves is a no-op
//! 3. **No I/O in the engine**: collaborators are traits, saves and
//!    notifications are queued effects
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitedit_editor::{Editor, EditorConfig, FocusTarget};
//!
//! let mut editor = Editor::new("home", r#"<body><p id="a">Hi</p></body>"#, EditorConfig::default())?;
//! editor.toggle_direct_edit();
//!
//! let p = editor.surface().find_by_id("a").unwrap();
//! editor.on_click(p, Point::default());
//! editor.select_text(TextRange::new(2, 2))?;
//! editor.input_text("llo")?;
//! editor.focus_changed(FocusTarget::Elsewhere);
//!
//! assert_eq!(editor.document(), r#"<body><p id="a">Hello</p></body>"#);
//! editor.undo();
//! ```

mod config;
mod document;
mod editor;
mod effects;
mod errors;
mod formatting;
mod geometry;
mod history;
mod image;
mod keyboard;
mod listeners;
mod mode;
mod mutations;
mod path;
mod persistence;
mod rewrite;
mod selection;
mod session;
mod surface;

pub use config::{
    EditorConfig, MarkerConfig, RewriteConfig, ServiceConfig, ZoomConfig, DEFAULT_CONFIG_NAME,
};
pub use document::{apply_patch, is_equivalent, DocumentStore, PatchOutcome};
pub use editor::Editor;
pub use effects::{Effect, FailureKind, Notification, NotificationLevel, Outbox};
pub use errors::{ConfigError, EditorError, PatchError};
pub use formatting::{Alignment, FormatAction, TextFormats, TextRange, DEFAULT_FONT_SIZE};
pub use geometry::{Point, Rect, Viewport};
pub use history::{History, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use keyboard::{Key, KeyCommand, KeyEvent, KeyOutcome};
pub use listeners::{AttachedListeners, ListenerKind, ListenerRegistry};
pub use mode::{ClickOutcome, InteractionMode, ModeController};
pub use mutations::{Mutation, MutationError, NodeMut};
pub use path::{compute_path, editable_root, resolve_path, NodePath, PathError, PathStep};
pub use persistence::{
    AssetError, AssetService, PageId, PersistenceError, PersistenceService, SaveRequest,
};
pub use rewrite::{
    validate_replacement, ModelTier, PendingRewrite, RewriteError, RewriteOutcome,
    RewriteRequest, RewriteResponse, RewriteService,
};
pub use selection::{HighlightTracker, Overlay, SelectionState, TagLabel};
pub use session::{EditSession, FocusOutcome, FocusTarget, FormatOutcome, SessionPhase};
pub use surface::{LayoutOracle, Marker, NoLayout, Surface};

// Re-export the markup types hosts need to drive the surface
pub use sitedit_markup::{Document, NodeId};
