//! Image affordance: replace the source, link the image, or close.

use crate::editor::Editor;
use crate::effects::{FailureKind, Notification};
use crate::errors::EditorError;
use crate::mode::InteractionMode;
use crate::mutations::Mutation;
use crate::path::NodePath;
use crate::persistence::AssetService;
use crate::surface::Marker;
use tracing::{info, warn};

impl Editor {
    fn selected_image(&self) -> Result<NodePath, EditorError> {
        if self.modes.mode() != InteractionMode::DirectEdit {
            return Err(EditorError::WrongMode(self.modes.mode()));
        }
        let path = self
            .selection
            .selected_path()
            .cloned()
            .ok_or(EditorError::NothingSelected)?;
        let node = self.surface.resolve(&path)?;
        if self.surface.tree().tag(node) != Some("img") {
            return Err(EditorError::NotAnImage);
        }
        Ok(path)
    }

    /// Point the selected image at `url`.
    pub fn set_image_source(&mut self, url: &str) -> Result<bool, EditorError> {
        let path = self.selected_image()?;
        let changed = self.apply_mutation(
            &path,
            &Mutation::SetAttribute {
                name: "src".to_string(),
                value: url.to_string(),
            },
        )?;
        info!(path = %path, changed, "Image source replaced");
        Ok(changed)
    }

    /// Wrap the selected image in a link, or retarget the link around it.
    /// The affordance closes afterwards.
    pub fn link_image(&mut self, href: &str) -> Result<bool, EditorError> {
        let path = self.selected_image()?;
        let changed = self.apply_mutation(
            &path,
            &Mutation::WrapInLink {
                href: href.to_string(),
            },
        )?;
        self.close_image_actions();
        Ok(changed)
    }

    pub fn close_image_actions(&mut self) {
        self.selection.close_image_actions();
        self.surface.clear_marker(Marker::Selected);
        self.selection.deselect();
    }

    /// Upload through `assets`, then use the returned URL as the source.
    /// An upload failure is reported as a notification and changes nothing.
    pub async fn upload_image<A: AssetService>(
        &mut self,
        assets: &A,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<bool, EditorError> {
        self.selected_image()?;
        match assets.upload(bytes, content_type).await {
            Ok(url) => self.set_image_source(&url),
            Err(e) => {
                warn!(error = %e, "Image upload failed");
                self.outbox.notify(Notification::failure(
                    FailureKind::Asset,
                    format!("The image could not be uploaded: {e}"),
                ));
                Ok(false)
            }
        }
    }
}
