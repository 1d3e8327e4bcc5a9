//! Persisted document layout.
//!
//! DESIGN
//! ======
//! The stored form keeps layout and preferences but never inline pixel data,
//! which would blow through key-value storage limits. Sources that are mere
//! references (URLs, cache keys) are kept; `data:` sources are dropped and
//! must be supplied again on load. History is not persisted.
//!
//! Loading goes through [`PersistedState::into_partial`] and then the
//! reducer's `LoadPartialState`, which repairs whatever the stored data got
//! wrong (z-order gaps, dangling selection).

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use serde::{Deserialize, Serialize};

use crate::doc::{Document, DragMode, ImageObject, ImageSource, ObjectId, PartialDocument};

/// Current layout version.
pub const PERSIST_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid persisted state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported persisted state version: {0}")]
    UnsupportedVersion(u32),
}

/// An image without its pixel data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedImage {
    pub id: ObjectId,
    /// Kept only for reference sources; inline data is dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<ImageSource>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub original_width: f64,
    pub original_height: f64,
    pub z_index: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub aspect_ratio_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub created_at_ms: i64,
}

fn default_true() -> bool {
    true
}

impl PersistedImage {
    fn from_image(img: &ImageObject) -> Self {
        Self {
            id: img.id,
            src: (!is_inline_data(&img.src)).then(|| img.src.clone()),
            x: img.x,
            y: img.y,
            width: img.width,
            height: img.height,
            original_width: img.original_width,
            original_height: img.original_height,
            z_index: img.z_index,
            visible: img.visible,
            aspect_ratio_locked: img.aspect_ratio_locked,
            rotation: img.rotation,
            opacity: img.opacity,
            created_at_ms: img.created_at_ms,
        }
    }

    fn into_image(self, src: ImageSource) -> ImageObject {
        ImageObject {
            id: self.id,
            src,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            original_width: self.original_width,
            original_height: self.original_height,
            z_index: self.z_index,
            visible: self.visible,
            aspect_ratio_locked: self.aspect_ratio_locked,
            rotation: self.rotation,
            opacity: self.opacity,
            created_at_ms: self.created_at_ms,
        }
    }
}

/// Whether a source embeds its pixels instead of pointing at them.
#[must_use]
pub fn is_inline_data(src: &ImageSource) -> bool {
    src.as_str().starts_with("data:")
}

/// The stored form of a document. Every field tolerates being absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub version: u32,
    pub images: Vec<PersistedImage>,
    pub selected_image_id: Option<ObjectId>,
    pub drag_mode: DragMode,
    pub aspect_ratio_locked: bool,
    pub layer_sidebar_visible: bool,
    pub dark_mode: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::from_document(&Document::default())
    }
}

impl PersistedState {
    /// Capture a document's layout and preferences.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            version: PERSIST_VERSION,
            images: doc.images.iter().map(PersistedImage::from_image).collect(),
            selected_image_id: doc.selected_image_id,
            drag_mode: doc.drag_mode,
            aspect_ratio_locked: doc.aspect_ratio_locked,
            layer_sidebar_visible: doc.layer_sidebar_visible,
            dark_mode: doc.dark_mode,
        }
    }

    /// Encode as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Json`] for malformed input and
    /// [`PersistError::UnsupportedVersion`] for layouts newer than this build.
    pub fn from_json(raw: &str) -> Result<Self, PersistError> {
        let state: Self = serde_json::from_str(raw)?;
        if state.version > PERSIST_VERSION {
            return Err(PersistError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    /// Turn the stored form into a partial document for `LoadPartialState`.
    ///
    /// Images whose source was not stored are looked up with `source_for`;
    /// those it cannot supply are left out.
    pub fn into_partial<F>(self, mut source_for: F) -> PartialDocument
    where
        F: FnMut(&ObjectId) -> Option<ImageSource>,
    {
        let images = self
            .images
            .into_iter()
            .filter_map(|img| {
                let src = img.src.clone().or_else(|| source_for(&img.id))?;
                Some(img.into_image(src))
            })
            .collect();

        PartialDocument {
            images: Some(images),
            selected_image_id: Some(self.selected_image_id),
            drag_mode: Some(self.drag_mode),
            aspect_ratio_locked: Some(self.aspect_ratio_locked),
            crop_state: None,
            layer_sidebar_visible: Some(self.layer_sidebar_visible),
            dark_mode: Some(self.dark_mode),
            history: None,
        }
    }
}
