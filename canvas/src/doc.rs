//! Document model: placed images, the crop sub-state, and the whole editable
//! document.
//!
//! This module defines what is on the board (`ImageObject`), the sparse
//! update type used during gestures (`ImageUpdate`), the payload an image
//! source hands to the core (`NewImage`), and the `Document` tree the reducer
//! transforms. `PartialDocument` is the tolerant shape accepted when a
//! persistence layer hands back some subset of the document.
//!
//! Insertion order of `Document::images` carries no meaning; `z_index` does.
//! Readers that paint or export go through `sorted_images` /
//! `visible_sorted_images`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::geometry::Rect;
use crate::history::History;

/// Unique identifier for a placed image.
pub type ObjectId = Uuid;

/// Opaque handle to image pixel data (data URL, blob URL, cache key).
///
/// Cloning is cheap; history snapshots share the same handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(Arc<str>);

impl ImageSource {
    #[must_use]
    pub fn new(src: impl Into<Arc<str>>) -> Self {
        Self(src.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageSource {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One placed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    /// Unique identifier for this image.
    pub id: ObjectId,
    /// Pixel data handle.
    pub src: ImageSource,
    /// Left edge in board coordinates.
    pub x: f64,
    /// Top edge in board coordinates.
    pub y: f64,
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
    /// Natural width of the pixel data; with `original_height` gives the aspect ratio.
    pub original_width: f64,
    /// Natural height of the pixel data.
    pub original_height: f64,
    /// Stacking order, dense `0..N-1`; higher paints on top.
    pub z_index: i64,
    /// Hidden images stay in the document but are not painted or exported.
    pub visible: bool,
    /// Per-image aspect lock for corner resizes.
    pub aspect_ratio_locked: bool,
    /// Clockwise rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Opacity in `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at_ms: i64,
}

impl ImageObject {
    /// Current board-space bounds.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Natural `width / height` ratio. Falls back to the displayed ratio, then
    /// to `1.0`, when the natural size is degenerate.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.original_width > 0.0 && self.original_height > 0.0 {
            self.original_width / self.original_height
        } else if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Payload for adding an image: everything but the identity and stacking
/// order, which the reducer assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImage {
    pub src: ImageSource,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub original_width: f64,
    pub original_height: f64,
    /// Defaults to the document-wide aspect lock when absent.
    #[serde(default)]
    pub aspect_ratio_locked: Option<bool>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

fn default_visible() -> bool {
    true
}

impl NewImage {
    /// An image displayed at its natural size.
    #[must_use]
    pub fn at_natural_size(src: impl Into<ImageSource>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            src: src.into(),
            x,
            y,
            width,
            height,
            original_width: width,
            original_height: height,
            aspect_ratio_locked: None,
            visible: true,
            rotation: None,
            opacity: None,
        }
    }

    /// Whether every dimension is finite and positive and the position is finite.
    #[must_use]
    pub fn has_valid_geometry(&self) -> bool {
        [self.x, self.y].iter().all(|v| v.is_finite())
            && [self.width, self.height, self.original_width, self.original_height]
                .iter()
                .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Sparse update for an image. Only present fields are applied.
///
/// Stacking order is deliberately absent: it only changes through layer
/// reordering so it stays dense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<ImageSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ImageUpdate {
    /// An update that sets position and size.
    #[must_use]
    pub fn geometry(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Default::default()
        }
    }

    /// An update that only sets position.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Shallow-merge present fields into `obj`. Non-finite numbers are skipped
    /// and opacity is clamped to `0..=1`.
    pub fn apply_to(&self, obj: &mut ImageObject) {
        fn set(target: &mut f64, value: Option<f64>) {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                *target = v;
            }
        }

        set(&mut obj.x, self.x);
        set(&mut obj.y, self.y);
        set(&mut obj.width, self.width);
        set(&mut obj.height, self.height);
        set(&mut obj.original_width, self.original_width);
        set(&mut obj.original_height, self.original_height);
        if let Some(ref src) = self.src {
            obj.src = src.clone();
        }
        if let Some(v) = self.visible {
            obj.visible = v;
        }
        if let Some(v) = self.aspect_ratio_locked {
            obj.aspect_ratio_locked = v;
        }
        if let Some(r) = self.rotation.filter(|r| r.is_finite()) {
            obj.rotation = Some(r);
        }
        if let Some(o) = self.opacity.filter(|o| o.is_finite()) {
            obj.opacity = Some(o.clamp(0.0, 1.0));
        }
    }
}

/// Document-wide drag behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragMode {
    /// Positions and sizes are continuous.
    #[default]
    Free,
    /// Committed positions and sizes are quantised to the grid.
    GridSnap,
}

/// Transient state for trimming one image.
///
/// `selection` is expressed in the target image's own displayed space: its
/// origin is the image's top-left corner, not the board origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropState {
    pub target: Option<ObjectId>,
    pub selection: Option<Rect>,
    pub is_active: bool,
}

impl CropState {
    /// A fresh crop session on `target` with no selection yet.
    #[must_use]
    pub fn begin(target: ObjectId) -> Self {
        Self { target: Some(target), selection: None, is_active: true }
    }
}

/// The whole editable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Placed images in insertion order.
    pub images: Vec<ImageObject>,
    /// The single selected image, if any. Always references an existing image.
    pub selected_image_id: Option<ObjectId>,
    pub drag_mode: DragMode,
    /// Aspect lock applied to newly added images.
    pub aspect_ratio_locked: bool,
    pub crop_state: CropState,
    pub layer_sidebar_visible: bool,
    pub dark_mode: bool,
    pub history: History,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            selected_image_id: None,
            drag_mode: DragMode::Free,
            aspect_ratio_locked: true,
            crop_state: CropState::default(),
            layer_sidebar_visible: false,
            dark_mode: false,
            history: History::seeded(&[], 0),
        }
    }
}

impl Document {
    /// An empty document whose history starts with one "initial state" step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a reference to an image by id.
    #[must_use]
    pub fn image(&self, id: &ObjectId) -> Option<&ImageObject> {
        self.images.iter().find(|img| img.id == *id)
    }

    pub(crate) fn image_mut(&mut self, id: &ObjectId) -> Option<&mut ImageObject> {
        self.images.iter_mut().find(|img| img.id == *id)
    }

    /// Whether an image with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.image(id).is_some()
    }

    /// The selected image, if any.
    #[must_use]
    pub fn selected_image(&self) -> Option<&ImageObject> {
        self.selected_image_id.as_ref().and_then(|id| self.image(id))
    }

    /// All images sorted by `(z_index, id)`, bottom first.
    #[must_use]
    pub fn sorted_images(&self) -> Vec<&ImageObject> {
        let mut imgs: Vec<&ImageObject> = self.images.iter().collect();
        imgs.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        imgs
    }

    /// Visible images sorted bottom first; the order a renderer paints in.
    #[must_use]
    pub fn visible_sorted_images(&self) -> Vec<&ImageObject> {
        self.sorted_images().into_iter().filter(|img| img.visible).collect()
    }

    /// Whether the z-indices are exactly `{0, .., N-1}`.
    #[must_use]
    pub fn z_order_is_dense(&self) -> bool {
        let mut zs: Vec<i64> = self.images.iter().map(|img| img.z_index).collect();
        zs.sort_unstable();
        zs.iter().zip(0_i64..).all(|(z, expected)| *z == expected)
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if there are no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// A subset of [`Document`] fields, as handed back by a persistence layer.
///
/// Every field is optional and unknown fields are ignored. For the selection,
/// an explicit `null` clears it while a missing key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageObject>>,
    #[serde(deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub selected_image_id: Option<Option<ObjectId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag_mode: Option<DragMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_state: Option<CropState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_sidebar_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,
}

/// Distinguish a present `null` (`Some(None)`) from a missing key (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
