//! The single state-transition function.
//!
//! DESIGN
//! ======
//! `reduce` takes the document by value and returns the next one, so a
//! transition is never observable half-applied. Time comes in through
//! `ReduceContext` rather than a global clock, which keeps the function
//! deterministic under test.
//!
//! Actions that reference an image that does not exist are no-ops: UI events
//! routinely race against a delete, and dropping them is the intended
//! outcome. They are logged at `debug` level and nothing else happens.
//!
//! `UpdateImage` never records history. Gestures stream many of them and
//! then close with one explicit `AddHistoryStep`, so history holds
//! user-meaningful edits rather than every intermediate frame. Every other
//! mutating action records exactly one step itself.

#[cfg(test)]
#[path = "reducer_test.rs"]
mod reducer_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::doc::{
    CropState, Document, DragMode, ImageObject, ImageSource, ImageUpdate, NewImage, ObjectId, PartialDocument,
};
use crate::geometry::{Rect, Size, clamp_rect};
use crate::history::{History, HistoryAction};
use crate::layers;

/// Everything that can happen to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Place a new image on top of the stack and select it.
    AddImage(NewImage),
    DeleteImage { id: ObjectId },
    /// Shallow-merge fields into an image. Records no history.
    UpdateImage { id: ObjectId, changes: ImageUpdate },
    SelectImage { id: Option<ObjectId> },
    SetDragMode { mode: DragMode },
    /// Flip the aspect lock applied to newly added images.
    ToggleAspectRatioLock,
    /// Flip one image's aspect lock.
    ToggleImageAspectRatioLock { id: ObjectId },
    ToggleLayerSidebar,
    ToggleDarkMode,
    Undo,
    Redo,
    /// Explicit checkpoint of the current images.
    AddHistoryStep { action: HistoryAction, description: String },
    StartCrop { id: ObjectId },
    /// Selection in the crop target's own displayed space.
    UpdateCropSelection { rect: Rect },
    /// Commit the crop. `src` carries the cropped pixel data when the host has it.
    ApplyCrop {
        #[serde(default)]
        src: Option<ImageSource>,
    },
    CancelCrop,
    /// Move an image to a stacking slot; fractional slots land between neighbours.
    ReorderLayer { id: ObjectId, z_index: f64 },
    ToggleLayerVisibility { id: ObjectId },
    /// Remove every image.
    ClearImages,
    /// Merge whichever document fields are present.
    LoadPartialState(PartialDocument),
    /// Return to an empty document.
    Reset,
}

/// Inputs to a transition that are not part of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduceContext {
    pub config: EditorConfig,
    /// Current time in milliseconds since the Unix epoch.
    pub now_ms: i64,
}

impl ReduceContext {
    #[must_use]
    pub fn new(config: EditorConfig, now_ms: i64) -> Self {
        Self { config, now_ms }
    }
}

/// Apply `action` to `doc` and return the resulting document.
#[must_use]
pub fn reduce(mut doc: Document, action: Action, ctx: &ReduceContext) -> Document {
    match action {
        Action::AddImage(new) => add_image(&mut doc, new, ctx),
        Action::DeleteImage { id } => delete_image(&mut doc, &id, ctx),
        Action::UpdateImage { id, changes } => match doc.image_mut(&id) {
            Some(img) => {
                changes.apply_to(img);
                trace!(%id, "update_image");
            }
            None => debug!(%id, "update_image: unknown image, ignoring"),
        },
        Action::SelectImage { id: Some(id) } => {
            if doc.contains(&id) {
                doc.selected_image_id = Some(id);
            } else {
                debug!(%id, "select_image: unknown image, ignoring");
            }
        }
        Action::SelectImage { id: None } => doc.selected_image_id = None,
        Action::SetDragMode { mode } => doc.drag_mode = mode,
        Action::ToggleAspectRatioLock => doc.aspect_ratio_locked = !doc.aspect_ratio_locked,
        Action::ToggleImageAspectRatioLock { id } => match doc.image_mut(&id) {
            Some(img) => {
                img.aspect_ratio_locked = !img.aspect_ratio_locked;
                checkpoint(&mut doc, HistoryAction::ToggleAspectRatio, None, ctx);
            }
            None => debug!(%id, "toggle_image_aspect_ratio_lock: unknown image, ignoring"),
        },
        Action::ToggleLayerSidebar => doc.layer_sidebar_visible = !doc.layer_sidebar_visible,
        Action::ToggleDarkMode => doc.dark_mode = !doc.dark_mode,
        Action::Undo => {
            if let Some(snapshot) = doc.history.undo() {
                doc.images = snapshot.as_ref().clone();
                drop_dangling_references(&mut doc);
            }
        }
        Action::Redo => {
            if let Some(snapshot) = doc.history.redo() {
                doc.images = snapshot.as_ref().clone();
                drop_dangling_references(&mut doc);
            }
        }
        Action::AddHistoryStep { action, description } => {
            checkpoint(&mut doc, action, Some(description), ctx);
        }
        Action::StartCrop { id } => {
            if doc.contains(&id) {
                doc.crop_state = CropState::begin(id);
            } else {
                debug!(%id, "start_crop: unknown image, ignoring");
            }
        }
        Action::UpdateCropSelection { rect } => update_crop_selection(&mut doc, rect),
        Action::ApplyCrop { src } => apply_crop(&mut doc, src, ctx),
        Action::CancelCrop => doc.crop_state = CropState::default(),
        Action::ReorderLayer { id, z_index } => reorder_layer(&mut doc, &id, z_index, ctx),
        Action::ToggleLayerVisibility { id } => match doc.image_mut(&id) {
            Some(img) => {
                img.visible = !img.visible;
                checkpoint(&mut doc, HistoryAction::ToggleVisibility, None, ctx);
            }
            None => debug!(%id, "toggle_layer_visibility: unknown image, ignoring"),
        },
        Action::ClearImages => {
            if !doc.images.is_empty() {
                doc.images.clear();
                doc.selected_image_id = None;
                doc.crop_state = CropState::default();
                checkpoint(&mut doc, HistoryAction::MultipleChanges, Some("Cleared board".into()), ctx);
            }
        }
        Action::LoadPartialState(partial) => load_partial(&mut doc, partial, ctx),
        Action::Reset => {
            doc = Document { history: History::seeded(&[], ctx.now_ms), ..Document::default() };
        }
    }
    doc
}

/// Record the current images as a new history step.
fn checkpoint(doc: &mut Document, action: HistoryAction, description: Option<String>, ctx: &ReduceContext) {
    let description = description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| action.label().to_owned());
    let limit = ctx.config.effective_history_limit();
    let evicted = doc.history.record(action, description, &doc.images, ctx.now_ms, limit);
    debug!(?action, steps = doc.history.len(), evicted, "history step recorded");
}

/// Clear selection and crop state that point at images no longer present.
fn drop_dangling_references(doc: &mut Document) {
    if doc.selected_image_id.is_some_and(|id| !doc.contains(&id)) {
        doc.selected_image_id = None;
    }
    if doc.crop_state.target.is_some_and(|id| !doc.contains(&id)) {
        doc.crop_state = CropState::default();
    }
}

fn add_image(doc: &mut Document, new: NewImage, ctx: &ReduceContext) {
    if !new.has_valid_geometry() {
        debug!(src = new.src.as_str(), "add_image: invalid geometry, ignoring");
        return;
    }
    if let Some(last) = doc.images.last() {
        let age = ctx.now_ms - last.created_at_ms;
        if last.src == new.src
            && same_coordinate(last.x, new.x)
            && same_coordinate(last.y, new.y)
            && (0..ctx.config.duplicate_window_ms).contains(&age)
        {
            debug!(age_ms = age, "add_image: duplicate submission, ignoring");
            return;
        }
    }

    let id = Uuid::new_v4();
    let z_index = i64::try_from(doc.images.len()).unwrap_or(i64::MAX);
    doc.images.push(ImageObject {
        id,
        src: new.src,
        x: new.x,
        y: new.y,
        width: new.width,
        height: new.height,
        original_width: new.original_width,
        original_height: new.original_height,
        z_index,
        visible: new.visible,
        aspect_ratio_locked: new.aspect_ratio_locked.unwrap_or(doc.aspect_ratio_locked),
        rotation: new.rotation.filter(|r| r.is_finite()),
        opacity: new.opacity.filter(|o| o.is_finite()).map(|o| o.clamp(0.0, 1.0)),
        created_at_ms: ctx.now_ms,
    });
    doc.selected_image_id = Some(id);
    checkpoint(doc, HistoryAction::AddImage, None, ctx);
}

fn same_coordinate(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}

fn delete_image(doc: &mut Document, id: &ObjectId, ctx: &ReduceContext) {
    let Some(index) = doc.images.iter().position(|img| img.id == *id) else {
        debug!(%id, "delete_image: unknown image, ignoring");
        return;
    };
    doc.images.remove(index);
    layers::normalize_z_order(&mut doc.images);
    drop_dangling_references(doc);
    checkpoint(doc, HistoryAction::DeleteImage, None, ctx);
}

fn update_crop_selection(doc: &mut Document, rect: Rect) {
    if !doc.crop_state.is_active {
        debug!("update_crop_selection: no crop in progress, ignoring");
        return;
    }
    let Some(bounds) = doc.crop_state.target.and_then(|id| doc.image(&id)).map(|img| Size::new(img.width, img.height))
    else {
        debug!("update_crop_selection: crop target missing, ignoring");
        return;
    };
    if ![rect.x, rect.y, rect.width, rect.height].iter().all(|v| v.is_finite()) {
        debug!("update_crop_selection: non-finite selection, ignoring");
        return;
    }

    // A selection dragged up or left has a negative size; flip it first.
    let normalized = Rect::new(
        rect.x.min(rect.x + rect.width),
        rect.y.min(rect.y + rect.height),
        rect.width.abs(),
        rect.height.abs(),
    );
    doc.crop_state.selection = Some(clamp_rect(normalized, bounds));
}

fn apply_crop(doc: &mut Document, src: Option<ImageSource>, ctx: &ReduceContext) {
    let crop = std::mem::take(&mut doc.crop_state);
    let (Some(id), Some(sel)) = (crop.target, crop.selection) else {
        debug!("apply_crop: no target or selection, crop cleared");
        return;
    };
    if sel.width <= 0.0 || sel.height <= 0.0 {
        debug!(%id, "apply_crop: empty selection, crop cleared");
        return;
    }
    let Some(img) = doc.image_mut(&id) else {
        debug!(%id, "apply_crop: unknown image, crop cleared");
        return;
    };

    // Natural pixels per displayed unit, so the new natural size matches the cropped bytes.
    let scale_x = if img.width > 0.0 { img.original_width / img.width } else { 1.0 };
    let scale_y = if img.height > 0.0 { img.original_height / img.height } else { 1.0 };

    img.x += sel.x;
    img.y += sel.y;
    img.width = sel.width;
    img.height = sel.height;
    img.original_width = sel.width * scale_x;
    img.original_height = sel.height * scale_y;
    if let Some(src) = src {
        img.src = src;
    }
    checkpoint(doc, HistoryAction::CropImage, None, ctx);
}

fn reorder_layer(doc: &mut Document, id: &ObjectId, z_index: f64, ctx: &ReduceContext) {
    let before: Vec<i64> = doc.images.iter().map(|img| img.z_index).collect();
    if !layers::reorder(&mut doc.images, id, z_index) {
        debug!(%id, z_index, "reorder_layer: unknown image or invalid slot, ignoring");
        return;
    }
    if doc.images.iter().map(|img| img.z_index).eq(before) {
        trace!(%id, "reorder_layer: order unchanged");
        return;
    }
    checkpoint(doc, HistoryAction::ReorderLayer, None, ctx);
}

fn load_partial(doc: &mut Document, partial: PartialDocument, ctx: &ReduceContext) {
    let images_replaced = partial.images.is_some();
    if let Some(images) = partial.images {
        doc.images = images;
    }
    if let Some(selected) = partial.selected_image_id {
        doc.selected_image_id = selected;
    }
    if let Some(mode) = partial.drag_mode {
        doc.drag_mode = mode;
    }
    if let Some(locked) = partial.aspect_ratio_locked {
        doc.aspect_ratio_locked = locked;
    }
    if let Some(crop) = partial.crop_state {
        doc.crop_state = crop;
    }
    if let Some(visible) = partial.layer_sidebar_visible {
        doc.layer_sidebar_visible = visible;
    }
    if let Some(dark) = partial.dark_mode {
        doc.dark_mode = dark;
    }

    if !doc.z_order_is_dense() {
        warn!(images = doc.images.len(), "load_partial_state: z-indices not dense, renumbering");
        layers::normalize_z_order(&mut doc.images);
    }

    match partial.history {
        Some(history) => doc.history = history,
        // New images with no history of their own become the initial state.
        None if images_replaced => doc.history = History::seeded(&doc.images, ctx.now_ms),
        None => {}
    }

    let selected = doc.selected_image_id;
    let crop_target = doc.crop_state.target;
    drop_dangling_references(doc);
    if selected != doc.selected_image_id || crop_target != doc.crop_state.target {
        warn!("load_partial_state: dropped references to missing images");
    }
    if doc.history.repair(ctx.config.effective_history_limit()) {
        warn!(steps = doc.history.len(), "load_partial_state: history trimmed to bounds");
    }
}
