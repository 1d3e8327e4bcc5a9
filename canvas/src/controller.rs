//! Pointer streams to reducer actions.
//!
//! Every direct-manipulation gesture follows the same three-phase lifecycle:
//!
//! 1. **Start**: on pointer-down, hit-test and capture the image's starting
//!    geometry into a [`Gesture`]. Nothing is committed yet.
//! 2. **Track**: on pointer-move, remember the latest pointer only. Once per
//!    paint tick [`InteractionController::animation_frame`] turns it into a
//!    single `UpdateImage`, so a burst of pointer events costs one update.
//! 3. **Commit**: on pointer-up (or cancellation), emit the final precise
//!    geometry and, if the net change reaches the dead zone, exactly one
//!    `AddHistoryStep`.
//!
//! The controller only reads the document; it returns actions for the caller
//! to run through the reducer.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use tracing::trace;

use crate::config::{EditorConfig, LiveFeedback};
use crate::doc::{Document, DragMode, ImageUpdate};
use crate::geometry::{Point, Rect, ResizeRequest, clamp_position, resize_rect, snap, snap_rect};
use crate::hit::{HitPart, hit_test};
use crate::history::HistoryAction;
use crate::input::{Gesture, Modifiers};
use crate::reducer::Action;

/// Precision of a computed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// An intermediate tick; may use the coarse tier.
    Live,
    /// The committed result.
    Final,
}

/// Translates pointer events into reducer actions.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    gesture: Gesture,
    /// A pointer-move not yet turned into an update.
    pending: bool,
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Start a gesture at `pointer` (board coordinates).
    ///
    /// While a crop is active, pressing on the crop target starts a crop
    /// selection and everything else is ignored. Otherwise a press on a handle
    /// of the selected image starts a resize, a press on an image body selects
    /// it and starts a move, and a press on empty board clears the selection.
    pub fn pointer_down(
        &mut self,
        doc: &Document,
        pointer: Point,
        modifiers: Modifiers,
        config: &EditorConfig,
    ) -> Vec<Action> {
        self.gesture = Gesture::Idle;
        self.pending = false;

        if doc.crop_state.is_active {
            return self.begin_crop_selection(doc, pointer);
        }

        let Some(hit) = hit_test(pointer, doc, config.handle_radius) else {
            return if doc.selected_image_id.is_some() {
                vec![Action::SelectImage { id: None }]
            } else {
                Vec::new()
            };
        };
        let Some(img) = doc.image(&hit.image_id) else {
            return Vec::new();
        };

        self.gesture = match hit.part {
            HitPart::Body => Gesture::Moving {
                id: img.id,
                start_pointer: pointer,
                start: img.rect(),
                last_pointer: pointer,
                last_modifiers: modifiers,
            },
            HitPart::Handle(handle) => Gesture::Resizing {
                id: img.id,
                handle,
                start_pointer: pointer,
                start: img.rect(),
                aspect_ratio: img.aspect_ratio(),
                locked: img.aspect_ratio_locked,
                last_pointer: pointer,
                last_modifiers: modifiers,
            },
        };
        trace!(id = %img.id, gesture = ?self.gesture, "gesture started");

        if doc.selected_image_id == Some(img.id) {
            Vec::new()
        } else {
            vec![Action::SelectImage { id: Some(img.id) }]
        }
    }

    fn begin_crop_selection(&mut self, doc: &Document, pointer: Point) -> Vec<Action> {
        let Some(img) = doc.crop_state.target.and_then(|id| doc.image(&id)) else {
            return Vec::new();
        };
        if !img.rect().contains(pointer) {
            return Vec::new();
        }
        let image_origin = Point::new(img.x, img.y);
        let origin = pointer.delta_from(image_origin);
        self.gesture = Gesture::SelectingCrop { id: img.id, origin, image_origin, last_pointer: pointer };
        vec![Action::UpdateCropSelection { rect: Rect::new(origin.x, origin.y, 0.0, 0.0) }]
    }

    /// Remember the latest pointer. Produces nothing until the next
    /// [`animation_frame`](Self::animation_frame).
    pub fn pointer_move(&mut self, pointer: Point, modifiers: Modifiers) {
        if self.gesture.is_active() {
            self.gesture.track(pointer, modifiers);
            self.pending = true;
        }
    }

    /// Emit at most one update for all pointer-moves since the last tick.
    pub fn animation_frame(&mut self, doc: &Document, config: &EditorConfig) -> Vec<Action> {
        if !std::mem::take(&mut self.pending) {
            return Vec::new();
        }
        self.update_action(doc, config, Pass::Live).into_iter().collect()
    }

    /// Finish the gesture at `pointer` and commit it.
    pub fn pointer_up(
        &mut self,
        doc: &Document,
        pointer: Point,
        modifiers: Modifiers,
        config: &EditorConfig,
    ) -> Vec<Action> {
        self.gesture.track(pointer, modifiers);
        self.finish(doc, config)
    }

    /// Abandon the gesture (focus loss, pointer capture lost). Commits the
    /// last known pointer position exactly like a release there.
    pub fn cancel(&mut self, doc: &Document, config: &EditorConfig) -> Vec<Action> {
        self.finish(doc, config)
    }

    fn finish(&mut self, doc: &Document, config: &EditorConfig) -> Vec<Action> {
        self.pending = false;
        let gesture = std::mem::take(&mut self.gesture);

        let (id, start, history_action) = match gesture {
            Gesture::Moving { id, start, .. } => (id, start, HistoryAction::MoveImage),
            Gesture::Resizing { id, start, .. } => (id, start, HistoryAction::ResizeImage),
            Gesture::SelectingCrop { .. } => return crop_selection_action(&gesture).into_iter().collect(),
            Gesture::Idle => return Vec::new(),
        };
        let Some(end) = gesture_geometry(doc, config, &gesture, Pass::Final) else {
            return Vec::new();
        };

        let mut actions = vec![Action::UpdateImage { id, changes: ImageUpdate::geometry(end) }];
        let moved = start.max_difference(&end);
        if moved >= config.dead_zone {
            actions.push(Action::AddHistoryStep {
                action: history_action,
                description: history_action.label().to_owned(),
            });
        } else {
            trace!(moved, "gesture inside dead zone, not recorded");
        }
        actions
    }

    fn update_action(&self, doc: &Document, config: &EditorConfig, pass: Pass) -> Option<Action> {
        if let Some(action) = crop_selection_action(&self.gesture) {
            return Some(action);
        }
        let id = self.gesture.target()?;
        let rect = gesture_geometry(doc, config, &self.gesture, pass)?;
        Some(Action::UpdateImage { id, changes: ImageUpdate::geometry(rect) })
    }
}

/// Crop selection from the drag origin to the latest pointer, in image space.
fn crop_selection_action(gesture: &Gesture) -> Option<Action> {
    let Gesture::SelectingCrop { origin, image_origin, last_pointer, .. } = *gesture else {
        return None;
    };
    let local = last_pointer.delta_from(image_origin);
    Some(Action::UpdateCropSelection { rect: Rect::new(origin.x, origin.y, local.x - origin.x, local.y - origin.y) })
}

/// Geometry of the gesture's image for its latest pointer.
fn gesture_geometry(doc: &Document, config: &EditorConfig, gesture: &Gesture, pass: Pass) -> Option<Rect> {
    let grid_mode = doc.drag_mode == DragMode::GridSnap;
    let coarse = pass == Pass::Live && config.live_feedback == LiveFeedback::Coarse;
    let grid = match (grid_mode, coarse) {
        (false, _) => None,
        (true, false) => Some(config.grid_size),
        (true, true) => Some(config.coarse_grid_size),
    };

    let rect = match *gesture {
        Gesture::Moving { id, start_pointer, start, last_pointer, .. } => {
            doc.image(&id)?;
            let delta = last_pointer.delta_from(start_pointer);
            let mut x = start.x + delta.x;
            let mut y = start.y + delta.y;
            if let Some(g) = grid {
                x = snap(x, g);
                y = snap(y, g);
            }
            clamp_position(Rect::new(x, y, start.width, start.height), config.board)
        }
        Gesture::Resizing { id, handle, start_pointer, start, aspect_ratio, locked, last_pointer, last_modifiers } => {
            doc.image(&id)?;
            let lock = locked && !last_modifiers.overrides_aspect_lock();
            resize_rect(&ResizeRequest {
                start,
                handle,
                delta: last_pointer.delta_from(start_pointer),
                aspect_ratio: lock.then_some(aspect_ratio),
                min_size: config.min_size,
                container: config.board,
                grid,
            })
        }
        Gesture::Idle | Gesture::SelectingCrop { .. } => return None,
    };

    // Coarse free-mode feedback settles for whole units.
    if coarse && !grid_mode { Some(snap_rect(rect, 1.0)) } else { Some(rect) }
}
