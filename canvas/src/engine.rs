use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::EditorConfig;
use crate::controller::InteractionController;
use crate::doc::{Document, ImageSource, ObjectId};
use crate::geometry::{Point, Rect, Size};
use crate::input::Modifiers;
use crate::layers;
use crate::persist::PersistedState;
use crate::placement::place_new_image;
use crate::reducer::{Action, ReduceContext, reduce};
use crate::render::{ExportPlan, RenderItem, export_plan, render_list};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Source of the current time for history timestamps and the duplicate guard.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return 0;
        };
        i64::try_from(dur.as_millis()).unwrap_or(0)
    }
}

/// The editor: one document, the gesture controller, and the config.
///
/// All document changes go through [`Editor::dispatch`], which runs the
/// reducer. Input handlers return the actions they dispatched so the host
/// can tell what happened (repaint, persist).
#[derive(Debug)]
pub struct Editor<C: Clock = SystemClock> {
    doc: Document,
    controller: InteractionController,
    config: EditorConfig,
    clock: C,
}

impl Editor<SystemClock> {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Editor<C> {
    /// Create an editor that reads time from `clock`.
    #[must_use]
    pub fn with_clock(config: EditorConfig, clock: C) -> Self {
        Self { doc: Document::new(), controller: InteractionController::new(), config, clock }
    }

    fn context(&self) -> ReduceContext {
        ReduceContext::new(self.config, self.clock.now_ms())
    }

    // --- Data inputs ---

    /// Run one action through the reducer.
    pub fn dispatch(&mut self, action: Action) {
        let ctx = self.context();
        let doc = std::mem::take(&mut self.doc);
        self.doc = reduce(doc, action, &ctx);
    }

    /// Run several actions in order and hand them back.
    pub fn dispatch_all(&mut self, actions: Vec<Action>) -> Vec<Action> {
        for action in &actions {
            self.dispatch(action.clone());
        }
        actions
    }

    /// Update the board size, e.g. after the host window was resized.
    pub fn set_board_size(&mut self, width: f64, height: f64) {
        self.config = self.config.with_board(width, height);
    }

    /// Add a freshly decoded image, placed and downscaled for `viewport`
    /// (the whole board when `None`). Returns the new image's id, or `None`
    /// when the add was rejected (duplicate submission, invalid size).
    pub fn paste_image(&mut self, src: ImageSource, natural: Size, viewport: Option<Rect>) -> Option<ObjectId> {
        let new = place_new_image(&self.doc, src, natural, viewport, self.config.board);
        let before = self.doc.len();
        self.dispatch(Action::AddImage(new));
        if self.doc.len() > before { self.doc.selected_image_id } else { None }
    }

    /// Load a persisted layout. Images whose source was not stored are looked
    /// up with `source_for`; those it cannot supply are skipped.
    pub fn load_persisted<F>(&mut self, state: PersistedState, source_for: F)
    where
        F: FnMut(&ObjectId) -> Option<ImageSource>,
    {
        self.dispatch(Action::LoadPartialState(state.into_partial(source_for)));
    }

    // --- Commands ---

    /// Delete the selected image, if any.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.doc.selected_image_id else {
            return false;
        };
        self.dispatch(Action::DeleteImage { id });
        true
    }

    pub fn undo(&mut self) {
        self.dispatch(Action::Undo);
    }

    pub fn redo(&mut self) {
        self.dispatch(Action::Redo);
    }

    /// Move an image one layer up. `false` when it is already on top or unknown.
    pub fn bring_forward(&mut self, id: &ObjectId) -> bool {
        let target = layers::forward_target(&self.doc.images, id);
        self.reorder_to(id, target)
    }

    /// Move an image one layer down. `false` when it is already at the bottom or unknown.
    pub fn send_backward(&mut self, id: &ObjectId) -> bool {
        let target = layers::backward_target(&self.doc.images, id);
        self.reorder_to(id, target)
    }

    /// Move an image to the top of the stack.
    pub fn bring_to_front(&mut self, id: &ObjectId) -> bool {
        let target = layers::front_target(&self.doc.images, id);
        self.reorder_to(id, target)
    }

    /// Move an image to the bottom of the stack.
    pub fn send_to_back(&mut self, id: &ObjectId) -> bool {
        let target = layers::back_target(&self.doc.images, id);
        self.reorder_to(id, target)
    }

    fn reorder_to(&mut self, id: &ObjectId, target: Option<f64>) -> bool {
        let Some(z_index) = target else {
            return false;
        };
        self.dispatch(Action::ReorderLayer { id: *id, z_index });
        true
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.controller.pointer_down(&self.doc, pt, modifiers, &self.config);
        self.dispatch_all(actions)
    }

    /// Track the pointer. Updates are emitted by [`Editor::on_animation_frame`].
    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) {
        self.controller.pointer_move(pt, modifiers);
    }

    /// Once per paint tick: apply the latest coalesced pointer position.
    pub fn on_animation_frame(&mut self) -> Vec<Action> {
        let actions = self.controller.animation_frame(&self.doc, &self.config);
        self.dispatch_all(actions)
    }

    pub fn on_pointer_up(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.controller.pointer_up(&self.doc, pt, modifiers, &self.config);
        self.dispatch_all(actions)
    }

    /// The host lost the gesture (focus loss, capture lost). Commits like a
    /// release at the last known pointer position.
    pub fn on_gesture_cancel(&mut self) -> Vec<Action> {
        let actions = self.controller.cancel(&self.doc, &self.config);
        self.dispatch_all(actions)
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The currently selected image, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.doc.selected_image_id
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.doc.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.doc.history.can_redo()
    }

    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.controller.gesture().is_active()
    }

    /// Visible images in paint order.
    #[must_use]
    pub fn render_list(&self) -> Vec<RenderItem> {
        render_list(&self.doc)
    }

    /// Plan an export of the visible images.
    #[must_use]
    pub fn export_plan(&self, scale: f64) -> Option<ExportPlan> {
        export_plan(&self.doc, scale)
    }

    /// The stored form of the current document.
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        PersistedState::from_document(&self.doc)
    }
}
