use super::*;

const T0: i64 = 1_000_000;

fn ctx_at(now_ms: i64) -> ReduceContext {
    ReduceContext::new(EditorConfig::default(), now_ms)
}

fn ctx() -> ReduceContext {
    ctx_at(T0)
}

fn add(doc: Document, src: &str, x: f64, y: f64, now_ms: i64) -> Document {
    let new = NewImage::at_natural_size(src, x, y, 200.0, 100.0);
    reduce(doc, Action::AddImage(new), &ctx_at(now_ms))
}

/// A document with `n` images added one second apart.
fn doc_with(n: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..n {
        let offset = f64::from(u32::try_from(i).unwrap());
        doc = add(doc, &format!("blob:{i}"), offset * 10.0, offset * 10.0, T0 + i64::try_from(i).unwrap() * 1000);
    }
    doc
}

fn id_at(doc: &Document, index: usize) -> ObjectId {
    doc.images[index].id
}

fn z(doc: &Document, id: &ObjectId) -> i64 {
    doc.image(id).map_or(-1, |img| img.z_index)
}

// =============================================================
// AddImage
// =============================================================

#[test]
fn add_image_assigns_id_top_z_and_selects() {
    let doc = doc_with(2);
    let second = &doc.images[1];
    assert_eq!(second.z_index, 1);
    assert_eq!(doc.selected_image_id, Some(second.id));
    assert_ne!(doc.images[0].id, second.id);
    assert_eq!(second.created_at_ms, T0 + 1000);
}

#[test]
fn add_image_records_history() {
    let doc = doc_with(1);
    assert_eq!(doc.history.len(), 2);
    let step = doc.history.current().unwrap();
    assert_eq!(step.action, HistoryAction::AddImage);
    assert_eq!(step.images.len(), 1);
}

#[test]
fn add_image_inherits_document_aspect_lock() {
    let doc = reduce(Document::new(), Action::ToggleAspectRatioLock, &ctx());
    let doc = add(doc, "blob:a", 0.0, 0.0, T0);
    assert!(!doc.images[0].aspect_ratio_locked);
}

#[test]
fn add_image_explicit_lock_wins() {
    let mut new = NewImage::at_natural_size("blob:a", 0.0, 0.0, 200.0, 100.0);
    new.aspect_ratio_locked = Some(false);
    let doc = reduce(Document::new(), Action::AddImage(new), &ctx());
    assert!(!doc.images[0].aspect_ratio_locked);
}

#[test]
fn add_image_duplicate_within_window_ignored() {
    let doc = add(Document::new(), "blob:a", 5.0, 5.0, T0);
    let doc = add(doc, "blob:a", 5.0, 5.0, T0 + 10);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.history.len(), 2);
}

#[test]
fn add_image_same_source_after_window_accepted() {
    let doc = add(Document::new(), "blob:a", 5.0, 5.0, T0);
    let doc = add(doc, "blob:a", 5.0, 5.0, T0 + 50);
    assert_eq!(doc.len(), 2);
}

#[test]
fn add_image_same_source_elsewhere_accepted() {
    let doc = add(Document::new(), "blob:a", 5.0, 5.0, T0);
    let doc = add(doc, "blob:a", 25.0, 5.0, T0 + 1);
    assert_eq!(doc.len(), 2);
}

#[test]
fn add_image_invalid_geometry_ignored() {
    let mut new = NewImage::at_natural_size("blob:a", 0.0, 0.0, 200.0, 100.0);
    new.height = 0.0;
    let doc = reduce(Document::new(), Action::AddImage(new), &ctx());
    assert!(doc.is_empty());
    assert_eq!(doc.history.len(), 1);
}

#[test]
fn add_image_clamps_opacity() {
    let mut new = NewImage::at_natural_size("blob:a", 0.0, 0.0, 200.0, 100.0);
    new.opacity = Some(3.0);
    let doc = reduce(Document::new(), Action::AddImage(new), &ctx());
    assert_eq!(doc.images[0].opacity, Some(1.0));
}

// =============================================================
// DeleteImage
// =============================================================

#[test]
fn delete_renumbers_densely() {
    let doc = doc_with(3);
    let (a, b, c) = (id_at(&doc, 0), id_at(&doc, 1), id_at(&doc, 2));
    let doc = reduce(doc, Action::DeleteImage { id: b }, &ctx());
    assert_eq!(doc.len(), 2);
    assert!(!doc.contains(&b));
    assert_eq!((z(&doc, &a), z(&doc, &c)), (0, 1));
}

#[test]
fn delete_selected_clears_selection() {
    let doc = doc_with(2);
    let selected = doc.selected_image_id.unwrap();
    let doc = reduce(doc, Action::DeleteImage { id: selected }, &ctx());
    assert!(doc.selected_image_id.is_none());
}

#[test]
fn delete_other_keeps_selection() {
    let doc = doc_with(2);
    let selected = doc.selected_image_id;
    let other = id_at(&doc, 0);
    let doc = reduce(doc, Action::DeleteImage { id: other }, &ctx());
    assert_eq!(doc.selected_image_id, selected);
}

#[test]
fn delete_crop_target_cancels_crop() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let doc = reduce(doc, Action::StartCrop { id }, &ctx());
    let doc = reduce(doc, Action::DeleteImage { id }, &ctx());
    assert_eq!(doc.crop_state, CropState::default());
}

#[test]
fn delete_unknown_is_noop() {
    let doc = doc_with(2);
    let before = doc.clone();
    let doc = reduce(doc, Action::DeleteImage { id: Uuid::new_v4() }, &ctx());
    assert_eq!(doc, before);
}

#[test]
fn delete_records_history() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let doc = reduce(doc, Action::DeleteImage { id }, &ctx());
    assert_eq!(doc.history.current().map(|s| s.action), Some(HistoryAction::DeleteImage));
}

// =============================================================
// UpdateImage
// =============================================================

#[test]
fn update_image_merges_without_history() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let steps = doc.history.len();
    let doc = reduce(doc, Action::UpdateImage { id, changes: ImageUpdate::position(300.0, 400.0) }, &ctx());
    let img = doc.image(&id).unwrap();
    assert_eq!((img.x, img.y), (300.0, 400.0));
    assert_eq!(img.width, 200.0);
    assert_eq!(doc.history.len(), steps);
}

#[test]
fn update_unknown_image_is_noop() {
    let doc = doc_with(1);
    let before = doc.clone();
    let changes = ImageUpdate::position(1.0, 1.0);
    let doc = reduce(doc, Action::UpdateImage { id: Uuid::new_v4(), changes }, &ctx());
    assert_eq!(doc, before);
}

// =============================================================
// Selection and toggles
// =============================================================

#[test]
fn select_existing_and_clear() {
    let doc = doc_with(2);
    let first = id_at(&doc, 0);
    let doc = reduce(doc, Action::SelectImage { id: Some(first) }, &ctx());
    assert_eq!(doc.selected_image_id, Some(first));
    let doc = reduce(doc, Action::SelectImage { id: None }, &ctx());
    assert!(doc.selected_image_id.is_none());
}

#[test]
fn select_unknown_keeps_current() {
    let doc = doc_with(1);
    let selected = doc.selected_image_id;
    let doc = reduce(doc, Action::SelectImage { id: Some(Uuid::new_v4()) }, &ctx());
    assert_eq!(doc.selected_image_id, selected);
}

#[test]
fn set_drag_mode() {
    let doc = reduce(Document::new(), Action::SetDragMode { mode: DragMode::GridSnap }, &ctx());
    assert_eq!(doc.drag_mode, DragMode::GridSnap);
}

#[test]
fn document_toggles_record_no_history() {
    let mut doc = Document::new();
    for action in [Action::ToggleAspectRatioLock, Action::ToggleLayerSidebar, Action::ToggleDarkMode] {
        doc = reduce(doc, action, &ctx());
    }
    assert!(!doc.aspect_ratio_locked);
    assert!(doc.layer_sidebar_visible);
    assert!(doc.dark_mode);
    assert_eq!(doc.history.len(), 1);
}

#[test]
fn toggle_image_aspect_lock_records_history() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let doc = reduce(doc, Action::ToggleImageAspectRatioLock { id }, &ctx());
    assert!(!doc.image(&id).unwrap().aspect_ratio_locked);
    assert_eq!(doc.history.current().map(|s| s.action), Some(HistoryAction::ToggleAspectRatio));
}

#[test]
fn toggle_visibility_records_history() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let doc = reduce(doc, Action::ToggleLayerVisibility { id }, &ctx());
    assert!(!doc.image(&id).unwrap().visible);
    assert_eq!(doc.history.current().map(|s| s.action), Some(HistoryAction::ToggleVisibility));
    let doc = reduce(doc, Action::ToggleLayerVisibility { id }, &ctx());
    assert!(doc.image(&id).unwrap().visible);
}

// =============================================================
// History
// =============================================================

#[test]
fn undo_redo_round_trip() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let doc = reduce(doc, Action::UpdateImage { id, changes: ImageUpdate::position(500.0, 500.0) }, &ctx());
    let doc = reduce(
        doc,
        Action::AddHistoryStep { action: HistoryAction::MoveImage, description: "Moved image".into() },
        &ctx(),
    );
    let after_move = doc.images.clone();

    let doc = reduce(doc, Action::Undo, &ctx());
    assert_eq!(doc.image(&id).map(|i| (i.x, i.y)), Some((0.0, 0.0)));

    let doc = reduce(doc, Action::Redo, &ctx());
    assert_eq!(doc.images, after_move);
}

#[test]
fn undo_all_then_redo_all_over_mixed_edits() {
    let doc = Document::new();
    let initial = doc.images.clone();

    // Three adds, then one of every other recorded edit.
    let doc = doc_with(3);
    let (a, b, c) = (id_at(&doc, 0), id_at(&doc, 1), id_at(&doc, 2));
    let doc = reduce(doc, Action::ReorderLayer { id: a, z_index: 2.0 }, &ctx());
    let doc = reduce(doc, Action::ToggleLayerVisibility { id: b }, &ctx());
    let doc = reduce(doc, Action::StartCrop { id: c }, &ctx());
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(10.0, 10.0, 100.0, 50.0) }, &ctx());
    let doc = reduce(doc, Action::ApplyCrop { src: None }, &ctx());
    let doc = reduce(doc, Action::UpdateImage { id: b, changes: ImageUpdate::position(400.0, 300.0) }, &ctx());
    let doc = reduce(
        doc,
        Action::AddHistoryStep { action: HistoryAction::MoveImage, description: "Moved image".into() },
        &ctx(),
    );
    let mut doc = reduce(doc, Action::DeleteImage { id: a }, &ctx());

    let edits = 8;
    assert_eq!(doc.history.len(), edits + 1);
    let last = doc.images.clone();

    for _ in 0..edits {
        doc = reduce(doc, Action::Undo, &ctx());
    }
    assert_eq!(doc.images, initial);
    assert!(!doc.history.can_undo());

    for _ in 0..edits {
        doc = reduce(doc, Action::Redo, &ctx());
    }
    assert_eq!(doc.images, last);
    assert!(!doc.history.can_redo());
    assert!(doc.z_order_is_dense());
}

#[test]
fn undo_redo_leave_document_settings_alone() {
    let doc = doc_with(2);
    let first = id_at(&doc, 0);
    let doc = reduce(doc, Action::SetDragMode { mode: DragMode::GridSnap }, &ctx());
    let doc = reduce(doc, Action::ToggleLayerSidebar, &ctx());
    let doc = reduce(doc, Action::ToggleDarkMode, &ctx());
    let doc = reduce(doc, Action::SelectImage { id: Some(first) }, &ctx());
    let doc = reduce(doc, Action::ToggleLayerVisibility { id: first }, &ctx());

    let check = |doc: &Document| {
        assert_eq!(doc.drag_mode, DragMode::GridSnap);
        assert!(doc.layer_sidebar_visible);
        assert!(doc.dark_mode);
        assert_eq!(doc.selected_image_id, Some(first));
    };

    let doc = reduce(doc, Action::Undo, &ctx());
    assert!(doc.image(&first).unwrap().visible);
    check(&doc);

    let doc = reduce(doc, Action::Redo, &ctx());
    assert!(!doc.image(&first).unwrap().visible);
    check(&doc);
}

#[test]
fn undo_first_add_returns_to_empty_board() {
    let doc = doc_with(1);
    let doc = reduce(doc, Action::Undo, &ctx());
    assert!(doc.is_empty());
    assert!(doc.selected_image_id.is_none());
    assert!(!doc.history.can_undo());
}

#[test]
fn undo_at_oldest_is_noop() {
    let doc = Document::new();
    let before = doc.clone();
    let doc = reduce(doc, Action::Undo, &ctx());
    assert_eq!(doc, before);
}

#[test]
fn redo_at_newest_is_noop() {
    let doc = doc_with(2);
    let before = doc.clone();
    let doc = reduce(doc, Action::Redo, &ctx());
    assert_eq!(doc, before);
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let doc = doc_with(2);
    let doc = reduce(doc, Action::Undo, &ctx());
    assert!(doc.history.can_redo());
    let doc = add(doc, "blob:new", 400.0, 400.0, T0 + 60_000);
    assert!(!doc.history.can_redo());
    assert_eq!(doc.len(), 2);
}

#[test]
fn history_capped_at_limit() {
    let mut doc = doc_with(1);
    let id = id_at(&doc, 0);
    for i in 0..150 {
        let x = f64::from(i);
        doc = reduce(doc, Action::UpdateImage { id, changes: ImageUpdate::position(x, 0.0) }, &ctx());
        doc = reduce(
            doc,
            Action::AddHistoryStep { action: HistoryAction::MoveImage, description: String::new() },
            &ctx(),
        );
    }
    assert_eq!(doc.history.len(), 100);
    assert_eq!(doc.history.cursor(), Some(99));
    assert!(doc.history.steps().all(|s| !s.description.is_empty()));
}

#[test]
fn add_history_step_uses_given_description() {
    let doc = doc_with(1);
    let doc = reduce(
        doc,
        Action::AddHistoryStep { action: HistoryAction::MultipleChanges, description: "Batch".into() },
        &ctx(),
    );
    assert_eq!(doc.history.current().map(|s| s.description.as_str()), Some("Batch"));
}

#[test]
fn history_snapshot_not_affected_by_later_updates() {
    let doc = doc_with(1);
    let id = id_at(&doc, 0);
    let doc = reduce(doc, Action::UpdateImage { id, changes: ImageUpdate::position(77.0, 77.0) }, &ctx());
    let snapshot_x = doc.history.current().and_then(|s| s.images.first()).map(|i| i.x);
    assert_eq!(snapshot_x, Some(0.0));
}

// =============================================================
// Crop
// =============================================================

fn cropping() -> (Document, ObjectId) {
    // 200x100 displayed from a 400x200 original, at (100, 100).
    let new = NewImage {
        original_width: 400.0,
        original_height: 200.0,
        ..NewImage::at_natural_size("blob:a", 100.0, 100.0, 200.0, 100.0)
    };
    let doc = reduce(Document::new(), Action::AddImage(new), &ctx());
    let id = id_at(&doc, 0);
    (reduce(doc, Action::StartCrop { id }, &ctx()), id)
}

#[test]
fn start_crop_activates() {
    let (doc, id) = cropping();
    assert!(doc.crop_state.is_active);
    assert_eq!(doc.crop_state.target, Some(id));
    assert!(doc.crop_state.selection.is_none());
}

#[test]
fn start_crop_unknown_is_noop() {
    let doc = reduce(Document::new(), Action::StartCrop { id: Uuid::new_v4() }, &ctx());
    assert!(!doc.crop_state.is_active);
}

#[test]
fn crop_selection_normalized_and_clamped() {
    let (doc, _) = cropping();
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(150.0, 80.0, -100.0, -60.0) }, &ctx());
    assert_eq!(doc.crop_state.selection, Some(Rect::new(50.0, 20.0, 100.0, 60.0)));

    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(150.0, 50.0, 200.0, 200.0) }, &ctx());
    assert_eq!(doc.crop_state.selection, Some(Rect::new(150.0, 50.0, 50.0, 50.0)));
}

#[test]
fn crop_selection_without_active_crop_ignored() {
    let doc = doc_with(1);
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(0.0, 0.0, 10.0, 10.0) }, &ctx());
    assert!(doc.crop_state.selection.is_none());
}

#[test]
fn apply_crop_replaces_geometry() {
    let (doc, id) = cropping();
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(20.0, 10.0, 100.0, 50.0) }, &ctx());
    let doc = reduce(doc, Action::ApplyCrop { src: Some(ImageSource::from("blob:cropped")) }, &ctx());

    let img = doc.image(&id).unwrap();
    assert_eq!(img.rect(), Rect::new(120.0, 110.0, 100.0, 50.0));
    assert_eq!((img.original_width, img.original_height), (200.0, 100.0));
    assert_eq!(img.src.as_str(), "blob:cropped");
    assert_eq!(doc.crop_state, CropState::default());
    assert_eq!(doc.history.current().map(|s| s.action), Some(HistoryAction::CropImage));
}

#[test]
fn apply_crop_keeps_source_when_none_given() {
    let (doc, id) = cropping();
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(0.0, 0.0, 50.0, 50.0) }, &ctx());
    let doc = reduce(doc, Action::ApplyCrop { src: None }, &ctx());
    assert_eq!(doc.image(&id).unwrap().src.as_str(), "blob:a");
}

#[test]
fn apply_crop_without_selection_only_clears() {
    let (doc, id) = cropping();
    let steps = doc.history.len();
    let doc = reduce(doc, Action::ApplyCrop { src: None }, &ctx());
    assert_eq!(doc.crop_state, CropState::default());
    assert_eq!(doc.image(&id).unwrap().width, 200.0);
    assert_eq!(doc.history.len(), steps);
}

#[test]
fn apply_crop_with_empty_selection_only_clears() {
    let (doc, _) = cropping();
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(10.0, 10.0, 0.0, 0.0) }, &ctx());
    let steps = doc.history.len();
    let doc = reduce(doc, Action::ApplyCrop { src: None }, &ctx());
    assert!(!doc.crop_state.is_active);
    assert_eq!(doc.history.len(), steps);
}

#[test]
fn cancel_crop_leaves_image_untouched() {
    let (doc, id) = cropping();
    let before = doc.image(&id).cloned();
    let doc = reduce(doc, Action::UpdateCropSelection { rect: Rect::new(0.0, 0.0, 50.0, 50.0) }, &ctx());
    let doc = reduce(doc, Action::CancelCrop, &ctx());
    assert_eq!(doc.crop_state, CropState::default());
    assert_eq!(doc.image(&id).cloned(), before);
}

// =============================================================
// ReorderLayer
// =============================================================

#[test]
fn reorder_bottom_to_top_scenario() {
    let doc = doc_with(3);
    let (a, b, c) = (id_at(&doc, 0), id_at(&doc, 1), id_at(&doc, 2));
    let doc = reduce(doc, Action::ReorderLayer { id: a, z_index: 2.0 }, &ctx());
    assert_eq!((z(&doc, &a), z(&doc, &b), z(&doc, &c)), (2, 0, 1));
    assert_eq!(doc.history.current().map(|s| s.action), Some(HistoryAction::ReorderLayer));
}

#[test]
fn reorder_to_current_slot_records_nothing() {
    let doc = doc_with(3);
    let steps = doc.history.len();
    let b = id_at(&doc, 1);
    let doc = reduce(doc, Action::ReorderLayer { id: b, z_index: 1.0 }, &ctx());
    assert_eq!(doc.history.len(), steps);
}

#[test]
fn reorder_unknown_is_noop() {
    let doc = doc_with(2);
    let before = doc.clone();
    let doc = reduce(doc, Action::ReorderLayer { id: Uuid::new_v4(), z_index: 0.0 }, &ctx());
    assert_eq!(doc, before);
}

// =============================================================
// ClearImages / Reset
// =============================================================

#[test]
fn clear_images_is_undoable() {
    let doc = doc_with(2);
    let doc = reduce(doc, Action::ClearImages, &ctx());
    assert!(doc.is_empty());
    assert!(doc.selected_image_id.is_none());
    let doc = reduce(doc, Action::Undo, &ctx());
    assert_eq!(doc.len(), 2);
}

#[test]
fn clear_empty_board_records_nothing() {
    let doc = reduce(Document::new(), Action::ClearImages, &ctx());
    assert_eq!(doc.history.len(), 1);
}

#[test]
fn reset_returns_to_default() {
    let doc = doc_with(2);
    let doc = reduce(doc, Action::ToggleDarkMode, &ctx());
    let doc = reduce(doc, Action::Reset, &ctx_at(T0 + 5));
    assert!(doc.is_empty());
    assert!(!doc.dark_mode);
    assert_eq!(doc.history.len(), 1);
    assert_eq!(doc.history.current().map(|s| s.timestamp_ms), Some(T0 + 5));
}

// =============================================================
// LoadPartialState
// =============================================================

#[test]
fn load_partial_merges_present_fields_only() {
    let doc = doc_with(1);
    let images = doc.images.clone();
    let partial = PartialDocument { dark_mode: Some(true), ..Default::default() };
    let doc = reduce(doc, Action::LoadPartialState(partial), &ctx());
    assert!(doc.dark_mode);
    assert_eq!(doc.images, images);
    assert!(doc.selected_image_id.is_some());
}

#[test]
fn load_partial_renumbers_sparse_z() {
    let mut images = doc_with(3).images;
    images[0].z_index = 10;
    images[1].z_index = 4;
    images[2].z_index = 7;
    let partial = PartialDocument { images: Some(images), ..Default::default() };
    let doc = reduce(Document::new(), Action::LoadPartialState(partial), &ctx());
    assert!(doc.z_order_is_dense());
    let zs: Vec<i64> = doc.images.iter().map(|i| i.z_index).collect();
    assert_eq!(zs, vec![2, 0, 1]);
}

#[test]
fn load_partial_drops_dangling_selection_and_crop() {
    let ghost = Uuid::new_v4();
    let partial = PartialDocument {
        images: Some(Vec::new()),
        selected_image_id: Some(Some(ghost)),
        crop_state: Some(CropState::begin(ghost)),
        ..Default::default()
    };
    let doc = reduce(doc_with(1), Action::LoadPartialState(partial), &ctx());
    assert!(doc.selected_image_id.is_none());
    assert_eq!(doc.crop_state, CropState::default());
}

#[test]
fn load_partial_images_without_history_reseed() {
    let images = doc_with(2).images;
    let partial = PartialDocument { images: Some(images.clone()), ..Default::default() };
    let doc = reduce(doc_with(4), Action::LoadPartialState(partial), &ctx());
    assert_eq!(doc.history.len(), 1);
    assert_eq!(doc.history.current().map(|s| s.images.len()), Some(2));
    assert_eq!(doc.images, images);
}

#[test]
fn load_partial_explicit_null_clears_selection() {
    let doc = doc_with(1);
    let partial = PartialDocument { selected_image_id: Some(None), ..Default::default() };
    let doc = reduce(doc, Action::LoadPartialState(partial), &ctx());
    assert!(doc.selected_image_id.is_none());
}

#[test]
fn load_partial_history_trimmed_to_limit() {
    let mut history = History::new();
    for _ in 0..120 {
        history.record(HistoryAction::MoveImage, "Moved image", &[], 0, usize::MAX);
    }
    let partial = PartialDocument { history: Some(history), ..Default::default() };
    let doc = reduce(Document::new(), Action::LoadPartialState(partial), &ctx());
    assert_eq!(doc.history.len(), 100);
    assert_eq!(doc.history.cursor(), Some(99));
}

#[test]
fn load_partial_from_json() {
    let json = r#"{"type":"load_partial_state","drag_mode":"grid-snap","selected_image_id":null}"#;
    let action: Action = serde_json::from_str(json).unwrap();
    let doc = reduce(doc_with(1), action, &ctx());
    assert_eq!(doc.drag_mode, DragMode::GridSnap);
    assert!(doc.selected_image_id.is_none());
}

// =============================================================
// Serde
// =============================================================

#[test]
fn action_tagged_by_type() {
    let json = serde_json::to_value(Action::Undo).unwrap();
    assert_eq!(json["type"], "undo");

    let action: Action = serde_json::from_str(r#"{"type":"set_drag_mode","mode":"grid-snap"}"#).unwrap();
    assert_eq!(action, Action::SetDragMode { mode: DragMode::GridSnap });

    let action: Action = serde_json::from_str(r#"{"type":"apply_crop"}"#).unwrap();
    assert_eq!(action, Action::ApplyCrop { src: None });
}

#[test]
fn invariants_hold_after_mixed_sequence() {
    let mut doc = doc_with(4);
    let ids: Vec<ObjectId> = doc.images.iter().map(|i| i.id).collect();
    let actions = vec![
        Action::ReorderLayer { id: ids[0], z_index: 3.0 },
        Action::DeleteImage { id: ids[2] },
        Action::UpdateImage { id: ids[1], changes: ImageUpdate::position(5.0, 5.0) },
        Action::Undo,
        Action::Undo,
        Action::Redo,
        Action::ReorderLayer { id: ids[3], z_index: -1.0 },
        Action::SelectImage { id: Some(ids[2]) },
    ];
    for action in actions {
        doc = reduce(doc, action, &ctx());
        assert!(doc.z_order_is_dense());
        assert!(doc.selected_image_id.is_none_or(|id| doc.contains(&id)));
        assert!(doc.history.len() <= 100);
    }
}
