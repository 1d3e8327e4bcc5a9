//! Linear undo/redo history of image-collection snapshots.
//!
//! DESIGN
//! ======
//! Each `HistoryStep` owns an immutable snapshot of the image collection at
//! the moment it was recorded. Snapshots sit behind an `Arc`, so cloning a
//! `History` (and therefore a `Document`) shares them instead of copying
//! every image again; nothing ever mutates a recorded snapshot.
//!
//! The cursor always points at the step representing the state on screen.
//! Recording after an undo drops every step past the cursor (no redo tree),
//! and the oldest steps are evicted once the configured cap is exceeded.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::doc::ImageObject;

/// What kind of edit a history step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryAction {
    AddImage,
    DeleteImage,
    MoveImage,
    ResizeImage,
    CropImage,
    ReorderLayer,
    ToggleVisibility,
    ToggleAspectRatio,
    MultipleChanges,
}

impl HistoryAction {
    /// Default human-readable description for a step of this kind.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AddImage => "Added image",
            Self::DeleteImage => "Deleted image",
            Self::MoveImage => "Moved image",
            Self::ResizeImage => "Resized image",
            Self::CropImage => "Cropped image",
            Self::ReorderLayer => "Reordered layer",
            Self::ToggleVisibility => "Toggled visibility",
            Self::ToggleAspectRatio => "Toggled aspect ratio lock",
            Self::MultipleChanges => "Multiple changes",
        }
    }
}

/// One named, timestamped, immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStep {
    pub id: Uuid,
    pub action: HistoryAction,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub description: String,
    /// The image collection at the time of recording.
    pub images: Arc<Vec<ImageObject>>,
}

/// Bounded linear history with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    steps: VecDeque<HistoryStep>,
    /// Index of the step on screen; `None` only while the history is empty.
    cursor: Option<usize>,
}

impl History {
    /// An empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A history holding a single "Initial state" step for `images`.
    #[must_use]
    pub fn seeded(images: &[ImageObject], timestamp_ms: i64) -> Self {
        let mut history = Self::new();
        history.record(HistoryAction::MultipleChanges, "Initial state", images, timestamp_ms, usize::MAX);
        history
    }

    /// Append a snapshot of `images` after the cursor.
    ///
    /// Steps past the cursor are discarded first. Returns how many of the
    /// oldest steps were evicted to stay within `limit`.
    pub fn record(
        &mut self,
        action: HistoryAction,
        description: impl Into<String>,
        images: &[ImageObject],
        timestamp_ms: i64,
        limit: usize,
    ) -> usize {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.steps.truncate(keep);
        self.steps.push_back(HistoryStep {
            id: Uuid::new_v4(),
            action,
            timestamp_ms,
            description: description.into(),
            images: Arc::new(images.to_vec()),
        });
        self.cursor = Some(self.steps.len() - 1);
        self.evict_over(limit)
    }

    fn evict_over(&mut self, limit: usize) -> usize {
        let limit = limit.max(1);
        let mut evicted = 0;
        while self.steps.len() > limit {
            self.steps.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            self.cursor = self.cursor.map(|c| c.saturating_sub(evicted));
        }
        evicted
    }

    /// Move the cursor back one step and return the snapshot now on screen.
    /// `None` when already at the oldest retained step.
    pub fn undo(&mut self) -> Option<Arc<Vec<ImageObject>>> {
        let cursor = self.cursor.filter(|c| *c > 0)?;
        self.cursor = Some(cursor - 1);
        self.current().map(|step| Arc::clone(&step.images))
    }

    /// Move the cursor forward one step and return the snapshot now on screen.
    /// `None` when already at the newest step.
    pub fn redo(&mut self) -> Option<Arc<Vec<ImageObject>>> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.steps.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        self.current().map(|step| Arc::clone(&step.images))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.steps.len())
    }

    /// The step representing the state on screen.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryStep> {
        self.cursor.and_then(|c| self.steps.get(c))
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Steps from oldest to newest.
    pub fn steps(&self) -> impl Iterator<Item = &HistoryStep> {
        self.steps.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Bring a loaded history back within bounds: trim to `limit` and point
    /// the cursor at an existing step. Returns `true` if anything changed.
    pub(crate) fn repair(&mut self, limit: usize) -> bool {
        let before = (self.steps.len(), self.cursor);
        self.evict_over(limit);
        self.cursor = match (self.steps.len(), self.cursor) {
            (0, _) => None,
            (len, None) => Some(len - 1),
            (len, Some(c)) => Some(c.min(len - 1)),
        };
        before != (self.steps.len(), self.cursor)
    }
}
