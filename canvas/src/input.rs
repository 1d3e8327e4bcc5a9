//! Input model: modifier keys and the gesture state machine.
//!
//! `Modifiers` captures the keys held at the time of a pointer event.
//! `Gesture` is the interaction being tracked between pointer-down and
//! pointer-up, carrying the starting geometry needed to compute each tick
//! from scratch (never incrementally, so dropped ticks cannot accumulate
//! error) and the last pointer seen, so a cancelled gesture can still commit
//! what was last rendered.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ObjectId;
use crate::geometry::{Point, Rect, ResizeHandle};

/// Keyboard modifier keys held during an event. Only shift changes a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
}

impl Modifiers {
    /// Holding shift frees the aspect ratio of a locked image for this resize.
    #[must_use]
    pub fn overrides_aspect_lock(self) -> bool {
        self.shift
    }
}

/// The gesture in progress, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging an image across the board.
    Moving {
        /// Image being moved.
        id: ObjectId,
        /// Board position of the pointer at pointer-down.
        start_pointer: Point,
        /// Image bounds at pointer-down.
        start: Rect,
        /// Latest pointer position and modifiers.
        last_pointer: Point,
        last_modifiers: Modifiers,
    },
    /// Dragging one of an image's corner handles.
    Resizing {
        /// Image being resized.
        id: ObjectId,
        /// Handle being dragged.
        handle: ResizeHandle,
        /// Board position of the pointer at pointer-down.
        start_pointer: Point,
        /// Image bounds at pointer-down.
        start: Rect,
        /// Natural aspect ratio of the image.
        aspect_ratio: f64,
        /// Whether the image's aspect lock was on at pointer-down.
        locked: bool,
        /// Latest pointer position and modifiers.
        last_pointer: Point,
        last_modifiers: Modifiers,
    },
    /// Dragging out a crop selection over the crop target.
    SelectingCrop {
        /// Crop target.
        id: ObjectId,
        /// Pointer-down position in the image's own space.
        origin: Point,
        /// Image top-left in board space, to convert later pointers.
        image_origin: Point,
        /// Latest pointer position.
        last_pointer: Point,
    },
}

impl Gesture {
    /// The image this gesture acts on.
    #[must_use]
    pub fn target(&self) -> Option<ObjectId> {
        match self {
            Self::Idle => None,
            Self::Moving { id, .. } | Self::Resizing { id, .. } | Self::SelectingCrop { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Record the latest pointer position.
    pub fn track(&mut self, pointer: Point, modifiers: Modifiers) {
        match self {
            Self::Idle => {}
            Self::Moving { last_pointer, last_modifiers, .. } | Self::Resizing { last_pointer, last_modifiers, .. } => {
                *last_pointer = pointer;
                *last_modifiers = modifiers;
            }
            Self::SelectingCrop { last_pointer, .. } => *last_pointer = pointer,
        }
    }

    /// Latest pointer position and modifiers, if a gesture is active.
    #[must_use]
    pub fn last_input(&self) -> Option<(Point, Modifiers)> {
        match *self {
            Self::Idle => None,
            Self::Moving { last_pointer, last_modifiers, .. } | Self::Resizing { last_pointer, last_modifiers, .. } => {
                Some((last_pointer, last_modifiers))
            }
            Self::SelectingCrop { last_pointer, .. } => Some((last_pointer, Modifiers::default())),
        }
    }
}
