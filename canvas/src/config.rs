//! Tunables for the document core.
//!
//! `EditorConfig` is a plain `Copy` value so it can ride along in every
//! [`crate::reducer::ReduceContext`] without borrowing. The host builds it
//! once (the `pasteboard` binary reads it from the environment) and hands it
//! to [`crate::engine::Editor`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    COARSE_GRID_SIZE, DEAD_ZONE, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DUPLICATE_WINDOW_MS, GRID_SIZE,
    HANDLE_RADIUS, MAX_HISTORY_STEPS, MIN_IMAGE_SIZE,
};
use crate::geometry::Size;

/// How much math runs for each live (not yet released) gesture tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveFeedback {
    /// Full resize math and fine snapping on every tick.
    #[default]
    Precise,
    /// Live geometry is quantised to the coarse grid (grid-snap mode) or to
    /// whole units (free mode). Release always uses precise math.
    Coarse,
}

/// Core configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Container the images are clamped to.
    pub board: Size,
    /// Grid used for committed geometry in grid-snap mode.
    pub grid_size: f64,
    /// Grid used for live feedback in grid-snap mode under [`LiveFeedback::Coarse`].
    pub coarse_grid_size: f64,
    /// Resize floor applied to both dimensions.
    pub min_size: f64,
    /// Gestures below this net change are not recorded in history.
    pub dead_zone: f64,
    /// Maximum retained history steps.
    pub history_limit: usize,
    /// Window for the duplicate-add guard.
    pub duplicate_window_ms: i64,
    /// Live-feedback quality tier.
    pub live_feedback: LiveFeedback,
    /// Hit slop around resize handles.
    pub handle_radius: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            board: Size::new(DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_HEIGHT),
            grid_size: GRID_SIZE,
            coarse_grid_size: COARSE_GRID_SIZE,
            min_size: MIN_IMAGE_SIZE,
            dead_zone: DEAD_ZONE,
            history_limit: MAX_HISTORY_STEPS,
            duplicate_window_ms: DUPLICATE_WINDOW_MS,
            live_feedback: LiveFeedback::Precise,
            handle_radius: HANDLE_RADIUS,
        }
    }
}

impl EditorConfig {
    /// Replace the board size, e.g. after the host measured its viewport.
    #[must_use]
    pub fn with_board(mut self, width: f64, height: f64) -> Self {
        self.board = Size::new(width, height);
        self
    }

    /// The history cap, never below one so the current state always has a step.
    #[must_use]
    pub fn effective_history_limit(&self) -> usize {
        self.history_limit.max(1)
    }
}
