//! Shared numeric constants for the canvas crate.

// ── Board ───────────────────────────────────────────────────────

/// Default board width in logical units, used when the host has no live measurement.
pub const DEFAULT_BOARD_WIDTH: f64 = 1920.0;

/// Default board height in logical units, used when the host has no live measurement.
pub const DEFAULT_BOARD_HEIGHT: f64 = 1080.0;

// ── Snapping ────────────────────────────────────────────────────

/// Fine grid used for committed positions and sizes in grid-snap mode.
pub const GRID_SIZE: f64 = 22.0;

/// Coarse grid used for live feedback while a gesture is in progress.
pub const COARSE_GRID_SIZE: f64 = 44.0;

// ── Geometry ────────────────────────────────────────────────────

/// Minimum width and height of an image after a resize.
pub const MIN_IMAGE_SIZE: f64 = 50.0;

/// Gestures whose net change stays under this distance are not recorded in history.
pub const DEAD_ZONE: f64 = 3.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of retained history steps.
pub const MAX_HISTORY_STEPS: usize = 100;

/// Two adds of the same source at the same spot within this window count as one.
pub const DUPLICATE_WINDOW_MS: i64 = 50;

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit slop in board units around each corner resize handle.
pub const HANDLE_RADIUS: f64 = 8.0;

// ── Placement ───────────────────────────────────────────────────

/// Largest share of the visible board a freshly pasted image may cover.
pub const MAX_INITIAL_FRACTION: f64 = 0.8;

/// Offset applied to each new image relative to the last added one.
pub const CASCADE_OFFSET: f64 = 20.0;

