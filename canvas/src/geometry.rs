//! Pure geometry: points, rectangles, boundary clamping, grid snapping, and
//! corner-handle resize math with aspect-ratio locking.
//!
//! Nothing here touches the document. The reducer and the interaction
//! controller call these functions with plain values and store whatever comes
//! back, so every invariant below can be tested in isolation.
//!
//! Board coordinates have their origin at the top-left and y grows downward.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point (or a delta) in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `pt` lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// The position of a corner.
    #[must_use]
    pub fn corner(&self, handle: ResizeHandle) -> Point {
        match handle {
            ResizeHandle::Nw => Point::new(self.x, self.y),
            ResizeHandle::Ne => Point::new(self.right(), self.y),
            ResizeHandle::Se => Point::new(self.right(), self.bottom()),
            ResizeHandle::Sw => Point::new(self.x, self.bottom()),
        }
    }

    /// Largest per-axis difference between two rectangles, position and size.
    #[must_use]
    pub fn max_difference(&self, other: &Rect) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.width - other.width).abs())
            .max((self.height - other.height).abs())
    }
}

/// One of the four corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Se,
    Sw,
}

impl ResizeHandle {
    /// All handles, in hit-test priority order.
    pub const ALL: [ResizeHandle; 4] = [Self::Nw, Self::Ne, Self::Se, Self::Sw];

    /// Growth direction per axis: `+1` when dragging toward positive
    /// coordinates grows the box, `-1` when it shrinks it.
    #[must_use]
    fn grow_signs(self) -> (f64, f64) {
        match self {
            Self::Nw => (-1.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::Se => (1.0, 1.0),
            Self::Sw => (-1.0, 1.0),
        }
    }

    /// The corner that stays fixed while this handle is dragged.
    #[must_use]
    pub fn opposite(self) -> ResizeHandle {
        match self {
            Self::Nw => Self::Se,
            Self::Ne => Self::Sw,
            Self::Se => Self::Nw,
            Self::Sw => Self::Ne,
        }
    }
}

// =============================================================
// Clamping
// =============================================================

/// Keep a rectangle inside `[0, container.width] x [0, container.height]`
/// by moving it. Size is only reduced when it cannot fit at all.
///
/// Used after every move.
#[must_use]
pub fn clamp_position(rect: Rect, container: Size) -> Rect {
    let (x, width) = clamp_axis_translate(rect.x, rect.width, container.width);
    let (y, height) = clamp_axis_translate(rect.y, rect.height, container.height);
    Rect { x, y, width, height }
}

fn clamp_axis_translate(pos: f64, len: f64, max: f64) -> (f64, f64) {
    let max = max.max(0.0);
    let len = len.max(0.0).min(max);
    let pos = pos.min(max - len).max(0.0);
    (pos, len)
}

/// Keep a rectangle inside the container by shrinking it: the part outside
/// the container is cut off, the part inside stays where it is.
///
/// Used where repositioning would move a corner the user did not touch.
#[must_use]
pub fn clamp_rect(rect: Rect, container: Size) -> Rect {
    let (x, width) = clamp_axis_shrink(rect.x, rect.width, container.width);
    let (y, height) = clamp_axis_shrink(rect.y, rect.height, container.height);
    Rect { x, y, width, height }
}

fn clamp_axis_shrink(pos: f64, len: f64, max: f64) -> (f64, f64) {
    let max = max.max(0.0);
    let start = pos.max(0.0).min(max);
    let end = (pos + len.max(0.0)).max(0.0).min(max);
    (start, (end - start).max(0.0))
}

// =============================================================
// Snapping
// =============================================================

/// Quantise `value` to the nearest multiple of `grid`.
///
/// A non-positive or non-finite grid leaves the value untouched.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    if !(grid > 0.0 && grid.is_finite()) {
        return value;
    }
    (value / grid).round() * grid
}

/// Snap all four components of a rectangle.
#[must_use]
pub fn snap_rect(rect: Rect, grid: f64) -> Rect {
    Rect {
        x: snap(rect.x, grid),
        y: snap(rect.y, grid),
        width: snap(rect.width, grid),
        height: snap(rect.height, grid),
    }
}

// =============================================================
// Resize
// =============================================================

/// Everything needed to resize a rectangle by dragging one corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeRequest {
    /// Geometry at gesture start.
    pub start: Rect,
    /// Handle being dragged.
    pub handle: ResizeHandle,
    /// Pointer movement since gesture start.
    pub delta: Point,
    /// Locked `width / height` ratio, or `None` when the resize is free.
    pub aspect_ratio: Option<f64>,
    /// Floor for both dimensions.
    pub min_size: f64,
    /// Container the result must stay inside.
    pub container: Size,
    /// Grid to snap the result to, if any.
    pub grid: Option<f64>,
}

/// Resize a rectangle by dragging one corner while the opposite corner
/// stays put.
///
/// Steps: raw size from the pointer delta, aspect correction (the box is
/// fitted inside the dragged extent, so the less-grown axis dominates),
/// minimum-size floor, container clamp (shrinking, never moving the fixed
/// corner), then optional grid snap. Positions are always derived from the
/// fixed corner, so aspect correction cannot make the box drift away from it.
///
/// A start rectangle that sticks out of the container (the board shrank
/// under it) is first moved back inside, and its fixed corner is taken from
/// there.
#[must_use]
pub fn resize_rect(req: &ResizeRequest) -> Rect {
    let (sx, sy) = req.handle.grow_signs();
    let start = clamp_position(req.start, req.container);

    let mut width = start.width + sx * req.delta.x;
    let mut height = start.height + sy * req.delta.y;

    let ratio = req.aspect_ratio.filter(|r| r.is_finite() && *r > 0.0);

    // Fit the ratio inside the dragged box: the axis that grew less wins.
    if let Some(r) = ratio {
        if width > height * r {
            width = height * r;
        } else {
            height = width / r;
        }
    }

    // Minimum size floor.
    match ratio {
        Some(r) => {
            let (min_w, min_h) = if r >= 1.0 { (req.min_size * r, req.min_size) } else { (req.min_size, req.min_size / r) };
            if width < min_w || height < min_h {
                width = min_w;
                height = min_h;
            }
        }
        None => {
            width = width.max(req.min_size);
            height = height.max(req.min_size);
        }
    }

    // The fixed corner and the room available from it toward the dragged side.
    let fixed = start.corner(req.handle.opposite());
    let room_w = (if sx > 0.0 { req.container.width - fixed.x } else { fixed.x }).max(0.0);
    let room_h = (if sy > 0.0 { req.container.height - fixed.y } else { fixed.y }).max(0.0);

    match ratio {
        Some(_) => {
            let mut scale: f64 = 1.0;
            if width > room_w {
                scale = scale.min(room_w / width);
            }
            if height > room_h {
                scale = scale.min(room_h / height);
            }
            width *= scale;
            height *= scale;
        }
        None => {
            width = width.min(room_w);
            height = height.min(room_h);
        }
    }

    let x = if sx > 0.0 { fixed.x } else { fixed.x - width };
    let y = if sy > 0.0 { fixed.y } else { fixed.y - height };
    let rect = Rect { x, y, width, height };

    match req.grid {
        Some(grid) => snap_rect(rect, grid),
        None => rect,
    }
}
