//! Initial placement for pasted or dropped images.
//!
//! These helpers belong to the image-source side of the boundary: the
//! reducer stores whatever position and size it is given. They are kept here
//! so every host places images the same way: downscaled to a share of the
//! visible board, cascaded from the last added image, centred otherwise.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::consts::{CASCADE_OFFSET, MAX_INITIAL_FRACTION};
use crate::doc::{Document, ImageSource, NewImage};
use crate::geometry::{Point, Rect, Size, clamp_position};

/// Display size for an image: its natural size, scaled down uniformly when
/// it exceeds `max_fraction` of the viewport in either dimension. Never
/// scales up.
#[must_use]
pub fn fit_size(natural: Size, viewport: Size, max_fraction: f64) -> Size {
    let max_w = viewport.width * max_fraction;
    let max_h = viewport.height * max_fraction;
    if natural.width <= 0.0 || natural.height <= 0.0 || max_w <= 0.0 || max_h <= 0.0 {
        return natural;
    }
    let scale = (max_w / natural.width).min(max_h / natural.height).min(1.0);
    Size::new(natural.width * scale, natural.height * scale)
}

/// Top-left position for a new image of `size`.
///
/// Cascades from the most recently added image when the result still fits
/// inside the viewport; otherwise centres in the viewport. The result is
/// clamped to the board.
#[must_use]
pub fn initial_position(doc: &Document, size: Size, viewport: Rect, board: Size) -> Point {
    let centred = Point::new(
        viewport.x + (viewport.width - size.width) / 2.0,
        viewport.y + (viewport.height - size.height) / 2.0,
    );
    let cascaded = doc
        .images
        .last()
        .map(|last| Point::new(last.x + CASCADE_OFFSET, last.y + CASCADE_OFFSET))
        .filter(|p| p.x + size.width <= viewport.right() && p.y + size.height <= viewport.bottom());

    let pos = cascaded.unwrap_or(centred);
    let clamped = clamp_position(Rect::new(pos.x, pos.y, size.width, size.height), board);
    Point::new(clamped.x, clamped.y)
}

/// Build the `AddImage` payload for a freshly decoded image.
///
/// `viewport` is the visible part of the board; `None` falls back to the
/// whole board, for hosts that have no live measurement.
#[must_use]
pub fn place_new_image(doc: &Document, src: ImageSource, natural: Size, viewport: Option<Rect>, board: Size) -> NewImage {
    let viewport = viewport.unwrap_or(Rect::new(0.0, 0.0, board.width, board.height));
    let size = fit_size(natural, Size::new(viewport.width, viewport.height), MAX_INITIAL_FRACTION);
    let pos = initial_position(doc, size, viewport, board);
    NewImage {
        src,
        x: pos.x,
        y: pos.y,
        width: size.width,
        height: size.height,
        original_width: natural.width,
        original_height: natural.height,
        aspect_ratio_locked: None,
        visible: true,
        rotation: None,
        opacity: None,
    }
}
