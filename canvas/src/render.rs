//! Outbound snapshots for the renderer and the exporter.
//!
//! The core never paints. It hands out the visible images in paint order
//! (z-index ascending) with everything a compositor needs: source handle,
//! board bounds, opacity, rotation. `export_plan` additionally computes the
//! region the visible images cover and the output size at a given scale, with
//! every item translated into that region.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::doc::{Document, ImageObject, ImageSource, ObjectId};
use crate::geometry::{Rect, Size};

/// One image to paint, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub id: ObjectId,
    pub src: ImageSource,
    pub rect: Rect,
    pub z_index: i64,
    /// `1.0` when the image carries no opacity.
    pub opacity: f64,
    /// `0.0` when the image carries no rotation.
    pub rotation: f64,
}

impl RenderItem {
    fn from_image(img: &ImageObject) -> Self {
        Self {
            id: img.id,
            src: img.src.clone(),
            rect: img.rect(),
            z_index: img.z_index,
            opacity: img.opacity.unwrap_or(1.0),
            rotation: img.rotation.unwrap_or(0.0),
        }
    }
}

/// Visible images, bottom first.
#[must_use]
pub fn render_list(doc: &Document) -> Vec<RenderItem> {
    doc.visible_sorted_images().into_iter().map(RenderItem::from_image).collect()
}

/// What an exporter needs to composite the board into one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    /// Board region covered by the visible images.
    pub bounds: Rect,
    pub scale: f64,
    /// Output pixel size, `bounds` times `scale` rounded up.
    pub output: Size,
    /// Items in paint order, positioned relative to `bounds` and scaled.
    pub items: Vec<RenderItem>,
}

/// Plan an export of the visible images at `scale`. `None` when nothing is
/// visible or the scale is not a positive finite number.
#[must_use]
pub fn export_plan(doc: &Document, scale: f64) -> Option<ExportPlan> {
    if !(scale > 0.0 && scale.is_finite()) {
        return None;
    }
    let items = render_list(doc);
    let bounds = items.iter().map(|item| item.rect).reduce(|acc, r| acc.union(&r))?;

    let items = items
        .into_iter()
        .map(|item| RenderItem {
            rect: Rect::new(
                (item.rect.x - bounds.x) * scale,
                (item.rect.y - bounds.y) * scale,
                item.rect.width * scale,
                item.rect.height * scale,
            ),
            ..item
        })
        .collect();

    Some(ExportPlan {
        bounds,
        scale,
        output: Size::new((bounds.width * scale).ceil(), (bounds.height * scale).ceil()),
        items,
    })
}
