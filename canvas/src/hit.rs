#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{Document, ObjectId};
use crate::geometry::{Point, ResizeHandle};

/// Which part of an image was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub image_id: ObjectId,
    pub part: HitPart,
}

/// Test which image (if any) is under `pt`.
///
/// The selected image's corner handles win over everything, since they may
/// hang over a neighbour. Otherwise the topmost visible image whose bounds
/// contain the point is hit. Hidden images are never hit.
#[must_use]
pub fn hit_test(pt: Point, doc: &Document, handle_radius: f64) -> Option<Hit> {
    if let Some(selected) = doc.selected_image().filter(|img| img.visible) {
        let rect = selected.rect();
        for handle in ResizeHandle::ALL {
            let corner = rect.corner(handle);
            if (pt.x - corner.x).abs() <= handle_radius && (pt.y - corner.y).abs() <= handle_radius {
                return Some(Hit { image_id: selected.id, part: HitPart::Handle(handle) });
            }
        }
    }

    doc.visible_sorted_images()
        .into_iter()
        .rev()
        .find(|img| img.rect().contains(pt))
        .map(|img| Hit { image_id: img.id, part: HitPart::Body })
}
