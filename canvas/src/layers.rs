//! Layer (z-order) queries and the reorder algorithm.
//!
//! Settled documents always carry dense z-indices `0..N-1`. A reorder works
//! in two phases on temporary `f64` keys: shift the images between the old
//! and new slot by one, then sort and renumber. The second phase collapses
//! the half-step targets produced by [`forward_target`] and
//! [`backward_target`], so fractional values never reach an `ImageObject`.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use std::cmp::Ordering;

use crate::doc::{ImageObject, ObjectId};

// =============================================================
// Queries
// =============================================================

/// Highest z-index, if there are any images.
#[must_use]
pub fn max_z(images: &[ImageObject]) -> Option<i64> {
    images.iter().map(|img| img.z_index).max()
}

/// Lowest z-index, if there are any images.
#[must_use]
pub fn min_z(images: &[ImageObject]) -> Option<i64> {
    images.iter().map(|img| img.z_index).min()
}

#[allow(clippy::cast_precision_loss)]
fn as_key(z: i64) -> f64 {
    z as f64
}

fn z_of(images: &[ImageObject], id: &ObjectId) -> Option<i64> {
    images.iter().find(|img| img.id == *id).map(|img| img.z_index)
}

/// Z-index of the image directly above `id`.
#[must_use]
pub fn next_higher(images: &[ImageObject], id: &ObjectId) -> Option<i64> {
    let z = z_of(images, id)?;
    images.iter().map(|img| img.z_index).filter(|other| *other > z).min()
}

/// Z-index of the image directly below `id`.
#[must_use]
pub fn next_lower(images: &[ImageObject], id: &ObjectId) -> Option<i64> {
    let z = z_of(images, id)?;
    images.iter().map(|img| img.z_index).filter(|other| *other < z).max()
}

/// Target slot for "bring forward one layer": just above the next higher image.
#[must_use]
pub fn forward_target(images: &[ImageObject], id: &ObjectId) -> Option<f64> {
    next_higher(images, id).map(|z| as_key(z) + 0.5)
}

/// Target slot for "send backward one layer": just below the next lower image.
#[must_use]
pub fn backward_target(images: &[ImageObject], id: &ObjectId) -> Option<f64> {
    next_lower(images, id).map(|z| as_key(z) - 0.5)
}

/// Target slot for "bring to front". `None` when already on top.
#[must_use]
pub fn front_target(images: &[ImageObject], id: &ObjectId) -> Option<f64> {
    let z = z_of(images, id)?;
    max_z(images).filter(|top| *top > z).map(as_key)
}

/// Target slot for "send to back". `None` when already at the bottom.
#[must_use]
pub fn back_target(images: &[ImageObject], id: &ObjectId) -> Option<f64> {
    let z = z_of(images, id)?;
    min_z(images).filter(|bottom| *bottom < z).map(as_key)
}

// =============================================================
// Reorder
// =============================================================

/// Move image `id` to stacking slot `new_z` and renumber everything densely.
///
/// `new_z` may be fractional or outside `0..N-1`; it only decides where the
/// image lands relative to the others. Returns `false` (and changes nothing)
/// when the id is unknown or `new_z` is not finite.
pub fn reorder(images: &mut [ImageObject], id: &ObjectId, new_z: f64) -> bool {
    let Some(target) = images.iter().position(|img| img.id == *id) else {
        return false;
    };
    if !new_z.is_finite() {
        return false;
    }

    let old_z = as_key(images[target].z_index);
    let moving_up = old_z < new_z;

    // Phase 1: shift the images between the old and the new slot.
    let keys: Vec<f64> = images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            let z = as_key(img.z_index);
            if i == target {
                new_z
            } else if moving_up && z > old_z && z <= new_z {
                z - 1.0
            } else if !moving_up && z >= new_z && z < old_z {
                z + 1.0
            } else {
                z
            }
        })
        .collect();

    // Phase 2: sort on the keys and renumber.
    let mut order: Vec<usize> = (0..images.len()).collect();
    order.sort_by(|&a, &b| {
        keys[a].total_cmp(&keys[b]).then_with(|| {
            if a == target {
                if moving_up { Ordering::Greater } else { Ordering::Less }
            } else if b == target {
                if moving_up { Ordering::Less } else { Ordering::Greater }
            } else {
                images[a].z_index.cmp(&images[b].z_index).then(a.cmp(&b))
            }
        })
    });
    assign_dense(images, &order);
    true
}

/// Renumber z-indices to `0..N-1`, keeping the current relative order.
/// Ties keep insertion order.
pub fn normalize_z_order(images: &mut [ImageObject]) {
    let mut order: Vec<usize> = (0..images.len()).collect();
    order.sort_by_key(|&i| images[i].z_index);
    assign_dense(images, &order);
}

fn assign_dense(images: &mut [ImageObject], order: &[usize]) {
    for (z, &i) in (0_i64..).zip(order) {
        images[i].z_index = z;
    }
}
