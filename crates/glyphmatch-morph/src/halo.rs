//! Halo construction
//!
//! A halo is a sequence of rings around a raster's ink. Ring `i` holds the
//! pixels reached by the `(i + 1)`-th 8-connected dilation step but not by
//! any earlier one, so a pixel's ring index is its chessboard distance to
//! the nearest ink pixel minus one.

use glyphmatch_core::{BitRaster, HaloSet};

use crate::binary::dilate_ring;
use crate::{MorphResult, Sel};

/// Build `layers` halo rings around `raster`
///
/// `layers` may be zero, which yields an empty halo set.
pub fn build_halo(raster: &BitRaster, layers: usize) -> MorphResult<HaloSet> {
    let sel = Sel::create_square(3)?;
    let mut covered = raster.clone();
    let mut rings = Vec::with_capacity(layers);
    for _ in 0..layers {
        let ring = dilate_ring(&covered, &sel)?;
        covered = covered.or(&ring)?;
        rings.push(ring);
    }
    Ok(HaloSet::from_layers(rings)?)
}

/// Chessboard distance from `(x, y)` to the nearest ink pixel, if it lies
/// within the halo; `Some(0)` for ink itself.
pub fn halo_distance(raster: &BitRaster, halo: &HaloSet, x: i32, y: i32) -> Option<usize> {
    if raster.get(x, y) {
        return Some(0);
    }
    halo.iter().position(|layer| layer.get(x, y)).map(|i| i + 1)
}
