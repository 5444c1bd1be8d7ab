//! Binary dilation over bit-packed rasters
//!
//! Each hit offset of the structuring element contributes one shifted copy
//! of the source rows, OR-ed into the destination.

use glyphmatch_core::BitRaster;

use crate::{MorphResult, Sel};

/// Dilate a raster by a structuring element
///
/// Pixels pushed outside the raster are dropped.
pub fn dilate(raster: &BitRaster, sel: &Sel) -> MorphResult<BitRaster> {
    let size = raster.size();
    let mask = raster.mask();
    let src = raster.rows();
    let mut dst = vec![0u64; size as usize];

    for (dx, dy) in sel.hit_offsets() {
        for (y, out) in dst.iter_mut().enumerate() {
            let src_y = y as i32 - dy;
            if src_y < 0 || src_y >= size as i32 {
                continue;
            }
            shift_or_row(out, src[src_y as usize], dx, size, mask);
        }
    }

    Ok(BitRaster::from_rows(size, dst)?)
}

/// Pixels added by one dilation step: `dilate(raster, sel) & !raster`
pub fn dilate_ring(raster: &BitRaster, sel: &Sel) -> MorphResult<BitRaster> {
    let grown = dilate(raster, sel)?;
    Ok(grown.and_not(raster)?)
}

/// OR `src` shifted by `dx` pixels into `dst`; positive `dx` moves right.
#[inline]
fn shift_or_row(dst: &mut u64, src: u64, dx: i32, size: u32, mask: u64) {
    if dx.unsigned_abs() >= size {
        return;
    }
    if dx >= 0 {
        *dst |= src >> dx;
    } else {
        *dst |= (src << -dx) & mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dilate_single_pixel_square() {
        let mut r = BitRaster::new(8).unwrap();
        r.set(4, 4);
        let d = dilate(&r, &Sel::create_square(3).unwrap()).unwrap();
        assert_eq!(d.count_ones(), 9);
        assert!(d.get(3, 3) && d.get(5, 5));
    }

    #[test]
    fn test_dilate_clips_at_edges() {
        let mut r = BitRaster::new(8).unwrap();
        r.set(0, 0);
        let d = dilate(&r, &Sel::create_square(3).unwrap()).unwrap();
        assert_eq!(d.count_ones(), 4);
    }

    #[test]
    fn test_cross_ring() {
        let mut r = BitRaster::new(8).unwrap();
        r.set(4, 4);
        let ring = dilate_ring(&r, &Sel::create_cross().unwrap()).unwrap();
        assert_eq!(ring.count_ones(), 4);
        assert!(!ring.get(4, 4));
        assert!(!ring.get(3, 3));
    }

    #[test]
    fn test_dilate_asymmetric_sel_direction() {
        // hit one pixel to the right of the origin
        let sel = Sel::from_string("xx", 0, 0).unwrap();
        let mut r = BitRaster::new(8).unwrap();
        r.set(2, 0);
        let d = dilate(&r, &sel).unwrap();
        assert!(d.get(2, 0) && d.get(3, 0));
        assert_eq!(d.count_ones(), 2);
    }
}
