//! Glyph normalization
//!
//! Reference glyphs and target crops go through the same pipeline so their
//! rasters are comparable: crop to ink, stretch to the target glyph size
//! while keeping thin glyphs thin, centre in the raster square, threshold.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::error::{CoreError, CoreResult};
use crate::geom::Rect;
use crate::raster::BitRaster;
use crate::util::scale;

/// Aspect ratio below which the minor dimension is no longer stretched fully
const FULL_STRETCH_RATIO: f32 = 0.4;
/// Aspect ratio at which the minor dimension reaches its minimum
const MIN_STRETCH_RATIO: f32 = 0.1;
/// Minimum minor dimension (pixels) after stretching
const MIN_MINOR_DIM: f32 = 8.0;

/// Bounding box of pixels darker than `threshold`, or [`Rect::EMPTY`]
pub fn ink_bounds(src: &GrayImage, threshold: u8) -> Rect {
    let mut bounds = Rect::EMPTY;
    for (x, y, p) in src.enumerate_pixels() {
        if p.0[0] < threshold {
            bounds = bounds.union(&Rect::new(x as i32, y as i32, 1, 1));
        }
    }
    bounds
}

/// Crop to the ink bounding box; `None` if the image has no ink
pub fn crop_to_ink(src: &GrayImage, threshold: u8) -> Option<GrayImage> {
    let b = ink_bounds(src, threshold);
    if b.is_empty() {
        return None;
    }
    Some(imageops::crop_imm(src, b.x as u32, b.y as u32, b.w as u32, b.h as u32).to_image())
}

/// Resize to exactly `width` x `height` (each at least 1)
pub fn stretch(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    imageops::resize(src, width.max(1), height.max(1), FilterType::Triangle)
}

/// Place `src` in the centre of a white `size` x `size` square, cutting any overflow
pub fn center_in_square(src: &GrayImage, size: u32) -> GrayImage {
    let mut square = GrayImage::from_pixel(size, size, Luma([255]));
    let dx = (size as i64 - src.width() as i64) / 2;
    let dy = (size as i64 - src.height() as i64) / 2;
    imageops::replace(&mut square, src, dx, dy);
    square
}

/// Stretch to `target_size`, limiting how far the minor dimension of a thin
/// glyph is stretched, then centre in a `final_size` square.
///
/// Glyphs with minor/major ratio ≥ 0.4 become `target_size` square. Thinner
/// glyphs get a minor dimension scaled between 8 px (ratio 0.1) and
/// `target_size`, so that strokes like 一 and ｜ do not fill the block.
pub fn fit_to_target(src: &GrayImage, target_size: u32, final_size: u32) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut ratio = w as f32 / h.max(1) as f32;
    if ratio > 1.0 {
        ratio = 1.0 / ratio;
    }
    let min_dim = scale(
        ratio,
        MIN_STRETCH_RATIO,
        FULL_STRETCH_RATIO,
        MIN_MINOR_DIM,
        target_size as f32,
    )
    .round() as u32;
    let (tw, th) = if w > h {
        (target_size, min_dim)
    } else {
        (min_dim, target_size)
    };
    center_in_square(&stretch(src, tw, th), final_size)
}

/// Threshold a square grayscale image into a raster; pixels darker than
/// `threshold` are ink.
///
/// # Errors
///
/// Returns an error if the image is not square or too large for a raster.
pub fn threshold_to_raster(src: &GrayImage, threshold: u8) -> CoreResult<BitRaster> {
    let (w, h) = src.dimensions();
    if w != h {
        return Err(CoreError::InvalidDimension {
            width: w,
            height: h,
        });
    }
    BitRaster::from_fn(w, |x, y| src.get_pixel(x, y).0[0] < threshold)
}

/// Full normalization of a glyph image into an N x N raster.
///
/// Returns `Ok(None)` when the image contains no ink.
pub fn glyph_raster(
    src: &GrayImage,
    raster_size: u32,
    target_size: u32,
    threshold: u8,
) -> CoreResult<Option<BitRaster>> {
    if target_size == 0 || target_size > raster_size {
        return Err(CoreError::InvalidParameter(format!(
            "target size {target_size} must be in 1..={raster_size}"
        )));
    }
    let Some(cropped) = crop_to_ink(src, threshold) else {
        return Ok(None);
    };
    let fitted = fit_to_target(&cropped, target_size, raster_size);
    threshold_to_raster(&fitted, threshold).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(w: u32, h: u32, ink: Rect) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if ink.contains_point(crate::Point::new(x as i32, y as i32)) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_ink_bounds() {
        let img = block(20, 20, Rect::new(4, 5, 6, 3));
        assert_eq!(ink_bounds(&img, 140), Rect::new(4, 5, 6, 3));
        assert!(crop_to_ink(&GrayImage::from_pixel(4, 4, Luma([255])), 140).is_none());
    }

    #[test]
    fn test_center_in_square() {
        let img = GrayImage::from_pixel(2, 2, Luma([0]));
        let sq = center_in_square(&img, 6);
        assert_eq!(sq.get_pixel(2, 2).0[0], 0);
        assert_eq!(sq.get_pixel(0, 0).0[0], 255);
        assert_eq!(ink_bounds(&sq, 140), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn test_square_glyph_fills_target() {
        let img = block(50, 50, Rect::new(10, 10, 20, 20));
        let raster = glyph_raster(&img, 32, 30, 140).unwrap().unwrap();
        assert_eq!(raster.bounds(), Rect::new(1, 1, 30, 30));
    }

    #[test]
    fn test_thin_glyph_stays_thin() {
        // ratio 0.05 clamps to the minimum minor dimension
        let img = block(60, 10, Rect::new(5, 4, 40, 2));
        let raster = glyph_raster(&img, 32, 30, 140).unwrap().unwrap();
        let b = raster.bounds();
        assert_eq!(b.w, 30);
        assert!(b.h <= 8, "height {} should stay thin", b.h);
    }

    #[test]
    fn test_rejects_bad_target() {
        let img = block(8, 8, Rect::new(1, 1, 2, 2));
        assert!(glyph_raster(&img, 32, 40, 140).is_err());
        assert!(threshold_to_raster(&GrayImage::new(3, 4), 140).is_err());
    }
}
