//! Target transformations
//!
//! A cropped target glyph rarely lines up exactly with the references.
//! [`TargetRasters`] fits it to the target size once, then produces
//! rasters for small stretches (resampled, cached per stretch) and
//! translations (bit shifts of the stretched raster).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glyphmatch_core::normalize::{center_in_square, crop_to_ink, fit_to_target, stretch, threshold_to_raster};
use glyphmatch_core::{BinaryImage, BitRaster, HaloSet};
use glyphmatch_morph::build_halo;
use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};

/// Translation and stretch applied to a target, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Transformation {
    pub translate_x: i32,
    pub translate_y: i32,
    pub stretch_x: i32,
    pub stretch_y: i32,
}

impl Transformation {
    /// No translation, no stretch
    pub const IDENTITY: Transformation = Transformation::new(0, 0, 0, 0);

    pub const fn new(translate_x: i32, translate_y: i32, stretch_x: i32, stretch_y: i32) -> Self {
        Self {
            translate_x,
            translate_y,
            stretch_x,
            stretch_y,
        }
    }

    /// Total number of unit steps
    pub fn steps(&self) -> u32 {
        self.translate_x.unsigned_abs()
            + self.translate_y.unsigned_abs()
            + self.stretch_x.unsigned_abs()
            + self.stretch_y.unsigned_abs()
    }

    /// Every transformation within the limits
    ///
    /// `margin` is the white border between the target size and the raster
    /// edge; translation plus half the stretch may not exceed it on either
    /// axis.
    pub fn candidates(max_translate: u32, max_stretch: u32, max_steps: u32, margin: u32) -> Vec<Self> {
        let t = max_translate as i32;
        let s = max_stretch as i32;
        let fits = |translate: i32, stretch: i32| {
            (stretch as f32 / 2.0).ceil() as i32 + translate.abs() <= margin as i32
        };
        let mut out = Vec::new();
        for tx in -t..=t {
            for ty in -t..=t {
                for sx in -s..=s {
                    for sy in -s..=s {
                        let c = Self::new(tx, ty, sx, sy);
                        if c.steps() <= max_steps && fits(tx, sx) && fits(ty, sy) {
                            out.push(c);
                        }
                    }
                }
            }
        }
        out
    }
}

/// Target glyph raster under one transformation
#[derive(Debug, Clone)]
pub struct TargetGlyph {
    pub raster: BitRaster,
    /// Rings around the raster's ink, innermost first
    pub halo: HaloSet,
    /// Ink pixels in `raster`
    pub pixels: u32,
    pub transformation: Transformation,
}

impl TargetGlyph {
    /// Untransformed target from a ready raster
    pub fn from_raster(raster: BitRaster, halo_depth: usize) -> AlignResult<Self> {
        let halo = build_halo(&raster, halo_depth.saturating_sub(1))?;
        Ok(Self {
            pixels: raster.count_ones(),
            raster,
            halo,
            transformation: Transformation::IDENTITY,
        })
    }
}

/// Produces transformed rasters of one target image
#[derive(Debug)]
pub struct TargetRasters {
    fitted: GrayImage,
    raster_size: u32,
    target_size: u32,
    halo_layers: usize,
    pixel_threshold: u8,
    stretched: HashMap<(i32, i32), BitRaster>,
}

impl TargetRasters {
    /// Prepare a grayscale target (dark ink on light background)
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::BlankTarget`] if the image has no ink and
    /// [`AlignError::InvalidParameters`] for inconsistent sizes.
    pub fn new(
        image: &GrayImage,
        raster_size: u32,
        target_size: u32,
        halo_depth: usize,
        pixel_threshold: u8,
    ) -> AlignResult<Self> {
        if target_size == 0 || target_size > raster_size || halo_depth == 0 {
            return Err(AlignError::InvalidParameters(format!(
                "target size {target_size}, raster size {raster_size}, halo depth {halo_depth}"
            )));
        }
        let cropped = crop_to_ink(image, pixel_threshold).ok_or(AlignError::BlankTarget)?;
        Ok(Self {
            fitted: fit_to_target(&cropped, target_size, target_size),
            raster_size,
            target_size,
            halo_layers: halo_depth - 1,
            pixel_threshold,
            stretched: HashMap::new(),
        })
    }

    /// Prepare a binary target
    pub fn from_binary(
        image: &BinaryImage,
        raster_size: u32,
        target_size: u32,
        halo_depth: usize,
        pixel_threshold: u8,
    ) -> AlignResult<Self> {
        Self::new(&image.to_gray(), raster_size, target_size, halo_depth, pixel_threshold)
    }

    /// Margin between the target size and the raster edge
    pub fn margin(&self) -> u32 {
        (self.raster_size - self.target_size) / 2
    }

    /// Raster under one transformation
    pub fn target(&mut self, transformation: Transformation) -> AlignResult<TargetGlyph> {
        let key = (transformation.stretch_x, transformation.stretch_y);
        let base = match self.stretched.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let width = (self.target_size as i32 + key.0).max(1) as u32;
                let height = (self.target_size as i32 + key.1).max(1) as u32;
                let square = center_in_square(&stretch(&self.fitted, width, height), self.raster_size);
                e.insert(threshold_to_raster(&square, self.pixel_threshold)?)
            }
        };
        let raster = base.shifted(transformation.translate_x, transformation.translate_y);
        let halo = build_halo(&raster, self.halo_layers)?;
        Ok(TargetGlyph {
            pixels: raster.count_ones(),
            raster,
            halo,
            transformation,
        })
    }

    /// Rasters for each transformation, in order
    pub fn targets(&mut self, transformations: &[Transformation]) -> AlignResult<Vec<TargetGlyph>> {
        transformations.iter().map(|t| self.target(*t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphmatch_core::Rect;
    use image::Luma;

    fn square_target() -> GrayImage {
        GrayImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_candidates_stage_one() {
        let c = Transformation::candidates(1, 1, 1, 1);
        assert_eq!(c.len(), 9);
        assert!(c.contains(&Transformation::IDENTITY));
        assert!(c.iter().all(|t| t.steps() <= 1));
    }

    #[test]
    fn test_candidates_respect_margin() {
        let c = Transformation::candidates(2, 2, 4, 1);
        assert!(c.contains(&Transformation::IDENTITY));
        assert!(!c.contains(&Transformation::new(2, 0, 0, 0)));
        assert!(!c.contains(&Transformation::new(1, 0, 1, 0)));
        assert!(c.contains(&Transformation::new(1, 0, -1, 0)));
        assert!(c.contains(&Transformation::new(0, 0, 2, 0)));
        assert!(c.iter().all(|t| t.steps() <= 4));
    }

    #[test]
    fn test_identity_target() {
        let mut rasters = TargetRasters::new(&square_target(), 32, 30, 3, 140).unwrap();
        assert_eq!(rasters.margin(), 1);
        let t = rasters.target(Transformation::IDENTITY).unwrap();
        assert_eq!(t.raster.bounds(), Rect::new(1, 1, 30, 30));
        assert_eq!(t.pixels, 900);
        assert_eq!(t.halo.len(), 2);
    }

    #[test]
    fn test_translated_and_stretched() {
        let mut rasters = TargetRasters::new(&square_target(), 32, 30, 3, 140).unwrap();
        let moved = rasters.target(Transformation::new(1, -1, 0, 0)).unwrap();
        assert_eq!(moved.raster.bounds(), Rect::new(2, 0, 30, 30));
        let wide = rasters.target(Transformation::new(0, 0, 2, 0)).unwrap();
        assert_eq!(wide.raster.bounds(), Rect::new(0, 1, 32, 30));
        assert_eq!(rasters.stretched.len(), 2);
    }

    #[test]
    fn test_blank_target() {
        let blank = GrayImage::from_pixel(10, 10, Luma([255]));
        assert!(matches!(
            TargetRasters::new(&blank, 32, 30, 3, 140),
            Err(AlignError::BlankTarget)
        ));
    }
}
