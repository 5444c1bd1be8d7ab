//! Component splitting for glyph rasters
//!
//! Breaks a single glyph raster into its separately connected strokes.
//! This is a diagnostic capability and is not used when scoring.

use glyphmatch_core::{BinaryImage, BitRaster, Rect};

use crate::conncomp::{ConnectivityType, find_connected_components};
use crate::error::RegionResult;

/// One connected part of a glyph raster
#[derive(Debug, Clone)]
pub struct RasterComponent {
    /// Raster of the same size holding only this component
    pub raster: BitRaster,
    /// Bounding box within the raster
    pub bounds: Rect,
    /// Number of set pixels
    pub pixel_count: u32,
}

/// Split a raster into its 8-connected components, in raster order
pub fn split_components(raster: &BitRaster) -> RegionResult<Vec<RasterComponent>> {
    let size = raster.size();
    let image = BinaryImage::from_fn(size, size, |x, y| raster.get(x as i32, y as i32))?;
    let components = find_connected_components(&image, ConnectivityType::EightWay)?;

    components
        .into_iter()
        .map(|c| -> RegionResult<RasterComponent> {
            let mut part = BitRaster::new(size)?;
            for p in &c.pixels {
                part.set(p.x as u32, p.y as u32);
            }
            Ok(RasterComponent {
                raster: part,
                bounds: c.bounds,
                pixel_count: c.pixel_count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_blank() {
        let r = BitRaster::new(8).unwrap();
        assert!(split_components(&r).unwrap().is_empty());
    }

    #[test]
    fn test_split_preserves_pixels() {
        let r = BitRaster::from_fn(8, |x, y| (x == 1 && y < 4) || (x == 5 && y > 3)).unwrap();
        let parts = split_components(&r).unwrap();
        assert_eq!(parts.len(), 2);
        let total: u32 = parts.iter().map(|p| p.pixel_count).sum();
        assert_eq!(total, r.count_ones());
        assert_eq!(parts[0].bounds, Rect::new(1, 0, 1, 4));
        assert_eq!(parts[1].raster.bounds(), Rect::new(5, 4, 1, 4));
    }
}
