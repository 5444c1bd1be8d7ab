//! ReferenceGlyph - one rendered character of one font

use glyphmatch_core::{BitRaster, HaloSet};
use serde::{Deserialize, Serialize};

/// Normalized raster of a character rendered in a reference font
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceGlyph {
    /// Character represented by the raster
    pub character: char,
    /// Font the raster was rendered with
    pub font: String,
    /// Glyph pixels
    pub raster: BitRaster,
    /// Rings around the glyph pixels, innermost first
    pub halo: HaloSet,
    /// Number of ink pixels in `raster`
    pub pixels: u32,
    /// Multiplier applied to positive alignment scores
    pub score_modifier: f32,
}

impl ReferenceGlyph {
    /// Raster size (width and height)
    pub fn size(&self) -> u32 {
        self.raster.size()
    }
}
