//! Area - a character candidate inside the target image

use glyphmatch_core::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Rectangle holding a single character once segmentation completes
///
/// During column growth an area may hold only a fragment (radical) of a
/// character; fragments that overlap along the reading axis are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Location in the target image
    pub rect: Rect,
    /// Number of ink pixels
    pub pixels: u32,
    /// Darkest channel value among the ink pixels
    pub min_rgb: u8,
}

impl Area {
    pub fn new(rect: Rect, pixels: u32, min_rgb: u8) -> Self {
        Self { rect, pixels, min_rgb }
    }

    /// Surface area of the bounding rectangle
    pub fn size(&self) -> i64 {
        self.rect.area()
    }

    /// Minor/major ratio of the bounding rectangle
    pub fn ratio(&self) -> f32 {
        self.rect.ratio()
    }

    pub fn midpoint(&self) -> Point {
        self.rect.midpoint()
    }

    pub fn max_dim(&self) -> i32 {
        self.rect.max_dim()
    }

    pub fn min_dim(&self) -> i32 {
        self.rect.min_dim()
    }

    /// Width for vertical text, height for horizontal
    pub fn minor_dim(&self, vertical: bool) -> i32 {
        if vertical { self.rect.w } else { self.rect.h }
    }

    /// Height for vertical text, width for horizontal
    pub fn major_dim(&self, vertical: bool) -> i32 {
        if vertical { self.rect.h } else { self.rect.w }
    }

    /// Major/minor extent ratio along the given reading direction
    pub fn major_minor_ratio(&self, vertical: bool) -> f32 {
        self.major_dim(vertical) as f32 / self.minor_dim(vertical).max(1) as f32
    }

    /// Ink pixels per rectangle pixel
    pub fn pixel_density(&self) -> f32 {
        self.pixels as f32 / self.size().max(1) as f32
    }

    /// Union of two areas
    pub fn merge(&self, other: &Area) -> Area {
        Area {
            rect: self.rect.union(&other.rect),
            pixels: self.pixels + other.pixels,
            min_rgb: self.min_rgb.min(other.min_rgb),
        }
    }
}
