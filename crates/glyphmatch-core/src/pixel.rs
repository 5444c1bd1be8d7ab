//! PixelSource - Raw image access contract
//!
//! The segmenter never assumes a storage layout. Callers hand it anything
//! that reports a size and answers per-pixel RGBA queries.

use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque white
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    /// Opaque black
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    /// Create a color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Darkest channel value, 0 (black) to 255
    #[inline]
    pub fn min_channel(&self) -> u8 {
        self.r.min(self.g).min(self.b)
    }
}

/// Width/height plus a per-pixel color accessor
pub trait PixelSource {
    /// Image width in pixels
    fn width(&self) -> u32;

    /// Image height in pixels
    fn height(&self) -> u32;

    /// Color at `(x, y)`; callers only ask for in-bounds coordinates
    fn pixel(&self, x: u32, y: u32) -> Rgba;
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let p = self.get_pixel(x, y).0;
        Rgba::new(p[0], p[1], p[2], p[3])
    }
}

impl PixelSource for GrayImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let v = self.get_pixel(x, y).0[0];
        Rgba::rgb(v, v, v)
    }
}

impl PixelSource for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::width(self)
    }

    fn height(&self) -> u32 {
        GenericImageView::height(self)
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let p = self.get_pixel(x, y).0;
        Rgba::new(p[0], p[1], p[2], p[3])
    }
}
