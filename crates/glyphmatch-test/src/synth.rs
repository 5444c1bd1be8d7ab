//! Synthetic page images for segmentation tests
//!
//! Draws black "glyph" blobs on a white page. Blobs are plain rectangles or
//! a few strokes, enough to exercise blob extraction and column grouping
//! without a font.

use glyphmatch_core::Rect;
use image::{Rgba, RgbaImage};

/// White page with black or coloured blobs
pub struct SyntheticPage {
    image: RgbaImage,
}

impl SyntheticPage {
    /// Blank white page
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
        }
    }

    /// Page filled with a background color
    pub fn filled(width: u32, height: u32, r: u8, g: u8, b: u8) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    /// Fill a rectangle with black
    pub fn fill(&mut self, rect: Rect) -> &mut Self {
        self.fill_color(rect, 0, 0, 0)
    }

    /// Fill a rectangle with a color, clipped to the page
    pub fn fill_color(&mut self, rect: Rect, r: u8, g: u8, b: u8) -> &mut Self {
        let clip = rect.clip(self.image.width(), self.image.height());
        if clip.is_empty() {
            return self;
        }
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                self.image.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
            }
        }
        self
    }

    /// Draw a boxy glyph: an outline of `stroke` px plus a middle bar.
    ///
    /// Fill ratio stays well above the sparse-blob filters.
    pub fn glyph(&mut self, rect: Rect, stroke: i32) -> &mut Self {
        let s = stroke.max(1);
        self.fill(Rect::new(rect.x, rect.y, rect.w, s));
        self.fill(Rect::new(rect.x, rect.bottom() - s, rect.w, s));
        self.fill(Rect::new(rect.x, rect.y, s, rect.h));
        self.fill(Rect::new(rect.right() - s, rect.y, s, rect.h));
        self.fill(Rect::new(rect.x, rect.y + rect.h / 2 - s / 2, rect.w, s));
        self
    }

    /// Borrow the image
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the image
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_draws_outline() {
        let mut page = SyntheticPage::new(40, 40);
        page.glyph(Rect::new(10, 10, 12, 12), 2);
        let img = page.image();
        assert_eq!(img.get_pixel(10, 10).0[0], 0);
        assert_eq!(img.get_pixel(15, 13).0[0], 255);
        assert_eq!(img.get_pixel(15, 16).0[0], 0);
    }

    #[test]
    fn test_fill_clips() {
        let mut page = SyntheticPage::new(4, 4);
        page.fill(Rect::new(-2, -2, 4, 4));
        assert_eq!(page.image().get_pixel(1, 1).0[0], 0);
        assert_eq!(page.image().get_pixel(2, 2).0[0], 255);
    }
}
