//! Glyph rendering

use std::collections::HashMap;
use std::fs;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, point};
use image::{GrayImage, Luma};

use crate::error::{CorpusError, CorpusResult};
use crate::params::FontSpec;

/// White border around a rendered glyph
const PADDING: u32 = 2;

/// Renders single characters as black-on-white grayscale images
pub trait GlyphRenderer {
    /// Render `character` from the font named `font` at `px` pixels
    ///
    /// Returns `Ok(None)` if the font has no glyph for the character or the
    /// glyph has no outline.
    fn render(&self, font: &str, character: char, px: f32) -> CorpusResult<Option<GrayImage>>;
}

/// TrueType/OpenType renderer backed by `ab_glyph`
pub struct AbGlyphRenderer {
    fonts: HashMap<String, FontVec>,
}

impl AbGlyphRenderer {
    /// Read and parse every font file
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::FontLoad`] naming the font that failed.
    pub fn load(specs: &[FontSpec]) -> CorpusResult<Self> {
        let mut fonts = HashMap::with_capacity(specs.len());
        for spec in specs {
            let load_error = |message: String| CorpusError::FontLoad {
                name: spec.name.clone(),
                path: spec.path.display().to_string(),
                message,
            };
            let data = fs::read(&spec.path).map_err(|e| load_error(e.to_string()))?;
            let font = FontVec::try_from_vec(data).map_err(|e| load_error(e.to_string()))?;
            tracing::debug!("loaded font {} from {}", spec.name, spec.path.display());
            fonts.insert(spec.name.clone(), font);
        }
        Ok(Self { fonts })
    }

    /// True if a font named `name` is loaded
    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }
}

impl GlyphRenderer for AbGlyphRenderer {
    fn render(&self, font: &str, character: char, px: f32) -> CorpusResult<Option<GrayImage>> {
        let face = self
            .fonts
            .get(font)
            .ok_or_else(|| CorpusError::InvalidParameters(format!("font '{font}' is not loaded")))?;
        let id = face.glyph_id(character);
        if id == GlyphId(0) {
            return Ok(None);
        }
        let glyph = id.with_scale_and_position(PxScale::from(px), point(0.0, 0.0));
        let Some(outlined) = face.outline_glyph(glyph) else {
            return Ok(None);
        };

        let bounds = outlined.px_bounds();
        let width = bounds.width().ceil() as u32 + 2 * PADDING;
        let height = bounds.height().ceil() as u32 + 2 * PADDING;
        let mut image = GrayImage::from_pixel(width, height, Luma([255]));
        outlined.draw(|x, y, coverage| {
            let (x, y) = (x + PADDING, y + PADDING);
            if x < width && y < height {
                let ink = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = image.get_pixel_mut(x, y);
                pixel.0[0] = pixel.0[0].min(255 - ink);
            }
        });
        Ok(Some(image))
    }
}
