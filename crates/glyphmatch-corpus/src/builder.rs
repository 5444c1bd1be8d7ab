//! CorpusBuilder - renders, normalizes and stores reference glyphs

use std::time::Instant;

use glyphmatch_core::BitRaster;
use glyphmatch_core::normalize::{crop_to_ink, glyph_raster};
use glyphmatch_core::util::scale;
use glyphmatch_morph::build_halo;
use image::GrayImage;

use crate::charset::{LONG_VOWEL, VERTICAL_BAR};
use crate::corpus::Corpus;
use crate::error::CorpusResult;
use crate::glyph::ReferenceGlyph;
use crate::key::storage_key;
use crate::params::CorpusParams;
use crate::render::GlyphRenderer;
use crate::store::CorpusStore;

/// Pixel sizes tried when rendering a glyph
const RENDER_SIZES: std::ops::RangeInclusive<u32> = 25..=44;

/// Ink ratio below which a glyph is considered sparse
const SPARSE_RATIO: f32 = 0.06;
/// Ink ratio above which a glyph is considered dense
const DENSE_RATIO: f32 = 0.40;
/// Modifier of the sparsest glyphs
const SPARSE_MODIFIER: f32 = 0.92;
/// Modifier of the densest glyphs
const DENSE_MODIFIER: f32 = 1.04;
/// Ink ratio at which the dense bonus is saturated
const DENSE_SATURATION: f32 = 0.60;

/// Maximum ink pixels on either side of a bottom row that is trimmed
const MAX_SPUR_PIXELS: u32 = 5;

/// Builds reference glyphs for every font and character of a [`CorpusParams`]
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    params: CorpusParams,
}

impl CorpusBuilder {
    /// Create a builder after validating `params`
    pub fn new(params: CorpusParams) -> CorpusResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CorpusParams {
        &self.params
    }

    /// Build every font, write each unit to `store` and return the corpus
    pub fn build_all(&self, renderer: &dyn GlyphRenderer, store: &dyn CorpusStore) -> CorpusResult<Corpus> {
        let mut units = Vec::with_capacity(self.params.fonts.len());
        for font in &self.params.fonts {
            let glyphs = self.build_font(renderer, &font.name)?;
            if glyphs.is_empty() {
                tracing::warn!("font {} rendered no characters, nothing stored", font.name);
            } else {
                store.write(&storage_key(&font.name, &self.params), &glyphs)?;
            }
            units.push((font.name.clone(), glyphs));
        }
        Corpus::new(&self.params, units)
    }

    /// Build all glyphs of one font, in character set order
    ///
    /// Characters the font cannot render are skipped with a warning, and a
    /// character stored under the same character as an earlier one (`｜`
    /// after `ー`) is dropped.
    pub fn build_font(&self, renderer: &dyn GlyphRenderer, font: &str) -> CorpusResult<Vec<ReferenceGlyph>> {
        let started = Instant::now();
        let mut glyphs = Vec::with_capacity(self.params.characters.chars().count());
        let mut skipped = Vec::new();
        for character in self.params.characters.chars() {
            match self.build_glyph(renderer, font, character)? {
                Some(glyph) if glyphs.iter().any(|g: &ReferenceGlyph| g.character == glyph.character) => {
                    tracing::debug!("font {font}: '{character}' duplicates '{}'", glyph.character);
                }
                Some(glyph) => glyphs.push(glyph),
                None => skipped.push(character),
            }
        }
        if !skipped.is_empty() {
            let list: String = skipped.iter().collect();
            tracing::warn!("font {font} cannot render {} characters: {list}", skipped.len());
        }
        tracing::info!(
            "built {} glyphs for {font} in {} ms",
            glyphs.len(),
            started.elapsed().as_millis()
        );
        Ok(glyphs)
    }

    /// Build one reference glyph, or `None` if the font has no ink for it
    pub fn build_glyph(
        &self,
        renderer: &dyn GlyphRenderer,
        font: &str,
        character: char,
    ) -> CorpusResult<Option<ReferenceGlyph>> {
        let p = &self.params;
        let Some(image) = self.render_best_fit(renderer, font, character)? else {
            return Ok(None);
        };
        let Some(mut raster) = glyph_raster(&image, p.raster_size, p.target_size, p.pixel_threshold)? else {
            return Ok(None);
        };
        trim_bottom_spurs(&mut raster, p.target_size);
        if raster.is_blank() {
            return Ok(None);
        }
        let halo = build_halo(&raster, p.halo_depth - 1)?;
        let pixels = raster.count_ones();
        let character = if character == VERTICAL_BAR {
            LONG_VOWEL
        } else {
            character
        };
        Ok(Some(ReferenceGlyph {
            character,
            font: font.to_string(),
            score_modifier: density_modifier(pixels, p.raster_size),
            raster,
            halo,
            pixels,
        }))
    }

    /// Render at every size in [`RENDER_SIZES`] and keep the ink-cropped
    /// image whose closer dimension best matches the target size
    fn render_best_fit(
        &self,
        renderer: &dyn GlyphRenderer,
        font: &str,
        character: char,
    ) -> CorpusResult<Option<GrayImage>> {
        let target = self.params.target_size as i64;
        let mut best: Option<(i64, GrayImage)> = None;
        for size in RENDER_SIZES {
            let Some(image) = renderer.render(font, character, size as f32)? else {
                continue;
            };
            let Some(cropped) = crop_to_ink(&image, self.params.pixel_threshold) else {
                continue;
            };
            let hfit = (cropped.width() as i64 - target).abs();
            let vfit = (cropped.height() as i64 - target).abs();
            let fit = hfit.min(vfit);
            if best.as_ref().is_none_or(|(b, _)| fit < *b) {
                best = Some((fit, cropped));
            }
        }
        Ok(best.map(|(_, image)| image))
    }
}

/// Score modifier from the glyph's ink ratio
///
/// Sparse glyphs match too easily on white pixels and are scaled down;
/// dense glyphs get a small bonus.
fn density_modifier(pixels: u32, raster_size: u32) -> f32 {
    let ratio = pixels as f32 / (raster_size * raster_size) as f32;
    if ratio < SPARSE_RATIO {
        scale(ratio, 0.0, SPARSE_RATIO, SPARSE_MODIFIER, 1.0)
    } else if ratio > DENSE_RATIO {
        scale(ratio, DENSE_RATIO, DENSE_SATURATION, 1.0, DENSE_MODIFIER)
    } else {
        1.0
    }
}

/// Clear the glyph's bottom row when it holds only short spurs at both
/// corners (the serif feet of 山 in some fonts)
fn trim_bottom_spurs(raster: &mut BitRaster, target_size: u32) {
    let size = raster.size();
    let row = size - 1 - (size - target_size) / 2;
    let left_end = size * 12 / 32;
    let right_start = size * 20 / 32;
    let (mut left, mut middle, mut right) = (0, 0, 0);
    for x in 0..size {
        if raster.get(x as i32, row as i32) {
            if x <= left_end {
                left += 1;
            } else if x >= right_start {
                right += 1;
            } else {
                middle += 1;
            }
        }
    }
    if middle == 0 && (1..=MAX_SPUR_PIXELS).contains(&left) && (1..=MAX_SPUR_PIXELS).contains(&right) {
        for x in 0..size {
            raster.clear(x, row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FontSpec;
    use glyphmatch_test::raster_from_ascii;
    use image::Luma;

    /// Renders every character as a filled square growing with the pixel size
    struct BoxRenderer;

    impl GlyphRenderer for BoxRenderer {
        fn render(&self, _font: &str, character: char, px: f32) -> CorpusResult<Option<GrayImage>> {
            if character == '×' {
                return Ok(None);
            }
            let side = px as u32;
            let canvas = side + 10;
            Ok(Some(GrayImage::from_fn(canvas, canvas, |x, y| {
                let inside = (5..5 + side).contains(&x) && (5..5 + side).contains(&y);
                let hollow = (8..2 + side).contains(&x) && (8..2 + side).contains(&y);
                if inside && !hollow { Luma([0]) } else { Luma([255]) }
            })))
        }
    }

    fn builder(chars: &str) -> CorpusBuilder {
        let params = CorpusParams::default()
            .with_fonts(vec![FontSpec::new("Box", "box.ttf")])
            .with_characters(chars);
        CorpusBuilder::new(params).unwrap()
    }

    #[test]
    fn test_build_glyph() {
        let b = builder("口");
        let g = b.build_glyph(&BoxRenderer, "Box", '口').unwrap().unwrap();
        assert_eq!(g.character, '口');
        assert_eq!(g.font, "Box");
        assert_eq!(g.size(), 32);
        assert_eq!(g.halo.len(), 2);
        assert_eq!(g.pixels, g.raster.count_ones());
        // box of 30 centred in 32
        assert_eq!(g.raster.bounds(), glyphmatch_core::Rect::new(1, 1, 30, 30));
    }

    #[test]
    fn test_vertical_bar_becomes_long_vowel() {
        let b = builder("｜");
        let g = b.build_glyph(&BoxRenderer, "Box", '｜').unwrap().unwrap();
        assert_eq!(g.character, 'ー');
    }

    #[test]
    fn test_build_font_skips_unrenderable() {
        let b = builder("口×");
        let glyphs = b.build_font(&BoxRenderer, "Box").unwrap();
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].character, '口');
    }

    #[test]
    fn test_build_font_drops_duplicate_characters() {
        let b = builder("ー｜口");
        let glyphs = b.build_font(&BoxRenderer, "Box").unwrap();
        let chars: String = glyphs.iter().map(|g| g.character).collect();
        assert_eq!(chars, "ー口");
    }

    #[test]
    fn test_build_all_empty_font_is_missing() {
        let store = crate::store::MemoryStore::new();
        let b = builder("×");
        match b.build_all(&BoxRenderer, &store) {
            Err(crate::CorpusError::CacheMissing { font, .. }) => assert_eq!(font, "Box"),
            other => panic!("unexpected {:?}", other.map(|c| c.glyph_count())),
        }
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_density_modifier() {
        assert_eq!(density_modifier(300, 32), 1.0);
        assert_eq!(density_modifier(0, 32), SPARSE_MODIFIER);
        assert!(density_modifier(40, 32) < 1.0);
        assert!(density_modifier(500, 32) > 1.0);
        assert_eq!(density_modifier(1024, 32), DENSE_MODIFIER);
    }

    #[test]
    fn test_trim_bottom_spurs() {
        // 16 x 16, target 14: bottom glyph row is 14, left end 6, right start 10
        let mut rows = vec!["................"; 16];
        rows[10] = ".xxxxxxxxxxxx...";
        rows[14] = ".xx.........xx..";
        let mut r = raster_from_ascii(&rows);
        trim_bottom_spurs(&mut r, 14);
        assert_eq!(r.count_ones(), 12);

        rows[14] = ".xx.....x...xx..";
        let mut r = raster_from_ascii(&rows);
        trim_bottom_spurs(&mut r, 14);
        assert_eq!(r.count_ones(), 17);
    }
}
