//! Corpus - loaded reference glyphs of every font

use std::collections::HashMap;

use crate::error::{CorpusError, CorpusResult};
use crate::glyph::ReferenceGlyph;
use crate::key::storage_key;
use crate::params::CorpusParams;

/// One font's glyphs
#[derive(Debug, Clone)]
struct FontUnit {
    name: String,
    key: String,
    glyphs: Vec<ReferenceGlyph>,
    index: HashMap<char, usize>,
}

/// Immutable collection of reference glyphs, grouped by font
///
/// Fonts keep their registration order; the first one is the primary font.
/// Within a font glyphs keep character set order.
#[derive(Debug, Clone)]
pub struct Corpus {
    units: Vec<FontUnit>,
    raster_size: u32,
    halo_depth: usize,
}

impl Corpus {
    /// Assemble a corpus from per-font glyph lists
    ///
    /// `units` must list the fonts of `params` in order. Score overrides of
    /// `params` replace the stored modifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the fonts do not match `params` or a glyph has
    /// the wrong raster size or halo depth, and
    /// [`CorpusError::CacheMissing`] for a font without any glyph.
    pub fn new(params: &CorpusParams, units: Vec<(String, Vec<ReferenceGlyph>)>) -> CorpusResult<Self> {
        if units.len() != params.fonts.len()
            || units.iter().zip(&params.fonts).any(|((name, _), spec)| *name != spec.name)
        {
            return Err(CorpusError::InvalidParameters(
                "corpus units do not match the configured fonts".into(),
            ));
        }
        let layers = params.halo_depth - 1;
        let mut assembled = Vec::with_capacity(units.len());
        for (name, mut glyphs) in units {
            let key = storage_key(&name, params);
            if glyphs.is_empty() {
                return Err(CorpusError::CacheMissing { font: name, key });
            }
            let mut index = HashMap::with_capacity(glyphs.len());
            for (i, glyph) in glyphs.iter_mut().enumerate() {
                if glyph.size() != params.raster_size || glyph.halo.len() != layers {
                    return Err(CorpusError::CacheCorrupt {
                        key,
                        message: format!(
                            "glyph '{}' has size {} and {} halo layers, expected {} and {}",
                            glyph.character,
                            glyph.size(),
                            glyph.halo.len(),
                            params.raster_size,
                            layers
                        ),
                    });
                }
                if let Some(m) = params.score_overrides.get(&glyph.character) {
                    glyph.score_modifier = *m;
                }
                index.entry(glyph.character).or_insert(i);
            }
            assembled.push(FontUnit {
                name,
                key,
                glyphs,
                index,
            });
        }
        Ok(Self {
            units: assembled,
            raster_size: params.raster_size,
            halo_depth: params.halo_depth,
        })
    }

    /// Font names in registration order
    pub fn fonts(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|u| u.name.as_str())
    }

    /// Number of fonts
    pub fn font_count(&self) -> usize {
        self.units.len()
    }

    /// Name of the primary font
    pub fn primary_font(&self) -> Option<&str> {
        self.units.first().map(|u| u.name.as_str())
    }

    /// Registration index of a font
    pub fn font_index(&self, font: &str) -> Option<usize> {
        self.units.iter().position(|u| u.name == font)
    }

    /// Glyphs of one font, in character set order
    pub fn glyphs(&self, font: &str) -> Option<&[ReferenceGlyph]> {
        self.units.iter().find(|u| u.name == font).map(|u| u.glyphs.as_slice())
    }

    /// One font's glyph for `character`
    pub fn glyph(&self, font: &str, character: char) -> Option<&ReferenceGlyph> {
        let unit = self.units.iter().find(|u| u.name == font)?;
        unit.index.get(&character).map(|&i| &unit.glyphs[i])
    }

    /// Storage key a font's unit was loaded from
    pub fn key(&self, font: &str) -> Option<&str> {
        self.units.iter().find(|u| u.name == font).map(|u| u.key.as_str())
    }

    /// Total number of glyphs over all fonts
    pub fn glyph_count(&self) -> usize {
        self.units.iter().map(|u| u.glyphs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.glyph_count() == 0
    }

    /// Raster size shared by every glyph
    pub fn raster_size(&self) -> u32 {
        self.raster_size
    }

    /// Halo depth the glyphs were built with
    pub fn halo_depth(&self) -> usize {
        self.halo_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FontSpec;
    use glyphmatch_core::{BitRaster, HaloSet};

    fn glyph(c: char, font: &str, layers: usize) -> ReferenceGlyph {
        let raster = BitRaster::from_fn(32, |x, y| x == y).unwrap();
        let halo = HaloSet::from_layers(vec![BitRaster::new(32).unwrap(); layers]).unwrap();
        ReferenceGlyph {
            character: c,
            font: font.into(),
            pixels: raster.count_ones(),
            raster,
            halo,
            score_modifier: 1.0,
        }
    }

    fn params() -> CorpusParams {
        CorpusParams::default()
            .with_fonts(vec![FontSpec::new("A", "a.ttf"), FontSpec::new("B", "b.ttf")])
            .with_characters("あい")
            .with_score_override('い', 1.02)
    }

    #[test]
    fn test_assemble() {
        let units = vec![
            ("A".to_string(), vec![glyph('あ', "A", 2), glyph('い', "A", 2)]),
            ("B".to_string(), vec![glyph('あ', "B", 2)]),
        ];
        let corpus = Corpus::new(&params(), units).unwrap();
        assert_eq!(corpus.fonts().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(corpus.primary_font(), Some("A"));
        assert_eq!(corpus.font_index("B"), Some(1));
        assert_eq!(corpus.glyph_count(), 3);
        assert_eq!(corpus.glyph("A", 'い').unwrap().score_modifier, 1.02);
        assert_eq!(corpus.glyph("A", 'あ').unwrap().score_modifier, 1.0);
        assert!(corpus.glyph("B", 'い').is_none());
        assert_eq!(corpus.key("A"), Some(storage_key("A", &params()).as_str()));
    }

    #[test]
    fn test_rejects_mismatch() {
        let wrong_font = vec![("A".to_string(), vec![]), ("C".to_string(), vec![])];
        assert!(Corpus::new(&params(), wrong_font).is_err());

        let wrong_halo = vec![
            ("A".to_string(), vec![glyph('あ', "A", 1)]),
            ("B".to_string(), vec![glyph('あ', "B", 2)]),
        ];
        assert!(matches!(
            Corpus::new(&params(), wrong_halo),
            Err(CorpusError::CacheCorrupt { .. })
        ));
    }

    #[test]
    fn test_empty_font_is_missing() {
        let units = vec![
            ("A".to_string(), vec![glyph('あ', "A", 2)]),
            ("B".to_string(), vec![]),
        ];
        match Corpus::new(&params(), units) {
            Err(CorpusError::CacheMissing { font, key }) => {
                assert_eq!(font, "B");
                assert_eq!(key, storage_key("B", &params()));
            }
            other => panic!("unexpected {:?}", other.map(|c| c.glyph_count())),
        }
    }
}
