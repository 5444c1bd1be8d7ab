//! Corpus build parameters

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use glyphmatch_core::MAX_RASTER_SIZE;
use serde::{Deserialize, Serialize};

use crate::charset::default_characters;
use crate::error::{CorpusError, CorpusResult};

/// A reference font: display name plus font file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Name used in results and storage keys
    pub name: String,
    /// TrueType/OpenType file
    pub path: PathBuf,
}

impl FontSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Parameters that define a corpus
///
/// `fonts`, `raster_size`, `target_size`, `halo_depth` and `characters`
/// determine the stored glyph data and therefore the storage key.
/// `score_overrides` are applied at load time and do not affect the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusParams {
    /// Reference fonts; the first one is the primary font
    pub fonts: Vec<FontSpec>,
    /// Raster width and height (default: 32)
    pub raster_size: u32,
    /// Size glyphs are stretched to inside the raster (default: 30)
    pub target_size: u32,
    /// Halo depth; rasters get `halo_depth - 1` rings (default: 3)
    pub halo_depth: usize,
    /// Characters to render, in order
    pub characters: String,
    /// Grey level below which a rendered pixel is ink (default: 140)
    pub pixel_threshold: u8,
    /// Per-character score modifiers replacing the computed ones
    pub score_overrides: BTreeMap<char, f32>,
}

impl Default for CorpusParams {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            raster_size: 32,
            target_size: 30,
            halo_depth: 3,
            characters: default_characters(),
            pixel_threshold: 140,
            score_overrides: BTreeMap::new(),
        }
    }
}

impl CorpusParams {
    /// Set the reference fonts
    pub fn with_fonts(mut self, fonts: Vec<FontSpec>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the raster size
    pub fn with_raster_size(mut self, size: u32) -> Self {
        self.raster_size = size;
        self
    }

    /// Set the target glyph size
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Set the halo depth
    pub fn with_halo_depth(mut self, depth: usize) -> Self {
        self.halo_depth = depth;
        self
    }

    /// Set the character set
    pub fn with_characters(mut self, characters: impl Into<String>) -> Self {
        self.characters = characters.into();
        self
    }

    /// Override the score modifier of one character
    pub fn with_score_override(mut self, character: char, modifier: f32) -> Self {
        self.score_overrides.insert(character, modifier);
        self
    }

    /// Name of the primary font
    pub fn primary_font(&self) -> Option<&str> {
        self.fonts.first().map(|f| f.name.as_str())
    }

    /// Check the parameters
    pub fn validate(&self) -> CorpusResult<()> {
        if !(8..=MAX_RASTER_SIZE).contains(&self.raster_size) {
            return Err(CorpusError::InvalidParameters(format!(
                "raster_size {} must be in 8..={MAX_RASTER_SIZE}",
                self.raster_size
            )));
        }
        if self.target_size < 4 || self.target_size > self.raster_size {
            return Err(CorpusError::InvalidParameters(format!(
                "target_size {} must be in 4..={}",
                self.target_size, self.raster_size
            )));
        }
        if self.halo_depth < 1 {
            return Err(CorpusError::InvalidParameters(
                "halo_depth must be at least 1".into(),
            ));
        }
        if self.fonts.is_empty() {
            return Err(CorpusError::InvalidParameters(
                "at least one font is required".into(),
            ));
        }
        let mut names = HashSet::new();
        for font in &self.fonts {
            if !names.insert(font.name.as_str()) {
                return Err(CorpusError::InvalidParameters(format!(
                    "font '{}' listed twice",
                    font.name
                )));
            }
        }
        if self.characters.is_empty() {
            return Err(CorpusError::InvalidParameters(
                "character set is empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for c in self.characters.chars() {
            if !seen.insert(c) {
                return Err(CorpusError::InvalidParameters(format!(
                    "duplicate character '{c}' (U+{:04X})",
                    c as u32
                )));
            }
        }
        if let Some((c, m)) = self.score_overrides.iter().find(|(_, m)| !(**m > 0.0)) {
            return Err(CorpusError::InvalidParameters(format!(
                "score override {m} for '{c}' must be positive"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CorpusParams {
        CorpusParams::default().with_fonts(vec![FontSpec::new("Test", "test.ttf")])
    }

    #[test]
    fn test_defaults() {
        let p = params();
        assert_eq!(p.raster_size, 32);
        assert_eq!(p.target_size, 30);
        assert_eq!(p.halo_depth, 3);
        assert_eq!(p.primary_font(), Some("Test"));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_invalid() {
        assert!(CorpusParams::default().validate().is_err());
        assert!(params().with_raster_size(4).validate().is_err());
        assert!(params().with_target_size(40).validate().is_err());
        assert!(params().with_halo_depth(0).validate().is_err());
        assert!(params().with_characters("").validate().is_err());
        assert!(params().with_characters("あいあ").validate().is_err());
        assert!(params().with_score_override('あ', 0.0).validate().is_err());
        let twice = params().with_fonts(vec![FontSpec::new("A", "a"), FontSpec::new("A", "b")]);
        assert!(twice.validate().is_err());
    }
}
