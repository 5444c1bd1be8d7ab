//! Binary encoding of corpus units

use crate::error::{CorpusError, CorpusResult};
use crate::glyph::ReferenceGlyph;

/// Encode one font's glyphs
pub fn encode_glyphs(glyphs: &[ReferenceGlyph]) -> CorpusResult<Vec<u8>> {
    Ok(bincode::serialize(glyphs)?)
}

/// Decode a unit read from storage under `key`
///
/// # Errors
///
/// Returns [`CorpusError::CacheCorrupt`] if the bytes do not decode, a
/// raster or halo layer is malformed, sizes differ or a pixel count is
/// wrong.
pub fn decode_glyphs(key: &str, bytes: &[u8]) -> CorpusResult<Vec<ReferenceGlyph>> {
    let corrupt = |message: String| CorpusError::CacheCorrupt {
        key: key.to_string(),
        message,
    };
    let glyphs: Vec<ReferenceGlyph> = bincode::deserialize(bytes).map_err(|e| corrupt(e.to_string()))?;
    if let Some(first) = glyphs.first() {
        let size = first.size();
        for g in &glyphs {
            if g.size() != size || g.halo.iter().any(|l| l.size() != size) {
                return Err(corrupt(format!("glyph '{}' does not match raster size {size}", g.character)));
            }
            let ink = g.raster.count_ones();
            if g.pixels != ink {
                return Err(corrupt(format!(
                    "glyph '{}' records {} pixels but has {ink}",
                    g.character, g.pixels
                )));
            }
        }
    }
    Ok(glyphs)
}
