//! Storage keys for corpus units

use sha2::{Digest, Sha256};

use crate::params::CorpusParams;

/// Hex digits of the digest kept in the key
const KEY_HEX_DIGITS: usize = 16;

/// Storage key of one font's unit under `params`
///
/// SHA-256 over the length-prefixed font name, raster size, target size,
/// halo depth and character set, rendered as
/// `CHARACTERS_<16 upper-case hex digits>.cache`. Any change to these
/// values produces a different key.
pub fn storage_key(font: &str, params: &CorpusParams) -> String {
    let mut hasher = Sha256::new();
    let mut field = |bytes: &[u8]| {
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };
    field(font.as_bytes());
    field(&params.raster_size.to_le_bytes());
    field(&params.target_size.to_le_bytes());
    field(&(params.halo_depth as u64).to_le_bytes());
    field(params.characters.as_bytes());

    let digest = hasher.finalize();
    let hex: String = digest
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<String>()
        .chars()
        .take(KEY_HEX_DIGITS)
        .collect();
    format!("CHARACTERS_{hex}.cache")
}
