//! glyphmatch-corpus - Reference glyph corpus
//!
//! A corpus holds one [`ReferenceGlyph`] per (font, character): the glyph's
//! normalized [`BitRaster`](glyphmatch_core::BitRaster), its halo rings and a
//! score modifier. Building is offline work:
//!
//! 1. Render every character with a [`GlyphRenderer`] at the best-fitting size
//! 2. Normalize to the raster size and build the halo
//! 3. Encode the font's glyphs and store them under a [`storage_key`]
//!
//! The key is a hash of every parameter that changes the glyph data, so a
//! stale unit is never read back. [`CorpusLoader`] loads each unit once and
//! shares the resulting [`Corpus`] read-only.

mod builder;
pub mod charset;
mod codec;
mod corpus;
mod error;
mod glyph;
mod key;
mod loader;
mod params;
mod render;
mod store;

pub use builder::CorpusBuilder;
pub use codec::{decode_glyphs, encode_glyphs};
pub use corpus::Corpus;
pub use error::{CorpusError, CorpusResult};
pub use glyph::ReferenceGlyph;
pub use key::storage_key;
pub use loader::CorpusLoader;
pub use params::{CorpusParams, FontSpec};
pub use render::{AbGlyphRenderer, GlyphRenderer};
pub use store::{CorpusStore, FsStore, MemoryStore};
