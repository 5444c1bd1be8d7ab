//! glyphmatch-morph - Morphological operations on glyph rasters
//!
//! This crate provides:
//!
//! - Structuring elements ([`Sel`]) built from hit patterns
//! - Binary dilation of a [`BitRaster`](glyphmatch_core::BitRaster) by word shift-and-OR
//! - Halo construction: successive rings of pixels around a glyph, used to
//!   grade near-miss pixels during refined alignment

pub mod binary;
mod error;
pub mod halo;
pub mod sel;

pub use binary::{dilate, dilate_ring};
pub use error::{MorphError, MorphResult};
pub use halo::{build_halo, halo_distance};
pub use sel::Sel;
