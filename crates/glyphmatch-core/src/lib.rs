//! glyphmatch-core - Basic data structures for glyph recognition
//!
//! This crate provides the fundamental data structures used throughout
//! the glyphmatch workspace:
//!
//! - [`Rect`] / [`Point`] - Integer geometry with an explicit empty rectangle
//! - [`BitRaster`] / [`HaloSet`] - Fixed-size bit-packed glyph rasters
//! - [`BinaryImage`] - Foreground/background mask of a whole image
//! - [`PixelSource`] / [`Rgba`] - The caller-side raw image contract
//! - [`normalize`] - Shared glyph normalization (crop, stretch, threshold)

pub mod binary;
pub mod error;
pub mod geom;
pub mod normalize;
pub mod pixel;
pub mod raster;
pub mod util;

pub use binary::BinaryImage;
pub use error::{CoreError, CoreResult};
pub use geom::{Point, Rect};
pub use pixel::{PixelSource, Rgba};
pub use raster::{BitRaster, HaloSet, MAX_RASTER_SIZE};
