//! glyphmatch-area - Area segmentation for screenshots
//!
//! Turns a raw pixel source into ordered [`Column`]s of character-candidate
//! [`Area`]s:
//!
//! 1. Binarization with automatic or fixed foreground color, including
//!    block-wise inversion of white-on-black regions
//! 2. 8-connected blob extraction with size, sparsity and dither filters
//! 3. Column growth by probe merging, per orientation
//! 4. Furigana detection and reading-order connections between columns
//! 5. Local orientation choice where vertical and horizontal columns compete
//!
//! [`AreaDetector::detect`] runs the whole pipeline and returns a
//! [`Segmentation`], which hands out cropped [`SubImage`]s for recognition.

mod area;
mod areas;
mod binarize;
mod column;
mod columns;
mod connections;
mod detector;
mod error;
mod furigana;
mod options;
mod orientation;

pub use area::Area;
pub use column::Column;
pub use detector::{AreaDetector, Segmentation, SubImage};
pub use error::{AreaError, AreaResult};
pub use options::{AreaOptions, CharacterColor, Orientation};
