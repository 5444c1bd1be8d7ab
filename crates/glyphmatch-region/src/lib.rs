//! glyphmatch-region - Connected component analysis
//!
//! - [`find_connected_components`]: blobs of a whole-image foreground mask
//! - [`split_components`]: the separate strokes of a single glyph raster

pub mod conncomp;
mod error;
pub mod split;

pub use conncomp::{
    ComponentLabels, ConnectedComponent, ConnectivityType, find_connected_components,
    label_connected_components,
};
pub use error::{RegionError, RegionResult};
pub use split::{RasterComponent, split_components};
