//! Segmentation options

use serde::{Deserialize, Serialize};

use crate::error::{AreaError, AreaResult};

/// Reading direction of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Decide per region of the image
    #[default]
    Automatic,
    /// Top-to-bottom columns, read right to left
    Vertical,
    /// Left-to-right rows, read top to bottom
    Horizontal,
}

/// Foreground/background color hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharacterColor {
    /// Dark text, with white-on-black regions detected and inverted
    #[default]
    Automatic,
    /// Dark text on a light background only
    BlackOnWhite,
    /// Light text on a dark background; the whole image is inverted
    WhiteOnBlack,
    /// Foreground is any pixel within `range` of the given color on every channel
    Fixed { red: u8, green: u8, blue: u8, range: u8 },
}

/// Options for [`AreaDetector`](crate::AreaDetector)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaOptions {
    /// Reading direction (default: automatic)
    pub orientation: Orientation,
    /// Foreground color hint (default: automatic)
    pub color: CharacterColor,
    /// A channel darker than this counts as ink (default: 140)
    pub pixel_threshold: u8,
    /// Blobs wider or taller than this are not characters (default: 120)
    pub max_area_size: u32,
    /// Blobs with fewer pixels are dropped (default: 3)
    pub min_area_pixels: u32,
    /// Characters returned for a point request (default: 4)
    pub max_characters: usize,
}

impl Default for AreaOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Automatic,
            color: CharacterColor::Automatic,
            pixel_threshold: 140,
            max_area_size: 120,
            min_area_pixels: 3,
            max_characters: 4,
        }
    }
}

impl AreaOptions {
    /// Set the reading direction
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the foreground color hint
    pub fn with_color(mut self, color: CharacterColor) -> Self {
        self.color = color;
        self
    }

    /// Set the ink threshold
    pub fn with_pixel_threshold(mut self, threshold: u8) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    /// Set the largest accepted blob dimension
    pub fn with_max_area_size(mut self, size: u32) -> Self {
        self.max_area_size = size;
        self
    }

    /// Set the characters returned for a point request
    pub fn with_max_characters(mut self, max: usize) -> Self {
        self.max_characters = max;
        self
    }

    /// Check the option values
    pub fn validate(&self) -> AreaResult<()> {
        if self.pixel_threshold == 0 {
            return Err(AreaError::InvalidParameters(
                "pixel_threshold must be positive".into(),
            ));
        }
        if self.max_area_size == 0 {
            return Err(AreaError::InvalidParameters(
                "max_area_size must be positive".into(),
            ));
        }
        if self.max_characters == 0 {
            return Err(AreaError::InvalidParameters(
                "max_characters must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let opts = AreaOptions::default();
        assert_eq!(opts.pixel_threshold, 140);
        assert_eq!(opts.max_characters, 4);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(AreaOptions::default().with_pixel_threshold(0).validate().is_err());
        assert!(AreaOptions::default().with_max_characters(0).validate().is_err());
        assert!(AreaOptions::default().with_max_area_size(0).validate().is_err());
    }
}
