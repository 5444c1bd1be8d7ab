//! Structuring Element (SEL) for raster dilation
//!
//! Only hit elements matter for dilation, so a `Sel` stores the hit
//! positions relative to its origin.

use crate::{MorphError, MorphResult};

/// Structuring element
///
/// The origin (cx, cy) is the reference point for the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
    hits: Vec<bool>,
}

impl Sel {
    /// Create a rectangular "brick" with all hits and a centred origin
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(format!(
                "brick dimensions must be positive: {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            hits: vec![true; (width * height) as usize],
        })
    }

    /// Create a square with all hits (3 gives 8-connected growth)
    pub fn create_square(size: u32) -> MorphResult<Self> {
        Self::create_brick(size, size)
    }

    /// Create a 3x3 cross (4-connected growth)
    pub fn create_cross() -> MorphResult<Self> {
        Self::from_string(".x.\nxxx\n.x.", 1, 1)
    }

    /// Create a structuring element from a pattern
    ///
    /// # Arguments
    /// * `pattern` - Lines of 'x' (hit) and '.' (don't care)
    /// * `origin_x` - X coordinate of origin
    /// * `origin_y` - Y coordinate of origin
    pub fn from_string(pattern: &str, origin_x: u32, origin_y: u32) -> MorphResult<Self> {
        let lines: Vec<&str> = pattern.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let height = lines.len() as u32;
        let width = lines.first().map_or(0, |l| l.chars().count()) as u32;
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel("empty pattern".into()));
        }
        let mut hits = Vec::with_capacity((width * height) as usize);
        for line in &lines {
            if line.chars().count() as u32 != width {
                return Err(MorphError::InvalidSel("ragged pattern rows".into()));
            }
            for c in line.chars() {
                match c {
                    'x' => hits.push(true),
                    '.' => hits.push(false),
                    other => {
                        return Err(MorphError::InvalidSel(format!(
                            "unexpected character '{other}'"
                        )));
                    }
                }
            }
        }
        if origin_x >= width || origin_y >= height {
            return Err(MorphError::InvalidSel(format!(
                "origin ({origin_x}, {origin_y}) outside {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cx: origin_x,
            cy: origin_y,
            hits,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offsets (dx, dy) of hit elements relative to the origin
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                if self.hits[(y * self.width + x) as usize] {
                    Some((x as i32 - self.cx as i32, y as i32 - self.cy as i32))
                } else {
                    None
                }
            })
        })
    }
}
