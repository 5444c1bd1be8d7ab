//! BitRaster, HaloSet - Fixed-size bit-packed glyph rasters
//!
//! A `BitRaster` is an N x N grid (N in `1..=64`) with one `u64` word per
//! row. Only the low N bits of a row are used, and bit `N - 1 - x` of row
//! `y` is the pixel at column `x`. Shifting a row right therefore moves the
//! glyph right.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geom::Rect;

/// Largest supported raster size (one `u64` per row)
pub const MAX_RASTER_SIZE: u32 = 64;

/// Fixed-size square bit raster
///
/// Deserialization goes through [`BitRaster::from_rows`], so decoded rasters
/// hold the same invariants as constructed ones.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RasterRows")]
pub struct BitRaster {
    size: u32,
    rows: Vec<u64>,
}

/// Serialized form of a [`BitRaster`]
#[derive(Deserialize)]
struct RasterRows {
    size: u32,
    rows: Vec<u64>,
}

impl TryFrom<RasterRows> for BitRaster {
    type Error = CoreError;

    fn try_from(raw: RasterRows) -> CoreResult<Self> {
        Self::from_rows(raw.size, raw.rows)
    }
}

impl BitRaster {
    /// Create an all-zero raster
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is 0 or larger than [`MAX_RASTER_SIZE`].
    pub fn new(size: u32) -> CoreResult<Self> {
        check_size(size)?;
        Ok(Self {
            size,
            rows: vec![0; size as usize],
        })
    }

    /// Create a raster from packed rows
    ///
    /// # Errors
    ///
    /// Returns an error if the row count differs from `size` or if any row
    /// has bits set outside the low `size` bits.
    pub fn from_rows(size: u32, rows: Vec<u64>) -> CoreResult<Self> {
        check_size(size)?;
        if rows.len() != size as usize {
            return Err(CoreError::RasterSizeMismatch {
                expected: size,
                actual: rows.len() as u32,
            });
        }
        let mask = row_mask(size);
        if rows.iter().any(|r| r & !mask != 0) {
            return Err(CoreError::InvalidParameter(format!(
                "row bits set outside a {size}-bit raster"
            )));
        }
        Ok(Self { size, rows })
    }

    /// Create a raster by evaluating `f(x, y)` for every pixel
    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> bool) -> CoreResult<Self> {
        let mut raster = Self::new(size)?;
        for y in 0..size {
            for x in 0..size {
                if f(x, y) {
                    raster.set(x, y);
                }
            }
        }
        Ok(raster)
    }

    /// Side length
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Packed rows, top to bottom
    #[inline]
    pub fn rows(&self) -> &[u64] {
        &self.rows
    }

    /// Mask with the low `size` bits set
    #[inline]
    pub fn mask(&self) -> u64 {
        row_mask(self.size)
    }

    /// True if the pixel is set; false outside the raster
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return false;
        }
        self.rows[y as usize] >> (self.size - 1 - x as u32) & 1 == 1
    }

    /// Sets a pixel; coordinates outside the raster are ignored
    #[inline]
    pub fn set(&mut self, x: u32, y: u32) {
        if x < self.size && y < self.size {
            self.rows[y as usize] |= 1 << (self.size - 1 - x);
        }
    }

    /// Clears a pixel; coordinates outside the raster are ignored
    #[inline]
    pub fn clear(&mut self, x: u32, y: u32) {
        if x < self.size && y < self.size {
            self.rows[y as usize] &= !(1 << (self.size - 1 - x));
        }
    }

    /// Number of set pixels
    pub fn count_ones(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }

    /// True if no pixel is set
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&r| r == 0)
    }

    /// Number of pixels set in both rasters
    ///
    /// # Errors
    ///
    /// Returns an error if sizes differ.
    pub fn count_common(&self, other: &BitRaster) -> CoreResult<u32> {
        self.check_same_size(other)?;
        Ok(self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| (a & b).count_ones())
            .sum())
    }

    /// Pixel-wise OR with another raster of the same size
    pub fn or(&self, other: &BitRaster) -> CoreResult<BitRaster> {
        self.combine(other, |a, b| a | b)
    }

    /// Pixel-wise AND with another raster of the same size
    pub fn and(&self, other: &BitRaster) -> CoreResult<BitRaster> {
        self.combine(other, |a, b| a & b)
    }

    /// Pixels set here but not in `other`
    pub fn and_not(&self, other: &BitRaster) -> CoreResult<BitRaster> {
        self.combine(other, |a, b| a & !b)
    }

    fn combine(&self, other: &BitRaster, op: impl Fn(u64, u64) -> u64) -> CoreResult<BitRaster> {
        self.check_same_size(other)?;
        let mask = self.mask();
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(&a, &b)| op(a, b) & mask)
            .collect();
        Ok(BitRaster {
            size: self.size,
            rows,
        })
    }

    /// Translate the raster; positive `dx` moves right, positive `dy` down.
    ///
    /// Pixels moved outside the raster are lost.
    pub fn shifted(&self, dx: i32, dy: i32) -> BitRaster {
        let n = self.size as i32;
        let mask = self.mask();
        let mut rows = vec![0u64; self.size as usize];
        for (y, &row) in self.rows.iter().enumerate() {
            let new_y = y as i32 + dy;
            if new_y < 0 || new_y >= n {
                continue;
            }
            let moved = if dx >= n || dx <= -n {
                0
            } else if dx >= 0 {
                row >> dx
            } else {
                (row << -dx) & mask
            };
            rows[new_y as usize] = moved;
        }
        BitRaster {
            size: self.size,
            rows,
        }
    }

    /// Bounding box of the set pixels, or [`Rect::EMPTY`]
    pub fn bounds(&self) -> Rect {
        let mut bounds = Rect::EMPTY;
        for (y, &row) in self.rows.iter().enumerate() {
            if row == 0 {
                continue;
            }
            // leading zeros above the raster width are not pixels
            let unused = 64 - self.size;
            let min_x = row.leading_zeros() - unused;
            let max_x = self.size - 1 - row.trailing_zeros();
            let line = Rect::new(min_x as i32, y as i32, (max_x - min_x + 1) as i32, 1);
            bounds = bounds.union(&line);
        }
        bounds
    }

    /// Raster containing only the pixels inside `rect`
    pub fn masked(&self, rect: &Rect) -> BitRaster {
        let full = Rect::new(0, 0, self.size as i32, self.size as i32);
        let clip = full.intersection(rect);
        let mut out = BitRaster {
            size: self.size,
            rows: vec![0; self.size as usize],
        };
        if clip.is_empty() {
            return out;
        }
        let width = clip.w as u32;
        let span = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        let col_mask = span << (self.size - clip.x as u32 - width);
        for y in clip.y..clip.bottom() {
            out.rows[y as usize] = self.rows[y as usize] & col_mask;
        }
        out
    }

    fn check_same_size(&self, other: &BitRaster) -> CoreResult<()> {
        if self.size != other.size {
            return Err(CoreError::RasterSizeMismatch {
                expected: self.size,
                actual: other.size,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for BitRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitRaster({}x{}, {} set)", self.size, self.size, self.count_ones())?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for BitRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size as i32 {
            let line: String = (0..self.size as i32)
                .map(|x| if self.get(x, y) { 'x' } else { '.' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Low `size` bits set
#[inline]
pub fn row_mask(size: u32) -> u64 {
    if size >= 64 { u64::MAX } else { (1u64 << size) - 1 }
}

fn check_size(size: u32) -> CoreResult<()> {
    if size == 0 || size > MAX_RASTER_SIZE {
        return Err(CoreError::InvalidRasterSize {
            size,
            max: MAX_RASTER_SIZE,
        });
    }
    Ok(())
}

/// Ordered halo layers around a base raster
///
/// Layer `i` holds the pixels at chessboard distance `i + 1` from the base
/// raster's ink. Layers are pairwise disjoint and disjoint from the base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "HaloLayers")]
pub struct HaloSet {
    layers: Vec<BitRaster>,
}

#[derive(Deserialize)]
struct HaloLayers {
    layers: Vec<BitRaster>,
}

impl TryFrom<HaloLayers> for HaloSet {
    type Error = CoreError;

    fn try_from(raw: HaloLayers) -> CoreResult<Self> {
        Self::from_layers(raw.layers)
    }
}

impl HaloSet {
    /// Create a halo set from layers sharing one size
    ///
    /// # Errors
    ///
    /// Returns an error if layer sizes differ.
    pub fn from_layers(layers: Vec<BitRaster>) -> CoreResult<Self> {
        if let Some(first) = layers.first() {
            for layer in &layers[1..] {
                first.check_same_size(layer)?;
            }
        }
        Ok(Self { layers })
    }

    /// Number of layers
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if there are no layers
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get a layer by index
    pub fn get(&self, index: usize) -> Option<&BitRaster> {
        self.layers.get(index)
    }

    /// All layers, innermost first
    pub fn layers(&self) -> &[BitRaster] {
        &self.layers
    }

    /// Iterate over layers, innermost first
    pub fn iter(&self) -> std::slice::Iter<'_, BitRaster> {
        self.layers.iter()
    }
}
