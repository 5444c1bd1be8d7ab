//! Column - a run of areas in reading order

use glyphmatch_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::area::Area;

/// A vertical column or horizontal row of areas
///
/// `previous` and `next` index into the column list of the owning
/// [`Segmentation`](crate::Segmentation) and link columns that continue the
/// same text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Areas sorted along the reading axis
    pub areas: Vec<Area>,
    /// Bounding rectangle of all areas
    pub rect: Rect,
    /// True for top-to-bottom text
    pub vertical: bool,
    /// True if this column is furigana for another column
    pub furigana: bool,
    /// Furigana columns attached to this column
    pub furigana_columns: Vec<usize>,
    /// Previous column in reading order
    pub previous: Option<usize>,
    /// Next column in reading order
    pub next: Option<usize>,
    #[serde(skip)]
    pub(crate) score: f32,
    #[serde(skip)]
    pub(crate) removed: bool,
}

impl Column {
    /// A column holding one area
    pub fn from_area(area: Area, vertical: bool) -> Self {
        Self {
            rect: area.rect,
            areas: vec![area],
            vertical,
            furigana: false,
            furigana_columns: Vec::new(),
            previous: None,
            next: None,
            score: 0.0,
            removed: false,
        }
    }

    /// Surface area of the bounding rectangle
    pub fn size(&self) -> i64 {
        self.rect.area()
    }

    pub fn midpoint(&self) -> Point {
        self.rect.midpoint()
    }

    /// Width for vertical columns, height for horizontal
    pub fn minor_dim(&self) -> i32 {
        if self.vertical { self.rect.w } else { self.rect.h }
    }

    /// Height for vertical columns, width for horizontal
    pub fn major_dim(&self) -> i32 {
        if self.vertical { self.rect.h } else { self.rect.w }
    }

    pub fn ratio(&self) -> f32 {
        self.rect.ratio()
    }

    /// Total ink pixels of all areas
    pub fn pixels(&self) -> u32 {
        self.areas.iter().map(|a| a.pixels).sum()
    }

    /// Ink pixels per rectangle pixel
    pub fn pixel_area_ratio(&self) -> f32 {
        self.pixels() as f32 / self.size().max(1) as f32
    }

    /// Sum of the area rectangle sizes
    pub fn area_size_sum(&self) -> i64 {
        self.areas.iter().map(Area::size).sum()
    }

    /// Mean minor/major ratio of the areas, 1.0 when empty
    pub fn avg_area_ratio(&self) -> f32 {
        if self.areas.is_empty() {
            return 1.0;
        }
        self.areas.iter().map(Area::ratio).sum::<f32>() / self.areas.len() as f32
    }

    /// Median area rectangle size
    pub fn median_area_size(&self) -> f32 {
        if self.areas.is_empty() {
            return 0.0;
        }
        let mut sizes: Vec<i64> = self.areas.iter().map(Area::size).collect();
        sizes.sort_unstable();
        let n = sizes.len();
        if n % 2 == 1 {
            sizes[n / 2] as f32
        } else {
            (sizes[n / 2 - 1] + sizes[n / 2]) as f32 / 2.0
        }
    }

    /// Darkest value over all areas
    pub fn min_rgb(&self) -> u8 {
        self.areas.iter().map(|a| a.min_rgb).min().unwrap_or(255)
    }

    /// Pixel-weighted mean of the area darkness values
    pub fn avg_rgb(&self) -> f32 {
        let weight: u64 = self.areas.iter().map(|a| a.pixels as u64).sum();
        if weight == 0 {
            return 255.0;
        }
        let sum: u64 = self.areas.iter().map(|a| a.min_rgb as u64 * a.pixels as u64).sum();
        sum as f32 / weight as f32
    }

    /// Intersection size relative to the smaller of the two columns
    pub fn intersect_ratio(&self, other: &Column) -> f32 {
        let common = self.rect.intersection(&other.rect).area();
        if common == 0 {
            return 0.0;
        }
        common as f32 / self.size().min(other.size()).max(1) as f32
    }

    /// Shared width relative to the narrower of the two columns
    pub fn horizontal_intersect_ratio(&self, other: &Column) -> f32 {
        let x0 = self.rect.x.max(other.rect.x);
        let x1 = self.rect.right().min(other.rect.right());
        if x1 <= x0 {
            return 0.0;
        }
        (x1 - x0) as f32 / self.rect.w.min(other.rect.w).max(1) as f32
    }

    /// Union of two columns; areas are re-sorted and overlapping ones fused
    pub fn merge(&self, other: &Column) -> Column {
        let mut areas: Vec<Area> = self.areas.iter().chain(other.areas.iter()).cloned().collect();
        let vertical = self.vertical;
        areas.sort_by_key(|a| {
            let m = a.midpoint();
            if vertical { m.y } else { m.x }
        });
        Column {
            areas: merge_overlapping(areas, vertical),
            rect: self.rect.union(&other.rect),
            vertical,
            furigana: false,
            furigana_columns: Vec::new(),
            previous: None,
            next: None,
            score: 0.0,
            removed: false,
        }
    }
}

/// Fuse neighbouring areas whose extents overlap along the reading axis
fn merge_overlapping(mut areas: Vec<Area>, vertical: bool) -> Vec<Area> {
    let mut i = 0;
    while i + 1 < areas.len() {
        let (a, b) = (&areas[i], &areas[i + 1]);
        let overlap = if vertical {
            a.rect.bottom() > b.rect.y && a.rect.y < b.rect.bottom()
        } else {
            a.rect.right() > b.rect.x && a.rect.x < b.rect.right()
        };
        if overlap {
            let fused = a.merge(b);
            areas.remove(i + 1);
            areas[i] = fused;
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(x: i32, y: i32, w: i32, h: i32, vertical: bool) -> Column {
        Column::from_area(Area::new(Rect::new(x, y, w, h), (w * h) as u32 / 2, 10), vertical)
    }

    #[test]
    fn test_merge_sorts_and_fuses() {
        let a = col(0, 20, 10, 10, true);
        let b = col(0, 0, 10, 10, true);
        let c = col(2, 8, 6, 4, true);
        let m = a.merge(&b).merge(&c);
        assert_eq!(m.rect, Rect::new(0, 0, 10, 30));
        // b and c overlap vertically
        assert_eq!(m.areas.len(), 2);
        assert_eq!(m.areas[0].rect, Rect::new(0, 0, 10, 12));
        assert_eq!(m.areas[1].rect, Rect::new(0, 20, 10, 10));
    }

    #[test]
    fn test_median_and_rgb() {
        let mut c = col(0, 0, 10, 10, false).merge(&col(20, 0, 4, 4, false));
        assert!((c.median_area_size() - 58.0).abs() < 1e-6);
        c.areas[1].min_rgb = 110;
        assert_eq!(c.min_rgb(), 10);
        assert!(c.avg_rgb() > 10.0 && c.avg_rgb() < 110.0);
    }

    #[test]
    fn test_intersect_ratios() {
        let a = col(0, 0, 10, 10, true);
        let b = col(5, 0, 10, 20, true);
        assert!((a.intersect_ratio(&b) - 0.5).abs() < 1e-6);
        assert!((a.horizontal_intersect_ratio(&b) - 0.5).abs() < 1e-6);
        assert_eq!(a.intersect_ratio(&col(50, 50, 2, 2, true)), 0.0);
    }
}
