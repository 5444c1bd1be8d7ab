//! Reading-order links between columns
//!
//! A vertical column continues in the column to its left, a horizontal row
//! in the row below it. Links never branch: a column receives at most one
//! predecessor.

use glyphmatch_core::{Point, Rect};

use crate::binarize::Page;
use crate::column::Column;

const PROBE_SIZE_FACTOR: f32 = 1.75;
const WIDTH_TOLERANCE: f32 = 0.75;

fn start_point(col: &Column) -> Point {
    if col.vertical {
        Point::new(col.rect.x, col.rect.y)
    } else {
        Point::new(col.rect.x, col.rect.bottom() - 1)
    }
}

fn end_point(col: &Column) -> Point {
    if col.vertical {
        Point::new(col.rect.right() - 1, col.rect.y)
    } else {
        Point::new(col.rect.x, col.rect.y)
    }
}

fn between(a: Point, b: Point) -> Rect {
    Rect::from_corners(a.x, a.y, b.x, b.y)
}

/// Link every column to the column that continues its text
pub(crate) fn find_connections(page: &Page, columns: &mut [Column]) {
    for idx in 0..columns.len() {
        if let Some(target) = next_column(page, columns, idx) {
            columns[idx].next = Some(target);
            columns[target].previous = Some(idx);
        }
    }
}

fn next_column(page: &Page, columns: &[Column], idx: usize) -> Option<usize> {
    let col = &columns[idx];
    let r = col.rect;
    let probe = if col.vertical {
        let size = (r.w as f32 * PROBE_SIZE_FACTOR).ceil() as i32;
        Rect::new(r.x - size - 1, r.y - size / 2, size, size)
    } else {
        let size = (r.h as f32 * PROBE_SIZE_FACTOR).ceil() as i32;
        Rect::new(r.x - size / 2, r.bottom(), size, size)
    };

    let start = start_point(col);
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in columns.iter().enumerate() {
        if i == idx || c.furigana || !c.rect.intersects(&probe) {
            continue;
        }
        let anchor = if col.vertical {
            Point::new(c.rect.right() - 1, c.rect.y)
        } else {
            Point::new(c.rect.x, c.rect.y)
        };
        if !probe.contains_point(anchor) {
            continue;
        }
        let distance = start.distance(end_point(c));
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    let (target, _) = best?;
    let tc = &columns[target];

    if tc.previous.is_some() {
        return None;
    }

    // no divider between the two columns
    let end = end_point(tc);
    if page.count_background(&between(start, end), true) >= 2
        || page.count_background(&between(col.midpoint(), end), true) >= 2
    {
        return None;
    }

    let (w1, w2) = (col.minor_dim() as f32, tc.minor_dim() as f32);
    if w1 < w2 * WIDTH_TOLERANCE || w2 < w1 * WIDTH_TOLERANCE {
        return None;
    }

    let gap = between(start, end);
    let crossed = columns
        .iter()
        .enumerate()
        .any(|(i, c)| i != idx && i != target && c.rect.intersects(&gap));
    if crossed {
        return None;
    }
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use glyphmatch_core::BinaryImage;

    fn page(w: u32, h: u32) -> Page {
        Page {
            binary: BinaryImage::new(w, h).unwrap(),
            darkness: vec![255; (w * h) as usize],
            border: BinaryImage::new(w, h).unwrap(),
            background: BinaryImage::new(w, h).unwrap(),
        }
    }

    fn col(x: i32, y: i32, w: i32, h: i32, vertical: bool) -> Column {
        Column::from_area(Area::new(Rect::new(x, y, w, h), (w * h) as u32 / 2, 0), vertical)
    }

    #[test]
    fn test_vertical_continues_left() {
        let mut cols = vec![col(100, 20, 20, 80, true), col(70, 22, 20, 60, true)];
        find_connections(&page(200, 200), &mut cols);
        assert_eq!(cols[0].next, Some(1));
        assert_eq!(cols[1].previous, Some(0));
        assert_eq!(cols[1].next, None);
    }

    #[test]
    fn test_horizontal_continues_below() {
        let mut cols = vec![col(20, 20, 80, 20, false), col(22, 46, 60, 20, false)];
        find_connections(&page(200, 200), &mut cols);
        assert_eq!(cols[0].next, Some(1));
        assert_eq!(cols[1].previous, Some(0));
    }

    #[test]
    fn test_divider_blocks_link() {
        let mut p = page(200, 200);
        for y in 0..200 {
            p.background.set(95, y, true);
        }
        let mut cols = vec![col(100, 20, 20, 80, true), col(70, 22, 20, 60, true)];
        find_connections(&p, &mut cols);
        assert_eq!(cols[0].next, None);
    }

    #[test]
    fn test_width_mismatch_blocks_link() {
        let mut cols = vec![col(100, 20, 20, 80, true), col(80, 22, 10, 60, true)];
        find_connections(&page(200, 200), &mut cols);
        assert_eq!(cols[0].next, None);
    }
}
