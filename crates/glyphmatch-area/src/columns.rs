//! Column growth
//!
//! Every area starts as its own column. Columns are then grown by probing
//! along the reading axis (three passes with a growing probe) and finally
//! sideways, merging with the columns the probe hits whenever the merged
//! column scores at least as well as the weighted average of its parts.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glyphmatch_core::Rect;
use glyphmatch_core::util::scale;
use tracing::trace;

use crate::area::Area;
use crate::binarize::Page;
use crate::column::Column;

/// Columns whose darkness differs by more than this are not merged
pub(crate) const RGB_MAX_DELTA: f32 = 100.0;

const LENGTH_PASSES: u32 = 3;

/// Group areas into columns of one orientation
pub(crate) fn find_columns(page: &Page, areas: &[Area], vertical: bool, pixel_threshold: u8) -> Vec<Column> {
    if areas.is_empty() {
        return Vec::new();
    }
    let mut grower = ColumnGrower {
        page,
        pixel_threshold: pixel_threshold as f32,
        columns: areas
            .iter()
            .map(|a| {
                let mut col = Column::from_area(a.clone(), vertical);
                col.score = col.ratio();
                col
            })
            .collect(),
    };
    for pass in 1..=LENGTH_PASSES {
        grower.merge_pass(true, pass);
    }
    grower.merge_pass(false, 1);

    let columns: Vec<Column> = grower.columns.into_iter().filter(|c| !c.removed).collect();
    trace!(vertical, areas = areas.len(), columns = columns.len(), "columns grown");
    columns
}

struct ColumnGrower<'a> {
    page: &'a Page,
    pixel_threshold: f32,
    columns: Vec<Column>,
}

impl ColumnGrower<'_> {
    fn alive_intersecting(&self, rect: &Rect) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.removed && c.rect.intersects(rect))
            .map(|(i, _)| i)
            .collect()
    }

    fn priority(col: &Column) -> i64 {
        col.minor_dim() as i64 * col.size()
    }

    /// Merge until no column can grow; thinner, smaller columns go first
    fn merge_pass(&mut self, expand_length: bool, pass: u32) {
        let mut todo: BinaryHeap<Reverse<(i64, usize)>> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.removed)
            .map(|(i, c)| Reverse((Self::priority(c), i)))
            .collect();

        while let Some(Reverse((_, idx))) = todo.pop() {
            if self.columns[idx].removed {
                continue;
            }
            if let Some(merged) = self.try_grow(idx, expand_length, pass) {
                let new_idx = self.columns.len();
                todo.push(Reverse((Self::priority(&merged), new_idx)));
                self.columns.push(merged);
            }
        }
    }

    /// Try to merge column `idx` with the columns its probe hits. On success
    /// the parts are marked removed and the merged column is returned.
    fn try_grow(&mut self, idx: usize, expand_length: bool, pass: u32) -> Option<Column> {
        let col = &self.columns[idx];
        let probe = if expand_length {
            long_probe(col, pass)
        } else {
            thick_probe(col)
        };
        let mut targets: Vec<usize> = self
            .alive_intersecting(&probe)
            .into_iter()
            .filter(|&t| t != idx)
            .collect();

        let mut largest = idx;
        for &t in &targets {
            if self.columns[t].minor_dim() > self.columns[largest].minor_dim() {
                largest = t;
            }
        }
        if col.avg_rgb() - self.columns[largest].avg_rgb() > RGB_MAX_DELTA {
            return None;
        }
        let rejected = self.filter_targets_by_rgb(&mut targets, largest);
        if targets.is_empty() {
            return None;
        }

        let mut merged = targets
            .iter()
            .fold(col.clone(), |acc, &t| acc.merge(&self.columns[t]));

        if !expand_length {
            // sideways growth may only absorb adjacent columns
            let extra = self
                .alive_intersecting(&merged.rect)
                .into_iter()
                .any(|c| c != idx && !targets.contains(&c) && !rejected.contains(&c));
            if extra {
                return None;
            }
        }

        if !self.check_merge(&mut merged, idx, &targets, largest) {
            return None;
        }
        for &t in &targets {
            self.columns[t].removed = true;
        }
        self.columns[idx].removed = true;
        Some(merged)
    }

    /// Drop targets much lighter than the largest column; returns the dropped ones
    fn filter_targets_by_rgb(&self, targets: &mut Vec<usize>, largest: usize) -> Vec<usize> {
        let big = &self.columns[largest];
        let reference = big.avg_rgb();
        let mut rejected = Vec::new();
        targets.retain(|&t| {
            let target = &self.columns[t];
            if big.rect.contains_rect(&target.rect) || is_dakuten(big, target) {
                return true;
            }
            if target.avg_rgb() - reference > RGB_MAX_DELTA {
                rejected.push(t);
                return false;
            }
            true
        });
        rejected
    }

    fn check_merge(&self, merged: &mut Column, idx: usize, targets: &[usize], largest: usize) -> bool {
        merged.score = self.column_score(merged);
        let big = &self.columns[largest];
        let parts: Vec<&Column> = targets
            .iter()
            .chain(std::iter::once(&idx))
            .map(|&i| &self.columns[i])
            .collect();

        if parts.iter().all(|p| big.intersect_ratio(p) >= 0.65) {
            return true;
        }

        // wide growth of long columns usually swallows furigana
        let expansion = merged.minor_dim() as f32 / big.minor_dim().max(1) as f32;
        let max_penalty = scale(self.columns[idx].areas.len() as f32, 2.0, 4.0, 1.0, 0.8);
        merged.score *= scale(expansion, 1.15, 1.4, 1.0, max_penalty);

        let lowest = parts.iter().map(|p| p.score).fold(f32::INFINITY, f32::min);
        let mut score_sum = 0.0;
        let mut weight_sum = 0.0;
        for p in &parts {
            let mut weight = (p.size() as f32).powf(0.58);
            if p.score == lowest {
                weight *= 1.25;
            }
            weight *= scale(p.min_rgb() as f32, 0.0, self.pixel_threshold, 1.0, 0.5);
            score_sum += p.score * weight;
            weight_sum += weight;
        }
        let old_score = if weight_sum > 0.0 { score_sum / weight_sum } else { 0.0 };

        merged.score >= old_score && self.check_background(merged) && check_column_ends(merged)
    }

    /// Higher is better: large, square, centered areas of similar darkness
    fn column_score(&self, col: &Column) -> f32 {
        let min_rgb = col.min_rgb() as f32;
        let sum: f32 = col
            .areas
            .iter()
            .map(|area| {
                let size = score_size(area, col);
                size * score_shape(area) * score_location(area, col, size)
                    * scale(area.min_rgb as f32 - min_rgb, 50.0, 100.0, 1.0, 0.4)
            })
            .sum();
        sum.sqrt()
    }

    /// Reject columns that cross dividers or bubble outlines
    fn check_background(&self, col: &Column) -> bool {
        if self.page.count_background(&col.rect, false) >= 2 {
            return (self.page.count_background(&col.rect, true) as i32) < col.minor_dim();
        }
        true
    }
}

fn long_probe(col: &Column, pass: u32) -> Rect {
    let r = col.rect;
    let extra = (r.min_dim() as f32 * 0.5 * pass as f32).ceil() as i32;
    if col.vertical {
        Rect::new(r.x, r.y - extra, r.w, r.h + extra * 2)
    } else {
        Rect::new(r.x - extra, r.y, r.w + extra * 2, r.h)
    }
}

fn thick_probe(col: &Column) -> Rect {
    let r = col.rect;
    let extra = r.min_dim();
    if col.vertical {
        Rect::new(r.x - extra, r.y, r.w + extra * 2, r.h)
    } else {
        Rect::new(r.x, r.y - extra, r.w, r.h + extra * 2)
    }
}

/// Small square mark at the upper right of a character; often drawn gray
fn is_dakuten(largest: &Column, target: &Column) -> bool {
    let l = largest.rect;
    let t = target.rect;
    target.areas.len() == 1
        && target.ratio() >= 0.6
        && t.bottom() - 1 >= l.y - l.w / 4
        && t.bottom() < l.bottom()
        && target.midpoint().x > largest.midpoint().x
        && target.pixel_area_ratio() >= 0.5
        && largest.horizontal_intersect_ratio(target) >= 0.7
}

fn score_size(area: &Area, col: &Column) -> f32 {
    let ratio = (area.max_dim() as f32 / (col.minor_dim() as f32 * 0.9)).min(1.0);
    ratio * ratio
}

fn score_shape(area: &Area) -> f32 {
    scale(area.ratio(), 0.0, 0.9, 0.0, 1.0).powf(1.2)
}

fn score_location(area: &Area, col: &Column, size_score: f32) -> f32 {
    let (first, second) = if col.vertical {
        (area.rect.x - col.rect.x, col.rect.right() - area.rect.right())
    } else {
        (area.rect.y - col.rect.y, col.rect.bottom() - area.rect.bottom())
    };
    let diff = (first - second).abs() as f32 / col.minor_dim().max(1) as f32;
    let diff = scale(diff, 0.1, 1.0, 0.0, 1.0);
    let exponent = scale(size_score, 0.2, 0.8, 6.0, 3.0);
    (1.0 - diff).powf(exponent)
}

/// Both ends of the column must hold a reasonable amount of ink
fn check_column_ends(col: &Column) -> bool {
    let r = col.rect;
    let len = col.minor_dim();
    let (first, second) = if col.vertical {
        (
            Rect::new(r.x, r.y, r.w, len),
            Rect::new(r.x, r.bottom() - 1 - len, r.w, len),
        )
    } else {
        (
            Rect::new(r.x, r.y, len, r.h),
            Rect::new(r.right() - 1 - len, r.y, len, r.h),
        )
    };
    check_column_end(col, &first) && check_column_end(col, &second)
}

fn check_column_end(col: &Column, probe: &Rect) -> bool {
    let mut pixels = 0.0;
    for area in &col.areas {
        let common = probe.intersection(&area.rect).area();
        if common == 0 {
            continue;
        }
        let overlap = common as f32 / area.size().max(1) as f32;
        // thin strokes along the reading axis count extra
        let shape = scale(area.major_minor_ratio(col.vertical), 0.5, 1.5, 0.5, 1.5);
        pixels += area.pixels as f32 * overlap * shape;
    }
    pixels / probe.area().max(1) as f32 >= 0.05
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphmatch_core::BinaryImage;

    fn blank_page(w: u32, h: u32) -> Page {
        Page {
            binary: BinaryImage::new(w, h).unwrap(),
            darkness: vec![255; (w * h) as usize],
            border: BinaryImage::new(w, h).unwrap(),
            background: BinaryImage::new(w, h).unwrap(),
        }
    }

    fn area(x: i32, y: i32, w: i32, h: i32) -> Area {
        Area::new(Rect::new(x, y, w, h), (w * h) as u32 / 2, 0)
    }

    #[test]
    fn test_vertical_run_merges() {
        let page = blank_page(200, 200);
        let areas = vec![area(50, 20, 20, 20), area(50, 46, 20, 20), area(50, 72, 20, 20)];
        let cols = find_columns(&page, &areas, true, 140);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].areas.len(), 3);
        assert_eq!(cols[0].rect, Rect::new(50, 20, 20, 72));
        assert!(cols[0].areas.windows(2).all(|w| w[0].rect.y < w[1].rect.y));
    }

    #[test]
    fn test_distant_areas_stay_apart() {
        let page = blank_page(300, 300);
        let areas = vec![area(20, 20, 20, 20), area(200, 200, 20, 20)];
        let cols = find_columns(&page, &areas, true, 140);
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn test_divider_blocks_merge() {
        let mut page = blank_page(200, 200);
        for x in 40..80 {
            page.background.set(x, 43, true);
        }
        let areas = vec![area(50, 20, 20, 20), area(50, 46, 20, 20)];
        let cols = find_columns(&page, &areas, true, 140);
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let page = blank_page(10, 10);
        assert!(find_columns(&page, &[], false, 140).is_empty());
    }

    #[test]
    fn test_probes() {
        let col = Column::from_area(area(10, 10, 10, 30), true);
        assert_eq!(long_probe(&col, 1), Rect::new(10, 5, 10, 40));
        assert_eq!(long_probe(&col, 3), Rect::new(10, -5, 10, 60));
        assert_eq!(thick_probe(&col), Rect::new(0, 10, 30, 30));
    }
}
