//! Local orientation choice
//!
//! Vertical and horizontal column sets are built independently over the same
//! areas. Columns that overlap are grouped, each group is scored in both
//! orientations and only the better-scoring orientation survives, so
//! different parts of one image may read in different directions.

use std::collections::HashSet;

use glyphmatch_core::util::scale;
use tracing::trace;

use crate::area::Area;
use crate::column::Column;
use crate::columns::RGB_MAX_DELTA;

/// Columns whose smaller side is at most this are dropped after merging
const MIN_COLUMN_DIM: i32 = 7;

/// Pick one orientation per overlapping group of columns
///
/// Links (`previous`, `next`, `furigana_columns`) of the returned columns
/// index into the returned list; links to dropped columns are cleared.
pub(crate) fn merge_orientations(vertical: Vec<Column>, horizontal: Vec<Column>) -> Vec<Column> {
    let offset = vertical.len();
    let mut all = vertical;
    all.extend(horizontal.into_iter().map(|mut c| {
        c.previous = c.previous.map(|i| i + offset);
        c.next = c.next.map(|i| i + offset);
        c.furigana_columns.iter_mut().for_each(|i| *i += offset);
        c
    }));

    let furigana_areas = |vertical: bool| -> Vec<Area> {
        all.iter()
            .filter(|c| c.furigana && c.vertical == vertical)
            .flat_map(|c| c.areas.iter().cloned())
            .collect()
    };
    let merger = OrientationMerger {
        vertical_furigana: furigana_areas(true),
        horizontal_furigana: furigana_areas(false),
        columns: &all,
    };

    let mut order: Vec<usize> = (0..all.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(all[i].size()));

    let mut visited = vec![false; all.len()];
    let mut chosen = Vec::new();
    for &seed in &order {
        if visited[seed] {
            continue;
        }
        chosen.extend(merger.process_group(seed, &mut visited));
    }
    chosen.retain(|&i| all[i].rect.min_dim() > MIN_COLUMN_DIM);
    trace!(total = all.len(), kept = chosen.len(), "orientation merged");

    select(all, &chosen)
}

/// Keep `chosen` columns in order and remap their links
pub(crate) fn select(columns: Vec<Column>, chosen: &[usize]) -> Vec<Column> {
    let mut remap = vec![None; columns.len()];
    for (new, &old) in chosen.iter().enumerate() {
        remap[old] = Some(new);
    }
    let mut slots: Vec<Option<Column>> = columns.into_iter().map(Some).collect();
    chosen
        .iter()
        .filter_map(|&old| slots[old].take())
        .map(|mut c| {
            c.previous = c.previous.and_then(|i| remap[i]);
            c.next = c.next.and_then(|i| remap[i]);
            c.furigana_columns = c.furigana_columns.iter().filter_map(|&i| remap[i]).collect();
            c
        })
        .collect()
}

struct OrientationMerger<'a> {
    columns: &'a [Column],
    vertical_furigana: Vec<Area>,
    horizontal_furigana: Vec<Area>,
}

impl OrientationMerger<'_> {
    /// Collect the overlap group around `seed`; returns the winning columns
    fn process_group(&self, seed: usize, visited: &mut [bool]) -> Vec<usize> {
        let seed_rgb = self.columns[seed].min_rgb() as f32;
        let mut vertical = Vec::new();
        let mut horizontal = Vec::new();
        let mut todo = vec![seed];

        while let Some(next) = todo.pop() {
            if visited[next] {
                continue;
            }
            let col = &self.columns[next];
            if col.vertical {
                vertical.push(next);
            } else {
                horizontal.push(next);
            }

            let mut probes = vec![col.rect];
            probes.extend(col.furigana_columns.iter().map(|&f| self.columns[f].rect));
            for (i, cand) in self.columns.iter().enumerate() {
                if i == next || !probes.iter().any(|p| p.intersects(&cand.rect)) {
                    continue;
                }
                if (seed_rgb - cand.min_rgb() as f32).abs() > RGB_MAX_DELTA {
                    continue;
                }
                let common = col.rect.intersection(&cand.rect).area();
                let ref1 = quarter_square(col.minor_dim());
                let ref2 = quarter_square(cand.minor_dim());
                if common >= ref1 || common >= ref2 {
                    todo.push(i);
                }
            }
            visited[next] = true;
        }

        let v_score = self.group_score(&vertical);
        let h_score = self.group_score(&horizontal);
        let pick_vertical = match (v_score, h_score) {
            (Some(v), Some(h)) => v <= h,
            (None, Some(_)) => false,
            _ => true,
        };
        trace!(?v_score, ?h_score, pick_vertical, "group scored");
        if pick_vertical { vertical } else { horizontal }
    }

    /// Lower is better; `None` when the group has nothing to measure
    fn group_score(&self, group: &[usize]) -> Option<f32> {
        if group.is_empty() {
            return None;
        }
        let distances: Vec<Option<f32>> = group
            .iter()
            .map(|&i| self.area_distance(&self.columns[i]))
            .collect();

        let mut distance_sum = 0.0;
        let mut weight_sum = 0.0;
        let mut null_weight = 0.0;
        let mut total_weight = 0.0;
        for (&i, d) in group.iter().zip(&distances) {
            let col = &self.columns[i];
            let base = (col.area_size_sum() as f32).sqrt();
            total_weight += base;
            let Some(d) = d else {
                null_weight += base;
                continue;
            };
            let mut weight = base;
            if col.areas.len() == 2 {
                weight *= col.avg_area_ratio().powi(2);
            }
            distance_sum += d * weight;
            weight_sum += weight;
        }
        if weight_sum <= 0.0 {
            return None;
        }
        let distance_score = distance_sum / weight_sum;

        let null_ratio = if total_weight > 0.0 { null_weight / total_weight } else { 1.0 };
        let null_score = if null_ratio < 0.5 {
            scale(null_ratio, 0.0, 0.5, 1.0, 1.1)
        } else {
            scale(null_ratio, 0.5, 1.0, 1.1, 10.0)
        };

        let connected = self.connected_score(group)?;
        Some(distance_score * connected * null_score)
    }

    /// Mean midpoint distance between well-formed neighbouring areas
    fn area_distance(&self, col: &Column) -> Option<f32> {
        let mut areas: Vec<&Area> = col
            .areas
            .iter()
            .filter(|a| !self.is_other_orientation_furigana(a, col.vertical))
            .collect();
        areas.sort_by_key(|a| if col.vertical { a.rect.y } else { a.rect.x });

        let minor = col.minor_dim() as f32;
        let mut sum = 0.0;
        let mut pairs = 0;
        for pair in areas.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let smaller = if prev.size() < next.size() { prev } else { next };
            if smaller.size() as f32 / (minor * minor) <= 0.3 && smaller.ratio() >= 0.5 {
                continue;
            }
            let avg_ratio =
                (prev.major_minor_ratio(col.vertical) + next.major_minor_ratio(col.vertical)) / 2.0;
            if avg_ratio <= 0.7 {
                continue;
            }
            let max_len = prev.major_dim(col.vertical).max(next.major_dim(col.vertical)) as f32;
            if max_len > minor * 1.5 {
                continue;
            }
            let distance = if col.vertical {
                next.midpoint().y - prev.midpoint().y
            } else {
                next.midpoint().x - prev.midpoint().x
            } as f32;
            if distance > minor * 2.0 {
                continue;
            }
            sum += distance;
            pairs += 1;
        }
        (pairs > 0).then(|| sum / pairs as f32)
    }

    /// Area matches the furigana of the other orientation pixel for pixel
    fn is_other_orientation_furigana(&self, area: &Area, vertical: bool) -> bool {
        let others = if vertical {
            &self.horizontal_furigana
        } else {
            &self.vertical_furigana
        };
        let pixels: u32 = others
            .iter()
            .filter(|f| f.rect.intersects(&area.rect))
            .map(|f| f.pixels)
            .sum();
        pixels == area.pixels
    }

    /// Best score over the chains of linked columns starting inside the group
    fn connected_score(&self, group: &[usize]) -> Option<f32> {
        let members: HashSet<usize> = group.iter().copied().collect();
        let mut best: Option<f32> = None;
        for &start in group {
            if self.columns[start].previous.is_some_and(|p| members.contains(&p)) {
                continue;
            }
            let mut seen = HashSet::new();
            let mut ratio_sum = 0.0;
            let mut current = Some(start);
            while let Some(i) = current {
                if !seen.insert(i) {
                    break;
                }
                ratio_sum += self.columns[i].areas.iter().map(Area::ratio).sum::<f32>();
                current = self.columns[i].next;
            }
            if ratio_sum <= 0.0 {
                continue;
            }
            let score = 1.0 / ratio_sum.powf(0.2);
            if best.is_none_or(|b| score < b) {
                best = Some(score);
            }
        }
        best
    }
}

fn quarter_square(dim: i32) -> i64 {
    let d = dim as i64;
    (d * d + 3) / 4
}
