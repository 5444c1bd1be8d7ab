//! Furigana detection
//!
//! Reading aids sit right of a vertical column or above a horizontal row
//! and are much thinner than the main text.

use glyphmatch_core::Rect;

use crate::binarize::Page;
use crate::column::Column;

/// Mark furigana columns and attach them to their main column
pub(crate) fn find_furigana(page: &Page, columns: &mut [Column]) {
    for idx in 0..columns.len() {
        let col = &columns[idx];
        let r = col.rect;
        let probe = if col.vertical {
            Rect::new(r.right(), r.y, r.w / 2, r.h)
        } else {
            Rect::new(r.x, r.y - r.h / 2 - 1, r.w, r.h / 2)
        };
        if page.count_background(&probe, false) >= 2 {
            continue;
        }

        let minor = col.minor_dim() as f32;
        let major = col.major_dim() as f32;
        let median = col.median_area_size();
        let found: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|&(i, c)| {
                i != idx
                    && c.rect.intersects(&probe)
                    && (c.minor_dim() as f32) < minor * 0.55
                    && (c.minor_dim() as f32) > minor * 0.20
                    && (c.major_dim() as f32) < major * 1.05
                    && c.median_area_size() < median * 0.5
            })
            .map(|(i, _)| i)
            .collect();

        for &f in &found {
            columns[f].furigana = true;
        }
        columns[idx].furigana_columns.extend(found);
    }
}
