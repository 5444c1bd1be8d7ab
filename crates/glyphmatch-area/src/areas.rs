//! Blob extraction
//!
//! Groups touching ink pixels into [`Area`]s and drops blobs that cannot be
//! characters: anything touching the image edge or a divider line, oversized
//! or sparse blobs, speech bubbles, dither noise and specks. Ink outside the
//! accepted areas becomes the page background.

use glyphmatch_core::util::scale;
use glyphmatch_core::{BinaryImage, Point, Rect};
use glyphmatch_region::{ConnectedComponent, ConnectivityType, find_connected_components};
use tracing::trace;

use crate::area::Area;
use crate::binarize::Page;
use crate::error::AreaResult;
use crate::options::AreaOptions;

/// Blobs larger than this (in rectangle pixels) need some minimum density
const SPARSE_MIN_SIZE: i64 = 300;
const SPARSE_MIN_DENSITY: f32 = 0.09;

const BUBBLE_MIN_DIM: i32 = 80;
const BUBBLE_ELLIPSE_SCALE: f32 = 0.88;
const BUBBLE_OUTSIDE_RATIO: f32 = 0.92;

const DITHER_PROBE_SIZE: i32 = 80;
const DITHER_PROBE_OVERLAP: i32 = 8;
const DITHER_MIN_SMALL_AREAS: usize = 80;

/// Find character candidates and fill in `page.background`
pub(crate) fn find_areas(page: &mut Page, options: &AreaOptions) -> AreaResult<Vec<Area>> {
    let components = find_connected_components(&page.binary, ConnectivityType::EightWay)?;
    let mut background = page.binary.clone();
    let mut areas = Vec::new();

    for comp in &components {
        if let Some(area) = accept_component(page, comp, options) {
            for p in &comp.pixels {
                background.set(p.x as u32, p.y as u32, false);
            }
            areas.push(area);
        }
    }
    page.background = background;

    let found = areas.len();
    remove_isolated_pixel_dither(&page.binary, &mut areas, options);
    remove_dense_dither(page.width(), page.height(), &mut areas);
    areas.retain(|a| a.pixels >= options.min_area_pixels);
    trace!(found, kept = areas.len(), "areas filtered");

    Ok(areas)
}

fn accept_component(page: &Page, comp: &ConnectedComponent, options: &AreaOptions) -> Option<Area> {
    let (w, h) = (page.width() as i32, page.height() as i32);
    let touches_edge = comp.pixels.iter().any(|p| {
        p.x <= 0 || p.y <= 0 || p.x >= w - 1 || p.y >= h - 1 || page.border.get_point(*p)
    });
    if touches_edge {
        return None;
    }

    let rect = comp.bounds;
    if rect.w > options.max_area_size as i32 || rect.h > options.max_area_size as i32 {
        return None;
    }
    let density = comp.pixel_count as f32 / rect.area().max(1) as f32;
    if rect.area() > SPARSE_MIN_SIZE && density < SPARSE_MIN_DENSITY {
        return None;
    }
    if is_speech_bubble(&page.binary, &rect, comp.pixel_count) {
        return None;
    }

    let min_rgb = comp
        .pixels
        .iter()
        .map(|p| page.darkness(p.x, p.y))
        .min()
        .unwrap_or(255);
    Some(Area::new(rect, comp.pixel_count, min_rgb))
}

/// Most of the ink lies on a ring near the bounding rectangle
fn is_speech_bubble(image: &BinaryImage, rect: &Rect, pixels: u32) -> bool {
    if rect.w < BUBBLE_MIN_DIM || rect.h < BUBBLE_MIN_DIM {
        return false;
    }
    let a2 = (rect.w as f32 / 2.0 * BUBBLE_ELLIPSE_SCALE).powi(2);
    let b2 = (rect.h as f32 / 2.0 * BUBBLE_ELLIPSE_SCALE).powi(2);
    let Point { x: cx, y: cy } = rect.midpoint();
    let mut outside = 0u32;
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let v = ((x - cx) as f32).powi(2) / a2 + ((y - cy) as f32).powi(2) / b2;
            if v > 1.0 && image.get(x, y) {
                outside += 1;
            }
        }
    }
    outside as f32 / pixels.max(1) as f32 > BUBBLE_OUTSIDE_RATIO
}

/// Drop areas made mostly of pixels with few 4-neighbours
fn remove_isolated_pixel_dither(image: &BinaryImage, areas: &mut Vec<Area>, options: &AreaOptions) {
    areas.retain(|area| {
        if area.pixels <= 15 {
            return true;
        }
        let mut counts = [0u32; 5];
        for y in area.rect.y..area.rect.bottom() {
            for x in area.rect.x..area.rect.right() {
                if !image.get(x, y) {
                    continue;
                }
                let n = [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
                    .iter()
                    .filter(|&&(nx, ny)| image.get(nx, ny))
                    .count();
                counts[n] += 1;
            }
        }
        if counts[0] > area.pixels / 2 {
            return false;
        }
        let score = (counts[0] as f32 * 2.0 + counts[1] as f32) / area.pixels as f32;
        let rgb_quality = area.min_rgb as f32 / options.pixel_threshold as f32;
        let threshold = 1.3 * scale(rgb_quality, 0.5, 0.7, 1.0, 0.6);
        score < threshold
    });
}

/// Drop clusters of many tiny square specks
fn remove_dense_dither(width: u32, height: u32, areas: &mut Vec<Area>) {
    let mut remove = vec![false; areas.len()];
    let step = DITHER_PROBE_SIZE - DITHER_PROBE_OVERLAP;
    for x in (0..width as i32).step_by(step as usize) {
        for y in (0..height as i32).step_by(step as usize) {
            let probe = Rect::new(x, y, DITHER_PROBE_SIZE, DITHER_PROBE_SIZE);
            let small: Vec<usize> = areas
                .iter()
                .enumerate()
                .filter(|(_, a)| a.pixels <= 6 && a.ratio() > 0.6 && a.rect.intersects(&probe))
                .map(|(i, _)| i)
                .collect();
            if small.len() >= DITHER_MIN_SMALL_AREAS {
                for i in small {
                    remove[i] = true;
                }
            }
        }
    }
    let mut flags = remove.into_iter();
    areas.retain(|_| !flags.next().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphmatch_core::BinaryImage;

    fn page_from(binary: BinaryImage) -> Page {
        let (w, h) = (binary.width(), binary.height());
        Page {
            darkness: binary.to_gray().into_raw(),
            border: BinaryImage::new(w, h).unwrap(),
            background: BinaryImage::new(w, h).unwrap(),
            binary,
        }
    }

    fn boxes(w: u32, h: u32, rects: &[Rect]) -> BinaryImage {
        BinaryImage::from_fn(w, h, |x, y| {
            rects
                .iter()
                .any(|r| r.contains_point(Point::new(x as i32, y as i32)))
        })
        .unwrap()
    }

    #[test]
    fn test_edge_blobs_become_background() {
        let img = boxes(40, 40, &[Rect::new(0, 5, 10, 10), Rect::new(20, 20, 10, 10)]);
        let mut page = page_from(img);
        let areas = find_areas(&mut page, &AreaOptions::default()).unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].rect, Rect::new(20, 20, 10, 10));
        assert_eq!(areas[0].min_rgb, 0);
        assert!(page.background.get(3, 8));
        assert!(!page.background.get(25, 25));
    }

    #[test]
    fn test_oversized_and_tiny_removed() {
        let img = boxes(
            200,
            200,
            &[Rect::new(5, 5, 130, 4), Rect::new(50, 50, 2, 1), Rect::new(80, 80, 8, 8)],
        );
        let mut page = page_from(img);
        let areas = find_areas(&mut page, &AreaOptions::default()).unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].rect, Rect::new(80, 80, 8, 8));
        // too-wide line stays in the background, the speck does not
        assert!(page.background.get(60, 6));
        assert!(!page.background.get(50, 50));
    }

    #[test]
    fn test_speech_bubble_rejected() {
        let img = BinaryImage::from_fn(120, 120, |x, y| {
            let (dx, dy) = (x as f32 - 60.0, y as f32 - 60.0);
            let r = (dx * dx + dy * dy).sqrt();
            (47.0..50.0).contains(&r)
        })
        .unwrap();
        let mut page = page_from(img);
        let areas = find_areas(&mut page, &AreaOptions::default()).unwrap();
        assert!(areas.is_empty());
        assert!(page.background.count_ones() > 0);
    }

    #[test]
    fn test_checkerboard_dither_removed() {
        // 20x20 checkerboard with one connecting row: mostly isolated-looking pixels
        let img = BinaryImage::from_fn(40, 40, |x, y| {
            (10..30).contains(&x) && (10..30).contains(&y) && ((x + y) % 2 == 0 || y == 10)
        })
        .unwrap();
        let mut page = page_from(img);
        let areas = find_areas(&mut page, &AreaOptions::default()).unwrap();
        assert!(areas.is_empty());
    }
}
