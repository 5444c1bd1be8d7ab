//! Binarization and white-on-black inversion
//!
//! Produces the [`Page`] every later step reads: the foreground mask, a
//! per-pixel darkness value, and the divider lines drawn around inverted
//! regions.

use std::collections::VecDeque;

use glyphmatch_core::{BinaryImage, PixelSource, Rect, Rgba};

use crate::error::AreaResult;
use crate::options::{AreaOptions, CharacterColor};

/// Inversion works on square blocks of this many pixels
pub(crate) const BLOCK_SIZE: u32 = 15;

/// Alpha below which a pixel is treated as background
const MIN_ALPHA: u8 = 128;

/// Pixel maps shared by the segmentation steps
#[derive(Debug, Clone)]
pub(crate) struct Page {
    pub binary: BinaryImage,
    /// Darkest channel per pixel, flipped where the pixel was inverted
    pub darkness: Vec<u8>,
    /// Lines drawn around inverted regions
    pub border: BinaryImage,
    /// Ink that belongs to no accepted area (dividers, bubbles, frames)
    pub background: BinaryImage,
}

impl Page {
    pub fn width(&self) -> u32 {
        self.binary.width()
    }

    pub fn height(&self) -> u32 {
        self.binary.height()
    }

    /// Darkness of a pixel, 0 (ink) to 255
    pub fn darkness(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return 255;
        }
        self.darkness[y as usize * self.width() as usize + x as usize]
    }

    /// Count background pixels in `rect`; only its outline unless `inside`
    pub fn count_background(&self, rect: &Rect, inside: bool) -> u32 {
        let clip = rect.clip(self.width(), self.height());
        if clip.is_empty() {
            return 0;
        }
        let mut count = 0;
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                let edge = y == rect.y || y == rect.bottom() - 1 || x == rect.x || x == rect.right() - 1;
                if (inside || edge) && self.background.get(x, y) {
                    count += 1;
                }
            }
        }
        count
    }
}

/// True if at least two of the three channels are darker than `threshold`
fn is_ink(p: Rgba, threshold: u8) -> bool {
    let r = p.r < threshold;
    let g = p.g < threshold;
    let b = p.b < threshold;
    (r && g) || (g && b) || (r && b)
}

fn is_fixed_color(p: Rgba, red: u8, green: u8, blue: u8, range: u8) -> bool {
    let near = |v: u8, target: u8| (v as i32 - target as i32).abs() <= range as i32;
    near(p.r, red) && near(p.g, green) && near(p.b, blue)
}

/// Classify every pixel and undo white-on-black regions
pub(crate) fn binarize<P: PixelSource + ?Sized>(image: &P, options: &AreaOptions) -> AreaResult<Page> {
    let width = image.width();
    let height = image.height();
    let mut binary = BinaryImage::new(width, height)?;
    let mut darkness = vec![255u8; width as usize * height as usize];

    for y in 0..height {
        for x in 0..width {
            let p = image.pixel(x, y);
            let idx = y as usize * width as usize + x as usize;
            if p.a < MIN_ALPHA {
                continue;
            }
            darkness[idx] = p.min_channel();
            let ink = match options.color {
                CharacterColor::Fixed {
                    red,
                    green,
                    blue,
                    range,
                } => is_fixed_color(p, red, green, blue, range),
                _ => is_ink(p, options.pixel_threshold),
            };
            binary.set(x, y, ink);
        }
    }

    let mut border = BinaryImage::new(width, height)?;
    let inverted = match options.color {
        CharacterColor::Automatic => {
            let mut inverter = BlockInverter::new(width, height);
            inverter.detect(&binary);
            inverter.apply(&mut binary, &mut border);
            Some(inverter)
        }
        CharacterColor::WhiteOnBlack => {
            for y in 0..height {
                for x in 0..width {
                    let v = binary.get(x as i32, y as i32);
                    binary.set(x, y, !v);
                }
            }
            darkness.iter_mut().for_each(|d| *d = 255 - *d);
            None
        }
        CharacterColor::BlackOnWhite | CharacterColor::Fixed { .. } => None,
    };

    if let Some(inverter) = inverted {
        for y in 0..height {
            for x in 0..width {
                if inverter.is_inverted(x / BLOCK_SIZE, y / BLOCK_SIZE) {
                    let idx = y as usize * width as usize + x as usize;
                    darkness[idx] = 255 - darkness[idx];
                }
            }
        }
    }

    let background = BinaryImage::new(width, height)?;
    Ok(Page {
        binary,
        darkness,
        border,
        background,
    })
}

/// Finds and inverts connected regions of nearly black blocks
struct BlockInverter {
    cols: u32,
    rows: u32,
    visited: Vec<bool>,
    invert: Vec<bool>,
    neighbours_inverted: Vec<u32>,
}

impl BlockInverter {
    fn new(width: u32, height: u32) -> Self {
        let cols = width.div_ceil(BLOCK_SIZE);
        let rows = height.div_ceil(BLOCK_SIZE);
        let n = (cols * rows) as usize;
        Self {
            cols,
            rows,
            visited: vec![false; n],
            invert: vec![false; n],
            neighbours_inverted: vec![0; n],
        }
    }

    fn idx(&self, bx: u32, by: u32) -> usize {
        (by * self.cols + bx) as usize
    }

    fn is_inverted(&self, bx: u32, by: u32) -> bool {
        bx < self.cols && by < self.rows && self.invert[self.idx(bx, by)]
    }

    fn ink_ratio(image: &BinaryImage, bx: u32, by: u32) -> f32 {
        let rect = Rect::new(
            (bx * BLOCK_SIZE) as i32,
            (by * BLOCK_SIZE) as i32,
            BLOCK_SIZE as i32,
            BLOCK_SIZE as i32,
        )
        .clip(image.width(), image.height());
        image.count_in(&rect) as f32 / rect.area().max(1) as f32
    }

    fn detect(&mut self, image: &BinaryImage) {
        for by in 0..self.rows {
            for bx in 0..self.cols {
                self.check_block(image, bx, by);
            }
        }
    }

    /// Flood-fills dark blocks starting at (bx, by); keeps the region only if
    /// it is large enough to be a background rather than a thick stroke.
    fn check_block(&mut self, image: &BinaryImage, bx: u32, by: u32) {
        let mut marked = Vec::new();
        let mut black_blocks = 0;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (bx, bx, by, by);
        let mut todo = VecDeque::from([(bx, by)]);

        while let Some((x, y)) = todo.pop_front() {
            let i = self.idx(x, y);
            if self.visited[i] {
                continue;
            }
            self.visited[i] = true;
            let ratio = Self::ink_ratio(image, x, y);
            let threshold = 0.95 - self.neighbours_inverted[i] as f32 * 0.25;
            if ratio >= threshold {
                self.mark(x, y, &mut todo);
                marked.push((x, y));
            }
            if ratio >= 0.95 {
                black_blocks += 1;
            }
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let quads = marked
            .iter()
            .filter(|&&(x, y)| {
                self.is_inverted(x + 1, y) && self.is_inverted(x, y + 1) && self.is_inverted(x + 1, y + 1)
            })
            .count();

        if quads < 4 || black_blocks < 4 {
            for (x, y) in marked {
                let i = self.idx(x, y);
                self.invert[i] = false;
            }
            return;
        }
        self.fill_gaps(min_x, max_x, min_y, max_y);
    }

    fn mark(&mut self, x: u32, y: u32, todo: &mut VecDeque<(u32, u32)>) {
        let i = self.idx(x, y);
        self.invert[i] = true;
        let mut push = |nx: u32, ny: u32, this: &mut Self| {
            let n = this.idx(nx, ny);
            this.neighbours_inverted[n] += 1;
            todo.push_back((nx, ny));
        };
        if x > 0 {
            push(x - 1, y, self);
        }
        if x + 1 < self.cols {
            push(x + 1, y, self);
        }
        if y > 0 {
            push(x, y - 1, self);
        }
        if y + 1 < self.rows {
            push(x, y + 1, self);
        }
    }

    /// Inverts small enclosed gaps (text holes) inside an inverted region
    fn fill_gaps(&mut self, min_x: u32, max_x: u32, min_y: u32, max_y: u32) {
        const MAX_GAP_BLOCKS: u32 = 8;
        if max_x < min_x + 2 || max_y < min_y + 2 {
            return;
        }
        let (ix0, ix1, iy0, iy1) = (min_x + 1, max_x - 1, min_y + 1, max_y - 1);
        let mut seen = vec![false; self.invert.len()];

        for y in iy0..=iy1 {
            for x in ix0..=ix1 {
                let start = self.idx(x, y);
                if self.invert[start] || seen[start] {
                    continue;
                }
                let mut gap = Vec::new();
                let mut touches_border = false;
                let (mut gx0, mut gx1, mut gy0, mut gy1) = (x, x, y, y);
                let mut todo = VecDeque::from([(x as i64, y as i64)]);
                while let Some((cx, cy)) = todo.pop_front() {
                    if cx < ix0 as i64 || cx > ix1 as i64 || cy < iy0 as i64 || cy > iy1 as i64 {
                        touches_border = true;
                        continue;
                    }
                    let (ux, uy) = (cx as u32, cy as u32);
                    let i = self.idx(ux, uy);
                    if self.invert[i] || seen[i] {
                        continue;
                    }
                    seen[i] = true;
                    gap.push(i);
                    gx0 = gx0.min(ux);
                    gx1 = gx1.max(ux);
                    gy0 = gy0.min(uy);
                    gy1 = gy1.max(uy);
                    todo.extend([(cx, cy - 1), (cx, cy + 1), (cx - 1, cy), (cx + 1, cy)]);
                }
                if touches_border {
                    continue;
                }
                if gx1 - gx0 + 1 > MAX_GAP_BLOCKS && gy1 - gy0 + 1 > MAX_GAP_BLOCKS {
                    continue;
                }
                for i in gap {
                    self.invert[i] = true;
                }
            }
        }
    }

    /// Flips pixels of every inverted block and draws lines where an
    /// inverted block meets a non-inverted one
    fn apply(&self, binary: &mut BinaryImage, border: &mut BinaryImage) {
        let (w, h) = (binary.width(), binary.height());
        for by in 0..self.rows {
            for bx in 0..self.cols {
                if !self.is_inverted(bx, by) {
                    continue;
                }
                let x0 = bx * BLOCK_SIZE;
                let y0 = by * BLOCK_SIZE;
                let x1 = (x0 + BLOCK_SIZE).min(w);
                let y1 = (y0 + BLOCK_SIZE).min(h);
                for y in y0..y1 {
                    for x in x0..x1 {
                        let v = binary.get(x as i32, y as i32);
                        binary.set(x, y, !v);
                    }
                }
                let mut line = |xs: std::ops::Range<u32>, ys: std::ops::Range<u32>| {
                    for y in ys {
                        for x in xs.clone() {
                            binary.set(x, y, true);
                            border.set(x, y, true);
                        }
                    }
                };
                if by > 0 && !self.is_inverted(bx, by - 1) {
                    line(x0..x1, y0..y0 + 1);
                }
                if by + 1 < self.rows && !self.is_inverted(bx, by + 1) {
                    line(x0..x1, y1 - 1..y1);
                }
                if bx > 0 && !self.is_inverted(bx - 1, by) {
                    line(x0..x0 + 1, y0..y1);
                }
                if bx + 1 < self.cols && !self.is_inverted(bx + 1, by) {
                    line(x1 - 1..x1, y0..y1);
                }
            }
        }
    }
}
