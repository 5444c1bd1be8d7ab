//! AreaDetector - segmentation pipeline and sub-image extraction

use std::time::Instant;

use glyphmatch_core::{BinaryImage, PixelSource, Point, Rect};
use tracing::debug;

use crate::area::Area;
use crate::areas::find_areas;
use crate::binarize::{Page, binarize};
use crate::column::Column;
use crate::columns::find_columns;
use crate::connections::find_connections;
use crate::error::{AreaError, AreaResult};
use crate::furigana::find_furigana;
use crate::options::{AreaOptions, Orientation};
use crate::orientation::merge_orientations;

/// A cropped character candidate
#[derive(Debug, Clone, PartialEq)]
pub struct SubImage {
    /// Binary pixels of the crop
    pub image: BinaryImage,
    /// Location of the crop in the target image
    pub location: Rect,
    /// Index of the column the crop belongs to, if any
    pub column: Option<usize>,
    /// Reading direction of that column
    pub vertical: bool,
}

/// Runs segmentation with fixed options
#[derive(Debug, Clone)]
pub struct AreaDetector {
    options: AreaOptions,
}

impl AreaDetector {
    /// Create a detector
    ///
    /// # Errors
    ///
    /// Returns [`AreaError::InvalidParameters`] if the options do not validate.
    pub fn new(options: AreaOptions) -> AreaResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Get the options
    pub fn options(&self) -> &AreaOptions {
        &self.options
    }

    /// Segment an image into columns of character areas
    pub fn detect<P: PixelSource + ?Sized>(&self, image: &P) -> AreaResult<Segmentation> {
        let started = Instant::now();
        let mut page = binarize(image, &self.options)?;
        let areas = find_areas(&mut page, &self.options)?;
        debug!(
            width = page.width(),
            height = page.height(),
            areas = areas.len(),
            "areas found"
        );

        let threshold = self.options.pixel_threshold;
        let build = |vertical: bool| {
            let mut columns = find_columns(&page, &areas, vertical, threshold);
            find_furigana(&page, &mut columns);
            find_connections(&page, &mut columns);
            columns
        };
        let columns = match self.options.orientation {
            Orientation::Vertical => build(true),
            Orientation::Horizontal => build(false),
            Orientation::Automatic => merge_orientations(build(true), build(false)),
        };

        debug!(
            columns = columns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "segmentation done"
        );
        Ok(Segmentation {
            page,
            columns,
            options: self.options.clone(),
        })
    }
}

/// Result of [`AreaDetector::detect`] for one image
#[derive(Debug, Clone)]
pub struct Segmentation {
    page: Page,
    columns: Vec<Column>,
    options: AreaOptions,
}

impl Segmentation {
    /// Detected columns; `previous`/`next`/`furigana_columns` index into this slice
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The binarized image
    pub fn binary(&self) -> &BinaryImage {
        &self.page.binary
    }

    /// Image width
    pub fn width(&self) -> u32 {
        self.page.width()
    }

    /// Image height
    pub fn height(&self) -> u32 {
        self.page.height()
    }

    /// Area nearest to `point`, as (column, area) indices
    ///
    /// Returns `None` if there are no areas or the nearest one is farther
    /// away than its larger dimension.
    pub fn area_near(&self, point: Point) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), i32, &Area)> = None;
        for (ci, col) in self.columns.iter().enumerate() {
            for (ai, area) in col.areas.iter().enumerate() {
                let distance = area.midpoint().distance(point) as i32;
                if best.is_none_or(|(_, d, _)| distance < d) {
                    best = Some(((ci, ai), distance, area));
                }
            }
        }
        let (found, distance, area) = best?;
        (distance <= area.max_dim()).then_some(found)
    }

    /// Characters starting at the area nearest to `point`
    ///
    /// Follows `next` links across columns until `max_characters` crops are
    /// collected, the chain ends, or it loops back to the first column.
    /// Empty when nothing is near the point.
    pub fn sub_images_near(&self, point: Point) -> AreaResult<Vec<SubImage>> {
        let Some((first_col, first_area)) = self.area_near(point) else {
            return Ok(Vec::new());
        };
        let max = self.options.max_characters;
        let mut picked: Vec<(usize, &Area)> = Vec::new();
        let mut col_idx = first_col;
        let mut skip = first_area;
        'chain: loop {
            let col = &self.columns[col_idx];
            for area in col.areas.iter().skip(skip) {
                picked.push((col_idx, area));
                if picked.len() == max {
                    break 'chain;
                }
            }
            skip = 0;
            match col.next {
                Some(next) if next != first_col => col_idx = next,
                _ => break,
            }
        }

        picked
            .into_iter()
            .map(|(ci, area)| {
                Ok(SubImage {
                    image: self.page.binary.crop(&area.rect)?,
                    location: area.rect,
                    column: Some(ci),
                    vertical: self.columns[ci].vertical,
                })
            })
            .collect()
    }

    /// Crops for caller-supplied rectangles, trimmed of empty borders
    ///
    /// # Errors
    ///
    /// Returns [`AreaError::InvalidParameters`] for an empty rectangle or one
    /// entirely outside the image.
    pub fn sub_images_for(&self, rects: &[Rect]) -> AreaResult<Vec<SubImage>> {
        rects
            .iter()
            .map(|rect| {
                if rect.clip(self.width(), self.height()).is_empty() {
                    return Err(AreaError::InvalidParameters(format!(
                        "rectangle {rect:?} does not overlap the {}x{} image",
                        self.width(),
                        self.height()
                    )));
                }
                let location = self.trim(rect);
                let column = self
                    .columns
                    .iter()
                    .position(|c| c.rect.contains_point(rect.midpoint()));
                let vertical = match column {
                    Some(ci) => self.columns[ci].vertical,
                    None => self.options.orientation != Orientation::Horizontal,
                };
                Ok(SubImage {
                    image: self.page.binary.crop(&location)?,
                    location,
                    column,
                    vertical,
                })
            })
            .collect()
    }

    /// Shrink `rect` past empty rows and columns, never past its midpoint
    fn trim(&self, rect: &Rect) -> Rect {
        let img = &self.page.binary;
        let mid = rect.midpoint();
        let (mut x0, mut x1) = (rect.x, rect.right() - 1);
        let (mut y0, mut y1) = (rect.y, rect.bottom() - 1);
        let col_empty = |x: i32| img.count_in(&Rect::new(x, rect.y, 1, rect.h)) == 0;
        let row_empty = |y: i32| img.count_in(&Rect::new(rect.x, y, rect.w, 1)) == 0;
        while x0 < mid.x && col_empty(x0) {
            x0 += 1;
        }
        while x1 > mid.x && col_empty(x1) {
            x1 -= 1;
        }
        while y0 < mid.y && row_empty(y0) {
            y0 += 1;
        }
        while y1 > mid.y && row_empty(y1) {
            y1 -= 1;
        }
        Rect::from_corners(x0, y0, x1, y1)
    }
}
