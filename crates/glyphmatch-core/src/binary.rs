//! BinaryImage - Foreground mask of a whole image

use image::{GrayImage, Luma};

use crate::error::{CoreError, CoreResult};
use crate::geom::{Point, Rect};

/// Row-major boolean image; `true` is foreground (ink)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryImage {
    /// Create an all-background image
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        })
    }

    /// Create an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> CoreResult<Self> {
        let mut img = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    img.set(x, y, true);
                }
            }
        }
        Ok(img)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Image bounds as a rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Pixel value; false outside the image
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Pixel value at a point
    #[inline]
    pub fn get_point(&self, p: Point) -> bool {
        self.get(p.x, p.y)
    }

    /// Set a pixel; coordinates outside the image are ignored
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            self.data[y as usize * self.width as usize + x as usize] = value;
        }
    }

    /// Number of foreground pixels inside `rect`
    pub fn count_in(&self, rect: &Rect) -> u32 {
        let clip = rect.clip(self.width, self.height);
        if clip.is_empty() {
            return 0;
        }
        let mut count = 0;
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                if self.get(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Bounding box of foreground pixels inside `rect`, or [`Rect::EMPTY`]
    pub fn ink_bounds_in(&self, rect: &Rect) -> Rect {
        let clip = rect.clip(self.width, self.height);
        let mut bounds = Rect::EMPTY;
        if clip.is_empty() {
            return bounds;
        }
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                if self.get(x, y) {
                    bounds = bounds.union(&Rect::new(x, y, 1, 1));
                }
            }
        }
        bounds
    }

    /// Copy of the pixels inside `rect`; parts outside the image are background
    ///
    /// # Errors
    ///
    /// Returns an error if `rect` is empty.
    pub fn crop(&self, rect: &Rect) -> CoreResult<BinaryImage> {
        if rect.is_empty() {
            return Err(CoreError::InvalidDimension {
                width: rect.w.max(0) as u32,
                height: rect.h.max(0) as u32,
            });
        }
        BinaryImage::from_fn(rect.w as u32, rect.h as u32, |x, y| {
            self.get(rect.x + x as i32, rect.y + y as i32)
        })
    }

    /// Render as a grayscale image: ink black, background white
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.get(x as i32, y as i32) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    /// Number of foreground pixels
    pub fn count_ones(&self) -> u32 {
        self.data.iter().filter(|&&v| v).count() as u32
    }
}
