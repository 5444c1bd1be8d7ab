//! Connected component analysis
//!
//! Two-pass labeling with a union-find (disjoint set) table. Components are
//! reported in raster order of their first (top-most, then left-most)
//! pixel, which keeps results deterministic.

use glyphmatch_core::{BinaryImage, Point, Rect};

use crate::error::RegionResult;

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    FourWay,
    /// 8-way connectivity (includes diagonals)
    #[default]
    EightWay,
}

/// A connected component in an image
#[derive(Debug, Clone)]
pub struct ConnectedComponent {
    /// Label, 1-based, in raster order
    pub label: u32,
    /// Number of pixels in this component
    pub pixel_count: u32,
    /// Bounding box of this component
    pub bounds: Rect,
    /// Member pixels in raster order
    pub pixels: Vec<Point>,
}

/// Per-pixel component labels; 0 is background
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    count: u32,
}

impl ComponentLabels {
    /// Label at `(x, y)`; 0 for background or outside the image
    pub fn get(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Number of components
    pub fn count(&self) -> u32 {
        self.count
    }
}

struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        // slot 0 is background
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        while self.parent[x as usize] != root {
            let next = self.parent[x as usize];
            self.parent[x as usize] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }
}

/// Label all connected components in a binary image
pub fn label_connected_components(
    image: &BinaryImage,
    connectivity: ConnectivityType,
) -> RegionResult<ComponentLabels> {
    let w = image.width() as usize;
    let h = image.height() as usize;
    let mut provisional = vec![0u32; w * h];
    let mut sets = UnionFind::new();

    // already-visited neighbours: left, up, and for 8-way the two upper diagonals
    let neighbours: &[(i32, i32)] = match connectivity {
        ConnectivityType::FourWay => &[(-1, 0), (0, -1)],
        ConnectivityType::EightWay => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
    };

    for y in 0..h {
        for x in 0..w {
            if !image.get(x as i32, y as i32) {
                continue;
            }
            let mut label = 0;
            for &(dx, dy) in neighbours {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= w as i32 {
                    continue;
                }
                let n = provisional[ny as usize * w + nx as usize];
                if n == 0 {
                    continue;
                }
                if label == 0 {
                    label = n;
                } else if n != label {
                    sets.union(label, n);
                }
            }
            if label == 0 {
                label = sets.make_set();
            }
            provisional[y * w + x] = label;
        }
    }

    // second pass: resolve roots and renumber in raster order
    let mut renumber = vec![0u32; sets.parent.len()];
    let mut count = 0;
    for slot in provisional.iter_mut() {
        if *slot == 0 {
            continue;
        }
        let root = sets.find(*slot);
        if renumber[root as usize] == 0 {
            count += 1;
            renumber[root as usize] = count;
        }
        *slot = renumber[root as usize];
    }

    Ok(ComponentLabels {
        width: image.width(),
        height: image.height(),
        labels: provisional,
        count,
    })
}

/// Find all connected components in a binary image
///
/// Returns each component with its label, pixel count, bounding box and
/// member pixels.
pub fn find_connected_components(
    image: &BinaryImage,
    connectivity: ConnectivityType,
) -> RegionResult<Vec<ConnectedComponent>> {
    let labels = label_connected_components(image, connectivity)?;
    let mut components: Vec<ConnectedComponent> = (1..=labels.count())
        .map(|label| ConnectedComponent {
            label,
            pixel_count: 0,
            bounds: Rect::EMPTY,
            pixels: Vec::new(),
        })
        .collect();

    for y in 0..image.height() as i32 {
        for x in 0..image.width() as i32 {
            let label = labels.get(x, y);
            if label == 0 {
                continue;
            }
            let c = &mut components[label as usize - 1];
            c.pixel_count += 1;
            c.bounds = c.bounds.union(&Rect::new(x, y, 1, 1));
            c.pixels.push(Point::new(x, y));
        }
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(rows: &[&str]) -> BinaryImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        BinaryImage::from_fn(w, h, |x, y| rows[y as usize].as_bytes()[x as usize] == b'x').unwrap()
    }

    #[test]
    fn test_diagonal_connectivity() {
        let img = image(&["x...", ".x..", "...x"]);
        let eight = find_connected_components(&img, ConnectivityType::EightWay).unwrap();
        assert_eq!(eight.len(), 2);
        assert_eq!(eight[0].pixel_count, 2);
        assert_eq!(eight[0].bounds, Rect::new(0, 0, 2, 2));

        let four = find_connected_components(&img, ConnectivityType::FourWay).unwrap();
        assert_eq!(four.len(), 3);
    }

    #[test]
    fn test_u_shape_merges() {
        // the two arms meet only on the bottom row
        let img = image(&["x.x", "x.x", "xxx"]);
        let comps = find_connected_components(&img, ConnectivityType::FourWay).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].pixel_count, 7);
    }

    #[test]
    fn test_anti_diagonal_merge() {
        let img = image(&["..x", ".x.", "x.."]);
        let comps = find_connected_components(&img, ConnectivityType::EightWay).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].pixels[0], Point::new(2, 0));
    }

    #[test]
    fn test_labels_raster_order() {
        let img = image(&["..x.", "x...", "...."]);
        let labels = label_connected_components(&img, ConnectivityType::EightWay).unwrap();
        assert_eq!(labels.count(), 2);
        assert_eq!(labels.get(2, 0), 1);
        assert_eq!(labels.get(0, 1), 2);
        assert_eq!(labels.get(9, 9), 0);
    }
}
