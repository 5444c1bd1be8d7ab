//! glyphmatch-test - Regression test framework for glyphmatch
//!
//! Supports three modes, selected with the `REGTEST_MODE` environment
//! variable:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files (default)
//! - **Display**: Run tests without comparison
//!
//! # Usage
//!
//! ```ignore
//! use glyphmatch_test::RegParams;
//!
//! let mut rp = RegParams::new("segment");
//! rp.compare_values(2.0, columns.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! Besides the harness it provides synthetic page images and raster
//! helpers, and locates the optional real-world fixtures (screenshots and
//! fonts) under `tests/data/`.

mod error;
mod params;
pub mod synth;

use std::path::{Path, PathBuf};

use glyphmatch_core::BitRaster;
use image::DynamicImage;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
pub use synth::SyntheticPage;

/// Get the path to the workspace root
fn workspace_root() -> PathBuf {
    // glyphmatch-test is at crates/glyphmatch-test
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> PathBuf {
    workspace_root().join("tests/data").join(name)
}

/// Directory holding reference fonts for fixture tests
pub fn fonts_dir() -> PathBuf {
    test_data_path("fonts")
}

/// Get the path to the golden files directory
pub fn golden_dir() -> PathBuf {
    workspace_root().join("tests/golden")
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> PathBuf {
    workspace_root().join("tests/regout")
}

/// Returns the fixture path if the file exists
///
/// Fixture-driven tests call this first and return early on `None`, so a
/// checkout without the binary fixtures still passes.
pub fn fixture(name: &str) -> Option<PathBuf> {
    let path = test_data_path(name);
    if path.is_file() {
        Some(path)
    } else {
        eprintln!("fixture {} not present, skipping", path.display());
        None
    }
}

/// Font files (`.ttf`, `.otf`, `.ttc`) found in [`fonts_dir`], sorted by name
pub fn fixture_fonts() -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(fonts_dir()) else {
        return Vec::new();
    };
    let mut fonts: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
        })
        .collect();
    fonts.sort();
    fonts
}

/// Load a test image from the test data directory
///
/// # Arguments
///
/// * `name` - Image filename (e.g., "1.jpg")
pub fn load_test_image(name: &str) -> TestResult<DynamicImage> {
    let path = test_data_path(name);
    if !path.is_file() {
        return Err(TestError::FixtureMissing {
            path: path.display().to_string(),
        });
    }
    image::open(&path).map_err(|e| TestError::ImageLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Build a square raster from rows of 'x' (ink) and '.' (blank)
///
/// # Panics
///
/// Panics if the rows are not square or use other characters.
pub fn raster_from_ascii(rows: &[&str]) -> BitRaster {
    let size = rows.len() as u32;
    let mut raster = BitRaster::new(size).expect("raster size");
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.chars().count() as u32, size, "row {y} is not {size} wide");
        for (x, c) in row.chars().enumerate() {
            match c {
                'x' => raster.set(x as u32, y as u32),
                '.' => {}
                other => panic!("unexpected character '{other}' in raster row {y}"),
            }
        }
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_from_ascii() {
        let r = raster_from_ascii(&["x.", ".x"]);
        assert!(r.get(0, 0));
        assert!(r.get(1, 1));
        assert_eq!(r.count_ones(), 2);
    }

    #[test]
    fn test_missing_fixture() {
        assert!(fixture("does-not-exist.png").is_none());
        assert!(matches!(
            load_test_image("does-not-exist.png"),
            Err(TestError::FixtureMissing { .. })
        ));
    }
}
