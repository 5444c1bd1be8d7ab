//! Connected component regression test
//!
//! Labels a synthetic page and splits a multi-stroke glyph raster.
//!
//! Run with:
//! ```
//! cargo test -p glyphmatch-region --test conncomp_reg
//! ```

use glyphmatch_core::{BinaryImage, PixelSource, Rect};
use glyphmatch_region::{ConnectivityType, find_connected_components, split_components};
use glyphmatch_test::{RegParams, SyntheticPage, raster_from_ascii};

#[test]
fn conncomp_reg() {
    let mut rp = RegParams::new("conncomp");

    let mut page = SyntheticPage::new(80, 40);
    page.fill(Rect::new(5, 5, 10, 10))
        .fill(Rect::new(30, 5, 10, 10))
        .fill(Rect::new(55, 5, 3, 3))
        .fill(Rect::new(58, 8, 3, 3));
    let img = page.into_image();
    let mask = BinaryImage::from_fn(img.width(), img.height(), |x, y| {
        img.pixel(x, y).min_channel() < 140
    })
    .unwrap();

    let eight = find_connected_components(&mask, ConnectivityType::EightWay).unwrap();
    let four = find_connected_components(&mask, ConnectivityType::FourWay).unwrap();
    // the two small squares touch only at a corner
    rp.compare_values(3.0, eight.len() as f64, 0.0);
    rp.compare_values(4.0, four.len() as f64, 0.0);
    rp.compare_values(100.0, eight[0].pixel_count as f64, 0.0);
    rp.compare_values(18.0, eight[2].pixel_count as f64, 0.0);

    // 二-like raster: two horizontal strokes
    let raster = raster_from_ascii(&[
        "........",
        ".xxxxxx.",
        "........",
        "........",
        "........",
        "xxxxxxxx",
        "........",
        "........",
    ]);
    let parts = split_components(&raster).unwrap();
    rp.compare_values(2.0, parts.len() as f64, 0.0);
    rp.compare_values(6.0, parts[0].pixel_count as f64, 0.0);
    rp.compare_values(8.0, parts[1].pixel_count as f64, 0.0);

    assert!(rp.cleanup(), "conncomp regression test failed");
}
