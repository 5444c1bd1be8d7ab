//! Halo regression test
//!
//! Builds halos around a synthetic stroke pattern and checks ring sizes.
//!
//! Run with:
//! ```
//! cargo test -p glyphmatch-morph --test halo_reg
//! ```

use glyphmatch_morph::{Sel, build_halo, dilate};
use glyphmatch_test::{RegParams, raster_from_ascii};

#[test]
fn halo_reg() {
    let mut rp = RegParams::new("halo");

    let raster = raster_from_ascii(&[
        "........",
        "........",
        "..xxxx..",
        "........",
        "........",
        "........",
        "........",
        "........",
    ]);

    let halo = build_halo(&raster, 2).expect("halo");
    // 4x1 stroke: first ring 6x3 minus 4, second ring 8x5 minus 6x3
    rp.compare_values(14.0, halo.get(0).unwrap().count_ones() as f64, 0.0);
    rp.compare_values(22.0, halo.get(1).unwrap().count_ones() as f64, 0.0);

    // union of base and rings equals two dilation steps
    let sel = Sel::create_square(3).unwrap();
    let twice = dilate(&dilate(&raster, &sel).unwrap(), &sel).unwrap();
    let union = raster
        .or(halo.get(0).unwrap())
        .and_then(|u| u.or(halo.get(1).unwrap()))
        .unwrap();
    rp.compare_rasters(&twice, &union);

    // a stroke on the edge loses the clipped part of its rings
    let edge = raster_from_ascii(&["xx..", "....", "....", "...."]);
    let edge_halo = build_halo(&edge, 1).unwrap();
    rp.compare_values(4.0, edge_halo.get(0).unwrap().count_ones() as f64, 0.0);

    assert!(rp.cleanup(), "halo regression test failed");
}
