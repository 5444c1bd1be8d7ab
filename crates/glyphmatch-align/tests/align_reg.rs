//! Alignment regression test
//!
//! Builds a small two-font corpus from synthetic shapes and ranks targets
//! drawn with the same shapes, slightly shifted. A font without glyphs is
//! rejected when the corpus is assembled.
//!
//! Run with:
//! ```
//! cargo test -p glyphmatch-align --test align_reg
//! ```

use std::sync::Arc;

use glyphmatch_align::{AlignError, AlignOptions, AlignStage, Aligner, TargetRasters, Transformation};
use glyphmatch_corpus::{Corpus, CorpusError, CorpusParams, FontSpec, ReferenceGlyph};
use glyphmatch_morph::build_halo;
use glyphmatch_test::RegParams;
use image::{GrayImage, Luma};

/// 40 x 40 image with ink where `ink(x, y)` holds, offset by `(dx, dy)`
fn shape(dx: i32, dy: i32, ink: impl Fn(i32, i32) -> bool) -> GrayImage {
    GrayImage::from_fn(40, 40, |x, y| {
        if ink(x as i32 - dx, y as i32 - dy) {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

fn bar(x: i32, y: i32) -> bool {
    (6..34).contains(&x) && (18..22).contains(&y)
}

fn frame(x: i32, y: i32) -> bool {
    let outer = (6..34).contains(&x) && (6..34).contains(&y);
    let inner = (10..30).contains(&x) && (10..30).contains(&y);
    outer && !inner
}

fn cross(x: i32, y: i32) -> bool {
    let h = (6..34).contains(&x) && (18..22).contains(&y);
    let v = (18..22).contains(&x) && (6..34).contains(&y);
    h || v
}

fn reference(c: char, font: &str, image: &GrayImage) -> ReferenceGlyph {
    let mut rasters = TargetRasters::new(image, 32, 30, 3, 140).expect("rasters");
    let raster = rasters.target(Transformation::IDENTITY).expect("target").raster;
    ReferenceGlyph {
        character: c,
        font: font.into(),
        pixels: raster.count_ones(),
        halo: build_halo(&raster, 2).expect("halo"),
        raster,
        score_modifier: 1.0,
    }
}

fn params() -> CorpusParams {
    CorpusParams::default()
        .with_fonts(vec![FontSpec::new("A", "a.ttf"), FontSpec::new("B", "b.ttf")])
        .with_characters("一口十")
}

fn units(second_font_empty: bool) -> Vec<(String, Vec<ReferenceGlyph>)> {
    let shapes: [(char, fn(i32, i32) -> bool); 3] = [('一', bar), ('口', frame), ('十', cross)];
    ["A", "B"]
        .iter()
        .map(|font| {
            let glyphs = if second_font_empty && *font == "B" {
                Vec::new()
            } else {
                shapes.iter().map(|(c, f)| reference(*c, font, &shape(0, 0, f))).collect()
            };
            (font.to_string(), glyphs)
        })
        .collect()
}

fn corpus() -> Arc<Corpus> {
    Arc::new(Corpus::new(&params(), units(false)).expect("corpus"))
}

#[test]
fn align_rank_reg() {
    let mut rp = RegParams::new("align_rank");
    let aligner = Aligner::new(corpus(), AlignOptions::default()).expect("aligner");

    let results = aligner.rank_gray(&shape(0, 0, cross), None).expect("rank");
    rp.compare_values(3.0, results.len() as f64, 0.0);
    rp.compare_values('十' as u32 as f64, results[0].character as u32 as f64, 0.0);
    rp.compare_strings(b"A", results[0].font.as_bytes());
    rp.compare_values(0.0, results[0].false_positives() as f64, 0.0);
    rp.compare_values(0.0, results[0].false_negatives() as f64, 0.0);
    rp.compare_values(1000.0 + 4.0 * 1024.0, results[0].score as f64, 0.0);
    rp.compare_values(1.0, results[0].refined as u8 as f64, 0.0);
    for pair in results.windows(2) {
        rp.compare_values(1.0, (pair[0].score >= pair[1].score) as u8 as f64, 0.0);
    }

    let results = aligner.rank_gray(&shape(2, -1, frame), None).expect("rank");
    rp.compare_values('口' as u32 as f64, results[0].character as u32 as f64, 0.0);

    let only: std::collections::HashSet<char> = ['一', '口'].into_iter().collect();
    let results = aligner.rank_gray(&shape(0, 0, cross), Some(&only)).expect("rank");
    rp.compare_values(2.0, results.len() as f64, 0.0);
    rp.compare_values(1.0, results.iter().all(|r| r.character != '十') as u8 as f64, 0.0);

    assert!(rp.cleanup(), "align_rank regression test failed");
}

#[test]
fn align_refined_stage_reg() {
    let mut rp = RegParams::new("align_refined");
    let basic = AlignStage {
        refined: false,
        all_fonts: true,
        ..AlignStage::fine()
    };
    let refined = AlignStage::fine();

    let target = shape(1, 0, bar);
    let basic_aligner = Aligner::new(corpus(), AlignOptions::default().with_stages(vec![basic])).expect("aligner");
    let refined_aligner =
        Aligner::new(corpus(), AlignOptions::default().with_stages(vec![refined])).expect("aligner");
    let b = basic_aligner.rank_gray(&target, None).expect("basic");
    let r = refined_aligner.rank_gray(&target, None).expect("refined");
    for c in ['一', '口', '十'] {
        let bs = b.iter().find(|x| x.character == c).map(|x| x.score).unwrap_or(i32::MIN);
        let rs = r.iter().find(|x| x.character == c).map(|x| x.score).unwrap_or(i32::MIN);
        rp.compare_values(1.0, (rs >= bs) as u8 as f64, 0.0);
    }

    assert!(rp.cleanup(), "align_refined regression test failed");
}

#[test]
fn align_missing_font_reg() {
    let mut rp = RegParams::new("align_missing");
    // a font without glyphs never reaches the aligner
    let missing = match Corpus::new(&params(), units(true)) {
        Err(CorpusError::CacheMissing { font, .. }) => font == "B",
        _ => false,
    };
    rp.compare_values(1.0, missing as u8 as f64, 0.0);

    let aligner = Aligner::new(corpus(), AlignOptions::default()).expect("aligner");
    let blank = GrayImage::from_pixel(10, 10, Luma([255]));
    let blank_err = matches!(aligner.rank_gray(&blank, None), Err(AlignError::BlankTarget));
    rp.compare_values(1.0, blank_err as u8 as f64, 0.0);

    assert!(rp.cleanup(), "align_missing regression test failed");
}
