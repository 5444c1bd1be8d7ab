//! Alignment scoring of one target raster against one reference glyph

use glyphmatch_corpus::ReferenceGlyph;
use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};
use crate::transform::{TargetGlyph, Transformation};
use crate::weights::ScoreWeights;

/// Outcome of one target/reference comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Reference character
    pub character: char,
    /// Reference font
    pub font: String,
    /// Registration index of the font in the corpus
    pub font_index: usize,
    /// Transformation of the target that produced this result
    pub transformation: Transformation,
    /// Cells with ink in both rasters
    pub black: u32,
    /// Cells with ink in neither raster
    pub white: u32,
    /// Target-only ink per halo distance; the last entry holds everything
    /// charged the hard penalty
    pub target_halo: Vec<u32>,
    /// Reference-only ink per halo distance, like `target_halo`
    pub reference_halo: Vec<u32>,
    /// Score before the reference's modifier
    pub raw_score: i32,
    /// Final score
    pub score: i32,
    /// Reference score modifier
    pub score_modifier: f32,
    /// True if mismatches were graded by halo distance
    pub refined: bool,
}

impl AlignmentResult {
    /// Target-only ink cells
    pub fn false_positives(&self) -> u32 {
        self.target_halo.iter().sum()
    }

    /// Reference-only ink cells
    pub fn false_negatives(&self) -> u32 {
        self.reference_halo.iter().sum()
    }
}

/// Score `target` against `reference`
///
/// Basic scoring charges every mismatch the hard penalty. Refined scoring
/// charges a target-only cell in reference halo ring `i` the penalty
/// `target_halo[i]` (and a reference-only cell in target ring `i` the
/// penalty `reference_halo[i]`); cells outside the halo get the hard
/// penalty. Positive raw scores are multiplied by the reference's score
/// modifier and truncated.
///
/// # Errors
///
/// Returns an error if raster sizes differ or a halo is shallower than the
/// weights require.
pub fn score_pair(
    target: &TargetGlyph,
    reference: &ReferenceGlyph,
    font_index: usize,
    weights: &ScoreWeights,
    refined: bool,
) -> AlignResult<AlignmentResult> {
    let depth = weights.target_halo.len().max(1);
    let size = target.raster.size();
    if reference.size() != size {
        return Err(AlignError::RasterMismatch {
            target: format!("{size}x{size}"),
            reference: format!("{0}x{0} ('{1}')", reference.size(), reference.character),
        });
    }

    let black = target.raster.count_common(&reference.raster)?;
    let false_pos = target.pixels.saturating_sub(black);
    let false_neg = reference.raster.count_ones().saturating_sub(black);
    let white = (size * size).saturating_sub(black + false_pos + false_neg);

    let mut target_halo = vec![0u32; depth];
    let mut reference_halo = vec![0u32; depth];
    if refined {
        let rings = depth - 1;
        if reference.halo.len() < rings || target.halo.len() < rings {
            return Err(AlignError::RasterMismatch {
                target: format!("{} halo layers", target.halo.len()),
                reference: format!("{} halo layers ('{}')", reference.halo.len(), reference.character),
            });
        }
        let mut fp_left = false_pos;
        let mut fn_left = false_neg;
        for i in 0..rings {
            let fp = target.raster.count_common(&reference.halo.layers()[i])?;
            let fn_ = reference.raster.count_common(&target.halo.layers()[i])?;
            target_halo[i] = fp;
            reference_halo[i] = fn_;
            fp_left = fp_left.saturating_sub(fp);
            fn_left = fn_left.saturating_sub(fn_);
        }
        target_halo[rings] = fp_left;
        reference_halo[rings] = fn_left;
    } else {
        target_halo[depth - 1] = false_pos;
        reference_halo[depth - 1] = false_neg;
    }

    let reward = (weights.base + black as f32 * weights.black + white as f32 * weights.white).floor() as i64;
    let raw = reward - penalty(&target_halo, &weights.target_halo) - penalty(&reference_halo, &weights.reference_halo);
    let raw_score = raw.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    let score = if raw_score > 1 {
        (raw_score as f32 * reference.score_modifier) as i32
    } else {
        raw_score
    };

    Ok(AlignmentResult {
        character: reference.character,
        font: reference.font.clone(),
        font_index,
        transformation: target.transformation,
        black,
        white,
        target_halo,
        reference_halo,
        raw_score,
        score,
        score_modifier: reference.score_modifier,
        refined,
    })
}

/// Weighted mismatch count of one side, rounded up once
///
/// Rounding the sum rather than each ring keeps graded charges at or below
/// the hard charge for fractional weights.
fn penalty(counts: &[u32], weights: &[f32]) -> i64 {
    let total: f64 = counts.iter().zip(weights).map(|(c, w)| *c as f64 * *w as f64).sum();
    total.ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphmatch_core::BitRaster;
    use glyphmatch_morph::build_halo;
    use glyphmatch_test::raster_from_ascii;

    pub(crate) fn reference(c: char, raster: BitRaster, modifier: f32) -> ReferenceGlyph {
        ReferenceGlyph {
            character: c,
            font: "Test".into(),
            pixels: raster.count_ones(),
            halo: build_halo(&raster, 2).unwrap(),
            raster,
            score_modifier: modifier,
        }
    }

    fn pattern(seed: u64, size: u32) -> BitRaster {
        let mut state = seed;
        BitRaster::from_fn(size, |_, _| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % 3 == 0
        })
        .unwrap()
    }

    #[test]
    fn test_self_similarity() {
        let r = pattern(7, 16);
        let target = TargetGlyph::from_raster(r.clone(), 3).unwrap();
        let w = ScoreWeights::default();
        for refined in [false, true] {
            let res = score_pair(&target, &reference('a', r.clone(), 1.0), 0, &w, refined).unwrap();
            assert_eq!(res.false_positives(), 0);
            assert_eq!(res.false_negatives(), 0);
            assert_eq!(res.black + res.white, 256);
            let expected = 1000 + 4 * 256;
            assert_eq!(res.raw_score, expected);
            assert_eq!(res.score, expected);
        }
    }

    #[test]
    fn test_basic_counts() {
        let t = raster_from_ascii(&["xx..", "xx..", "....", "...."]);
        let r = raster_from_ascii(&[".x..", ".xx.", "....", "...."]);
        let target = TargetGlyph::from_raster(t, 3).unwrap();
        let res = score_pair(&target, &reference('b', r, 1.0), 0, &ScoreWeights::default(), false).unwrap();
        assert_eq!(res.black, 2);
        assert_eq!(res.false_positives(), 2);
        assert_eq!(res.false_negatives(), 1);
        assert_eq!(res.white, 11);
        assert_eq!(res.target_halo, vec![0, 0, 2]);
        // 1000 + 8 + 44 - 24 - 10
        assert_eq!(res.raw_score, 1018);
    }

    #[test]
    fn test_refined_grades_near_misses() {
        let t = raster_from_ascii(&["xx..", "xx..", "....", "...."]);
        let r = raster_from_ascii(&[".x..", ".xx.", "....", "...."]);
        let target = TargetGlyph::from_raster(t, 3).unwrap();
        let res = score_pair(&target, &reference('b', r, 1.0), 0, &ScoreWeights::default(), true).unwrap();
        // both target-only cells touch reference ink, and so does the reference-only one
        assert_eq!(res.target_halo, vec![2, 0, 0]);
        assert_eq!(res.reference_halo, vec![1, 0, 0]);
        assert_eq!(res.raw_score, 1000 + 8 + 44 - 2 - 1);
    }

    #[test]
    fn test_refined_never_below_basic() {
        let w = ScoreWeights::default();
        for seed in 0..20u64 {
            let target = TargetGlyph::from_raster(pattern(seed, 32), 3).unwrap();
            let r = reference('c', pattern(seed + 100, 32), 1.0);
            let basic = score_pair(&target, &r, 0, &w, false).unwrap();
            let refined = score_pair(&target, &r, 0, &w, true).unwrap();
            assert!(refined.score >= basic.score, "seed {seed}: {} < {}", refined.score, basic.score);
            assert_eq!(refined.false_positives(), basic.false_positives());
            assert_eq!(refined.false_negatives(), basic.false_negatives());
        }
    }

    #[test]
    fn test_refined_never_below_basic_fractional_weights() {
        let w = ScoreWeights {
            target_halo: vec![0.5, 0.5, 0.5],
            reference_halo: vec![0.5, 0.5, 0.5],
            ..Default::default()
        };
        assert!(w.validate(3).is_ok());

        // one target-only cell in each ring and one beyond the halo
        let r = BitRaster::from_fn(16, |x, y| (x, y) == (8, 8)).unwrap();
        let t = BitRaster::from_fn(16, |x, y| y == 8 && matches!(x, 9 | 10 | 14)).unwrap();
        let target = TargetGlyph::from_raster(t, 3).unwrap();
        let single = reference('f', r, 1.0);
        let basic = score_pair(&target, &single, 0, &w, false).unwrap();
        let refined = score_pair(&target, &single, 0, &w, true).unwrap();
        assert_eq!(basic.target_halo, vec![0, 0, 3]);
        assert_eq!(refined.target_halo, vec![1, 1, 1]);
        assert_eq!(basic.raw_score, refined.raw_score);

        for seed in 0..20u64 {
            let target = TargetGlyph::from_raster(pattern(seed, 32), 3).unwrap();
            let r = reference('g', pattern(seed + 200, 32), 1.0);
            let basic = score_pair(&target, &r, 0, &w, false).unwrap();
            let refined = score_pair(&target, &r, 0, &w, true).unwrap();
            assert!(refined.score >= basic.score, "seed {seed}: {} < {}", refined.score, basic.score);
        }
    }

    #[test]
    fn test_modifier_applies_to_positive_scores() {
        let r = pattern(3, 16);
        let target = TargetGlyph::from_raster(r.clone(), 3).unwrap();
        let res = score_pair(&target, &reference('d', r, 0.5), 0, &ScoreWeights::default(), false).unwrap();
        assert_eq!(res.score, res.raw_score / 2);
    }

    #[test]
    fn test_size_mismatch() {
        let target = TargetGlyph::from_raster(pattern(1, 16), 3).unwrap();
        let r = reference('e', pattern(1, 8), 1.0);
        assert!(matches!(
            score_pair(&target, &r, 0, &ScoreWeights::default(), false),
            Err(AlignError::RasterMismatch { .. })
        ));
    }
}
