//! Score weights

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};

/// Constants of the alignment score
///
/// `score = base + black * b + white * w - sum(fp[i] * target_halo[i]) - sum(fn[i] * reference_halo[i])`
///
/// where `fp[i]` counts target-only ink at halo distance `i + 1` from the
/// reference ink and `fn[i]` reference-only ink at distance `i + 1` from the
/// target ink. The last penalty of each list is the hard penalty: basic
/// scoring charges it for every mismatch, refined scoring for mismatches
/// beyond the halo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Added to every score (default: 1000)
    pub base: f32,
    /// Reward per black match (default: 4)
    pub black: f32,
    /// Reward per white match (default: 4)
    pub white: f32,
    /// Penalties for target-only ink by halo distance (default: 1, 5, 12)
    pub target_halo: Vec<f32>,
    /// Penalties for reference-only ink by halo distance (default: 1, 4, 10)
    pub reference_halo: Vec<f32>,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: 1000.0,
            black: 4.0,
            white: 4.0,
            target_halo: vec![1.0, 5.0, 12.0],
            reference_halo: vec![1.0, 4.0, 10.0],
        }
    }
}

impl ScoreWeights {
    /// Hard penalty for target-only ink
    pub fn target_penalty(&self) -> f32 {
        self.target_halo.last().copied().unwrap_or(0.0)
    }

    /// Hard penalty for reference-only ink
    pub fn reference_penalty(&self) -> f32 {
        self.reference_halo.last().copied().unwrap_or(0.0)
    }

    /// Check the weights against the corpus halo depth
    ///
    /// Each penalty list must hold `halo_depth` non-negative values in
    /// non-decreasing order, so that graded penalties never exceed the hard
    /// one.
    pub fn validate(&self, halo_depth: usize) -> AlignResult<()> {
        if self.black < 0.0 || self.white < 0.0 {
            return Err(AlignError::InvalidParameters(format!(
                "match rewards must not be negative (black {}, white {})",
                self.black, self.white
            )));
        }
        for (name, list) in [("target_halo", &self.target_halo), ("reference_halo", &self.reference_halo)] {
            if list.len() != halo_depth {
                return Err(AlignError::InvalidParameters(format!(
                    "{name} has {} weights, halo depth is {halo_depth}",
                    list.len()
                )));
            }
            if list.iter().any(|w| *w < 0.0) || list.windows(2).any(|w| w[0] > w[1]) {
                return Err(AlignError::InvalidParameters(format!(
                    "{name} weights {list:?} must be non-negative and non-decreasing"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let w = ScoreWeights::default();
        assert!(w.validate(3).is_ok());
        assert!(w.validate(2).is_err());
        assert_eq!(w.target_penalty(), 12.0);
        assert_eq!(w.reference_penalty(), 10.0);
    }

    #[test]
    fn test_decreasing_rejected() {
        let w = ScoreWeights {
            target_halo: vec![5.0, 1.0, 12.0],
            ..Default::default()
        };
        assert!(w.validate(3).is_err());
        let w = ScoreWeights {
            black: -1.0,
            ..Default::default()
        };
        assert!(w.validate(3).is_err());
    }
}
