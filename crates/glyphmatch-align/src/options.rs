//! Alignment options

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};
use crate::weights::ScoreWeights;

/// One pass of the staged alignment
///
/// The first stage compares against every character; each later stage only
/// against the characters the previous stage kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignStage {
    /// Grade mismatches by halo distance
    pub refined: bool,
    /// Compare against every font, not only the primary one
    pub all_fonts: bool,
    /// Maximum translation per axis, in pixels
    pub max_translate: u32,
    /// Maximum stretch per axis, in pixels
    pub max_stretch: u32,
    /// Maximum translation and stretch steps in total
    pub max_steps: u32,
    /// Results passed on (or returned, for the last stage)
    pub keep: usize,
}

impl AlignStage {
    /// Basic scoring of the primary font over a narrow window
    pub fn coarse() -> Self {
        Self {
            refined: false,
            all_fonts: false,
            max_translate: 1,
            max_stretch: 1,
            max_steps: 1,
            keep: 30,
        }
    }

    /// Refined scoring of every font over a wider window
    pub fn fine() -> Self {
        Self {
            refined: true,
            all_fonts: true,
            max_translate: 2,
            max_stretch: 2,
            max_steps: 4,
            keep: 10,
        }
    }
}

/// Options for [`Aligner`](crate::Aligner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOptions {
    /// Score constants
    pub weights: ScoreWeights,
    /// Stages, run in order (default: coarse then fine)
    pub stages: Vec<AlignStage>,
    /// Size targets are stretched to inside the raster (default: 30)
    pub target_size: u32,
    /// Grey level below which a target pixel is ink (default: 140)
    pub pixel_threshold: u8,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            stages: vec![AlignStage::coarse(), AlignStage::fine()],
            target_size: 30,
            pixel_threshold: 140,
        }
    }
}

impl AlignOptions {
    /// Set the score constants
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the stages
    pub fn with_stages(mut self, stages: Vec<AlignStage>) -> Self {
        self.stages = stages;
        self
    }

    /// Set the target size
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Check the options against a corpus' raster size and halo depth
    pub fn validate(&self, raster_size: u32, halo_depth: usize) -> AlignResult<()> {
        self.weights.validate(halo_depth)?;
        if self.target_size < 4 || self.target_size > raster_size {
            return Err(AlignError::InvalidParameters(format!(
                "target_size {} must be in 4..={raster_size}",
                self.target_size
            )));
        }
        if self.stages.is_empty() {
            return Err(AlignError::InvalidParameters("at least one stage is required".into()));
        }
        if let Some((i, _)) = self.stages.iter().enumerate().find(|(_, s)| s.keep == 0) {
            return Err(AlignError::InvalidParameters(format!("stage {} keeps no results", i + 1)));
        }
        Ok(())
    }

    /// Results returned by the last stage
    pub fn result_count(&self) -> usize {
        self.stages.last().map(|s| s.keep).unwrap_or(0)
    }
}
