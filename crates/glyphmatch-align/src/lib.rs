//! glyphmatch-align - Alignment engine
//!
//! Scores a target glyph against the reference glyphs of a
//! [`Corpus`](glyphmatch_corpus::Corpus):
//!
//! * [`TargetRasters`] normalizes the cropped target once and derives
//!   rasters for a window of small translations and stretches
//! * [`score_pair`] classifies every cell as black match, white match,
//!   target-only or reference-only ink; refined scoring grades the
//!   mismatches by halo distance
//! * [`Aligner`] runs the configured stages, each keeping the best
//!   candidates of the previous one, and returns results best first
//!
//! Ranking is deterministic: score, then score modifier, then font
//! registration order, then code point.

mod aligner;
mod error;
mod options;
mod rank;
mod score;
mod transform;
mod weights;

pub use aligner::Aligner;
pub use error::{AlignError, AlignResult};
pub use options::{AlignOptions, AlignStage};
pub use rank::{TopResults, combine_results, compare_results};
pub use score::{AlignmentResult, score_pair};
pub use transform::{TargetGlyph, TargetRasters, Transformation};
pub use weights::ScoreWeights;
