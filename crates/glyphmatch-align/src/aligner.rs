//! Aligner - staged ranking of a target against the corpus

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use glyphmatch_core::BinaryImage;
use glyphmatch_corpus::{Corpus, CorpusError};
use image::GrayImage;

use crate::error::AlignResult;
use crate::options::{AlignOptions, AlignStage};
use crate::rank::{TopResults, combine_results};
use crate::score::{AlignmentResult, score_pair};
use crate::transform::{TargetGlyph, TargetRasters, Transformation};

/// Ranks target glyphs against a shared corpus
///
/// Holds no mutable state; one aligner serves any number of threads.
#[derive(Debug, Clone)]
pub struct Aligner {
    corpus: Arc<Corpus>,
    options: AlignOptions,
}

impl Aligner {
    /// Create an aligner after validating `options` against the corpus
    pub fn new(corpus: Arc<Corpus>, options: AlignOptions) -> AlignResult<Self> {
        options.validate(corpus.raster_size(), corpus.halo_depth())?;
        Ok(Self { corpus, options })
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn options(&self) -> &AlignOptions {
        &self.options
    }

    /// Prepare the transformed rasters of a grayscale target
    pub fn target_rasters(&self, image: &GrayImage) -> AlignResult<TargetRasters> {
        TargetRasters::new(
            image,
            self.corpus.raster_size(),
            self.options.target_size,
            self.corpus.halo_depth(),
            self.options.pixel_threshold,
        )
    }

    /// Rank a binary target against every character
    pub fn rank(&self, image: &BinaryImage) -> AlignResult<Vec<AlignmentResult>> {
        self.rank_gray(&image.to_gray(), None)
    }

    /// Rank a grayscale target, optionally only against `characters`
    ///
    /// Runs every configured stage and returns the last stage's results,
    /// best first.
    pub fn rank_gray(
        &self,
        image: &GrayImage,
        characters: Option<&HashSet<char>>,
    ) -> AlignResult<Vec<AlignmentResult>> {
        let started = Instant::now();
        let mut rasters = self.target_rasters(image)?;
        let mut allowed: Option<HashSet<char>> = characters.cloned();
        let mut results = Vec::new();
        for (i, stage) in self.options.stages.iter().enumerate() {
            results = self.run_stage(&mut rasters, stage, allowed.as_ref())?;
            tracing::trace!(
                "stage {}: {} results, best {:?}",
                i + 1,
                results.len(),
                results.first().map(|r| (r.character, r.score))
            );
            allowed = Some(results.iter().map(|r| r.character).collect());
        }
        tracing::debug!("alignment took {} ms", started.elapsed().as_millis());
        Ok(results)
    }

    /// Run one stage: score every allowed reference of the stage's fonts
    /// under every candidate transformation and keep the best
    pub fn run_stage(
        &self,
        rasters: &mut TargetRasters,
        stage: &AlignStage,
        characters: Option<&HashSet<char>>,
    ) -> AlignResult<Vec<AlignmentResult>> {
        let transformations =
            Transformation::candidates(stage.max_translate, stage.max_stretch, stage.max_steps, rasters.margin());
        let targets = rasters.targets(&transformations)?;

        let fonts: Vec<&str> = if stage.all_fonts {
            self.corpus.fonts().collect()
        } else {
            self.corpus.primary_font().into_iter().collect()
        };
        let mut combined: Option<Vec<AlignmentResult>> = None;
        for font in fonts {
            let found = self.align_font(&targets, font, stage, characters)?;
            combined = Some(match combined {
                Some(previous) => combine_results(previous, found, stage.keep),
                None => found,
            });
        }
        Ok(combined.unwrap_or_default())
    }

    fn align_font(
        &self,
        targets: &[TargetGlyph],
        font: &str,
        stage: &AlignStage,
        characters: Option<&HashSet<char>>,
    ) -> AlignResult<Vec<AlignmentResult>> {
        let glyphs = match self.corpus.glyphs(font) {
            Some(glyphs) if !glyphs.is_empty() => glyphs,
            _ => {
                return Err(CorpusError::CacheMissing {
                    font: font.to_string(),
                    key: self.corpus.key(font).unwrap_or_default().to_string(),
                }
                .into());
            }
        };
        let font_index = self.corpus.font_index(font).unwrap_or(0);
        let mut top = TopResults::new(stage.keep);
        for reference in glyphs {
            if characters.is_some_and(|set| !set.contains(&reference.character)) {
                continue;
            }
            let mut best: Option<AlignmentResult> = None;
            for target in targets {
                let result = score_pair(target, reference, font_index, &self.options.weights, stage.refined)?;
                if best.as_ref().is_none_or(|b| result.score > b.score) {
                    best = Some(result);
                }
            }
            if let Some(best) = best {
                top.push(best);
            }
        }
        Ok(top.into_vec())
    }
}
