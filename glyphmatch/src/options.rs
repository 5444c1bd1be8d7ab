//! Recognizer options

use std::path::PathBuf;

use glyphmatch_align::AlignOptions;
use glyphmatch_area::AreaOptions;
use glyphmatch_corpus::CorpusParams;
use glyphmatch_sched::SchedulerOptions;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options of every subsystem plus storage locations
///
/// Deserializable from any serde format; fields left out keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerOptions {
    /// Segmentation
    pub area: AreaOptions,
    /// Reference corpus
    pub corpus: CorpusParams,
    /// Alignment
    pub align: AlignOptions,
    /// Worker pool
    pub scheduler: SchedulerOptions,
    /// Required normalized gap between the two best scores (default: 0.04)
    pub dominance_margin: f32,
    /// Writable corpus cache (default: the user cache directory)
    pub cache_dir: Option<PathBuf>,
    /// Read-only directory of shipped corpus units
    pub bundled_dir: Option<PathBuf>,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            area: AreaOptions::default(),
            corpus: CorpusParams::default(),
            align: AlignOptions::default(),
            scheduler: SchedulerOptions::default(),
            dominance_margin: 0.04,
            cache_dir: None,
            bundled_dir: None,
        }
    }
}

impl RecognizerOptions {
    /// Set the segmentation options
    pub fn with_area(mut self, area: AreaOptions) -> Self {
        self.area = area;
        self
    }

    /// Set the corpus parameters
    pub fn with_corpus(mut self, corpus: CorpusParams) -> Self {
        self.corpus = corpus;
        self
    }

    /// Set the alignment options
    pub fn with_align(mut self, align: AlignOptions) -> Self {
        self.align = align;
        self
    }

    /// Set the worker pool options
    pub fn with_scheduler(mut self, scheduler: SchedulerOptions) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the corpus cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the directory of shipped corpus units
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    /// Check every subsystem's options and their consistency
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let config = |e: &dyn std::fmt::Display| Error::Configuration(e.to_string());
        self.area.validate().map_err(|e| config(&e))?;
        self.corpus.validate().map_err(|e| config(&e))?;
        self.align
            .validate(self.corpus.raster_size, self.corpus.halo_depth)
            .map_err(|e| config(&e))?;
        self.scheduler.validate().map_err(|e| config(&e))?;
        if self.align.target_size != self.corpus.target_size {
            return Err(Error::Configuration(format!(
                "alignment target size {} differs from corpus target size {}",
                self.align.target_size, self.corpus.target_size
            )));
        }
        if !(0.0..1.0).contains(&self.dominance_margin) {
            return Err(Error::Configuration(format!(
                "dominance margin {} must be in 0..1",
                self.dominance_margin
            )));
        }
        Ok(())
    }
}
