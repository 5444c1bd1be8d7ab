//! Recognizer - owns the corpus, the current segmentation and the worker pool

use std::sync::{Arc, RwLock};
use std::time::Instant;

use glyphmatch_align::Aligner;
use glyphmatch_area::{AreaDetector, Column, Segmentation, SubImage};
use glyphmatch_core::{BinaryImage, PixelSource, Point, Rect};
use glyphmatch_corpus::{CorpusLoader, CorpusStore, FsStore, GlyphRenderer};
use glyphmatch_sched::Scheduler;

use crate::error::{Error, Result};
use crate::options::RecognizerOptions;
use crate::results::RecognitionResults;

/// Screenshot glyph recognizer
///
/// One instance holds one reference corpus, loaded on first use, and the
/// segmentation of the current target image. Setting a new target image
/// while a recognition on the same instance is still running is a caller
/// error.
pub struct Recognizer {
    options: RecognizerOptions,
    detector: AreaDetector,
    loader: CorpusLoader,
    aligner: RwLock<Option<Arc<Aligner>>>,
    segmentation: RwLock<Option<Arc<Segmentation>>>,
    scheduler: Scheduler,
}

impl Recognizer {
    /// Create a recognizer reading its corpus from the filesystem
    ///
    /// Uses `cache_dir` (or the user cache directory) and `bundled_dir`
    /// from the options. Starts the worker pool.
    pub fn new(options: RecognizerOptions) -> Result<Self> {
        let cache_dir = match &options.cache_dir {
            Some(dir) => dir.clone(),
            None => FsStore::default_cache_dir()?,
        };
        let mut store = FsStore::new(cache_dir);
        if let Some(dir) = &options.bundled_dir {
            store = store.with_bundled(dir);
        }
        Self::with_store(options, Arc::new(store))
    }

    /// Create a recognizer reading its corpus from `store`
    pub fn with_store(options: RecognizerOptions, store: Arc<dyn CorpusStore>) -> Result<Self> {
        options.validate()?;
        let detector = AreaDetector::new(options.area.clone())?;
        let loader = CorpusLoader::new(options.corpus.clone(), store)?;
        let scheduler = Scheduler::new(options.scheduler.clone())?;
        Ok(Self {
            options,
            detector,
            loader,
            aligner: RwLock::new(None),
            segmentation: RwLock::new(None),
            scheduler,
        })
    }

    pub fn options(&self) -> &RecognizerOptions {
        &self.options
    }

    /// Load the reference corpus
    ///
    /// Idempotent: later calls return immediately.
    ///
    /// # Errors
    ///
    /// Fails with [`CorpusError::CacheMissing`](glyphmatch_corpus::CorpusError::CacheMissing)
    /// if a unit has not been built and with
    /// [`CorpusError::CacheCorrupt`](glyphmatch_corpus::CorpusError::CacheCorrupt)
    /// if one cannot be decoded.
    pub fn load_corpus(&self) -> Result<()> {
        self.aligner().map(|_| ())
    }

    /// Render every font again, store the units and use the new corpus
    pub fn rebuild_corpus(&self, renderer: &dyn GlyphRenderer) -> Result<()> {
        let corpus = self.loader.rebuild(renderer)?;
        let aligner = Arc::new(Aligner::new(corpus, self.options.align.clone())?);
        *self.aligner.write().map_err(|_| Error::LockPoisoned)? = Some(aligner);
        Ok(())
    }

    pub fn is_corpus_loaded(&self) -> bool {
        self.aligner.read().is_ok_and(|a| a.is_some())
    }

    fn aligner(&self) -> Result<Arc<Aligner>> {
        if let Some(aligner) = self.aligner.read().map_err(|_| Error::LockPoisoned)?.as_ref() {
            return Ok(Arc::clone(aligner));
        }
        let mut slot = self.aligner.write().map_err(|_| Error::LockPoisoned)?;
        if let Some(aligner) = slot.as_ref() {
            return Ok(Arc::clone(aligner));
        }
        let corpus = self.loader.load()?;
        let aligner = Arc::new(Aligner::new(corpus, self.options.align.clone())?);
        *slot = Some(Arc::clone(&aligner));
        Ok(aligner)
    }

    /// Segment `image` and make it the current target
    ///
    /// Replaces the previous segmentation.
    pub fn set_target_image<P: PixelSource + ?Sized>(&self, image: &P) -> Result<()> {
        let started = Instant::now();
        let segmentation = self.detector.detect(image)?;
        tracing::info!(
            "segmented {}x{} image into {} columns in {} ms",
            segmentation.width(),
            segmentation.height(),
            segmentation.columns().len(),
            started.elapsed().as_millis()
        );
        *self.segmentation.write().map_err(|_| Error::LockPoisoned)? = Some(Arc::new(segmentation));
        Ok(())
    }

    /// Columns of the current target image
    pub fn columns(&self) -> Result<Vec<Column>> {
        Ok(self.segmentation()?.columns().to_vec())
    }

    fn segmentation(&self) -> Result<Arc<Segmentation>> {
        self.segmentation
            .read()
            .map_err(|_| Error::LockPoisoned)?
            .clone()
            .ok_or(Error::NoTargetImage)
    }

    /// Recognize the characters starting at the area nearest to `point`
    ///
    /// Returns `Ok(None)` when no area is near the point.
    ///
    /// # Errors
    ///
    /// * [`Error::NoTargetImage`] if no target image has been set
    /// * corpus errors from the implicit [`load_corpus`](Self::load_corpus)
    /// * [`SchedError::AllTasksFailed`](glyphmatch_sched::SchedError::AllTasksFailed)
    ///   if no position could be aligned
    pub fn run_near(&self, point: Point) -> Result<Option<RecognitionResults>> {
        let segmentation = self.segmentation()?;
        let sub_images = segmentation.sub_images_near(point)?;
        tracing::debug!("{} characters near ({}, {})", sub_images.len(), point.x, point.y);
        self.recognize(sub_images)
    }

    /// Recognize one character inside each of `rects`
    ///
    /// Segmentation is bypassed; the rectangles are only trimmed of empty
    /// borders. Returns `Ok(None)` for an empty list.
    pub fn run_on(&self, rects: &[Rect]) -> Result<Option<RecognitionResults>> {
        let segmentation = self.segmentation()?;
        let sub_images = segmentation.sub_images_for(rects)?;
        self.recognize(sub_images)
    }

    fn recognize(&self, sub_images: Vec<SubImage>) -> Result<Option<RecognitionResults>> {
        let Some(vertical) = sub_images.first().map(|s| s.vertical) else {
            return Ok(None);
        };
        let aligner = self.aligner()?;
        let started = Instant::now();
        let locations: Vec<Rect> = sub_images.iter().map(|s| s.location).collect();
        let images: Vec<BinaryImage> = sub_images.into_iter().map(|s| s.image).collect();

        let work = Arc::new(move |_: usize, image: BinaryImage| aligner.rank(&image));
        let outcomes = self.scheduler.submit(images, work)?.await_all()?;
        let results = RecognitionResults::from_outcomes(outcomes, locations, vertical);
        tracing::info!(
            "recognized '{}' in {} ms",
            results.best_match(),
            started.elapsed().as_millis()
        );
        Ok(Some(results))
    }

    /// Stop the worker pool
    ///
    /// Queued recognitions are discarded and running ones get the
    /// configured shutdown timeout. Later runs fail with
    /// [`SchedError::Stopped`](glyphmatch_sched::SchedError::Stopped).
    pub fn shutdown(&self) -> Result<()> {
        let stuck = self.scheduler.shutdown()?;
        if stuck > 0 {
            tracing::warn!("{stuck} workers still running after shutdown timeout");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("options", &self.options)
            .field("corpus_loaded", &self.is_corpus_loaded())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
