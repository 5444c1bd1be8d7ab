//! CorpusLoader - loads the corpus once and shares it

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::builder::CorpusBuilder;
use crate::corpus::Corpus;
use crate::error::{CorpusError, CorpusResult};
use crate::key::storage_key;
use crate::params::CorpusParams;
use crate::render::GlyphRenderer;
use crate::store::CorpusStore;

/// Loads the units of a [`CorpusParams`] from a store at most once
///
/// The first successful [`load`](Self::load) reads every font's unit; later
/// calls return the same shared [`Corpus`]. Concurrent callers block on the
/// guard while the first one loads and then observe its result. A failed
/// load leaves the loader empty so it can be retried after a rebuild.
pub struct CorpusLoader {
    params: CorpusParams,
    store: Arc<dyn CorpusStore>,
    loaded: Mutex<Option<Arc<Corpus>>>,
}

impl CorpusLoader {
    /// Create a loader after validating `params`
    pub fn new(params: CorpusParams, store: Arc<dyn CorpusStore>) -> CorpusResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            store,
            loaded: Mutex::new(None),
        })
    }

    pub fn params(&self) -> &CorpusParams {
        &self.params
    }

    /// Load the corpus, or return the one already loaded
    ///
    /// # Errors
    ///
    /// * [`CorpusError::CacheMissing`] if a font's unit is not in the store
    ///   or holds no glyphs
    /// * [`CorpusError::CacheCorrupt`] if a unit cannot be decoded
    pub fn load(&self) -> CorpusResult<Arc<Corpus>> {
        let mut loaded = self.loaded.lock().map_err(|_| CorpusError::LockPoisoned)?;
        if let Some(corpus) = loaded.as_ref() {
            return Ok(Arc::clone(corpus));
        }

        let started = Instant::now();
        let mut units = Vec::with_capacity(self.params.fonts.len());
        for font in &self.params.fonts {
            let key = storage_key(&font.name, &self.params);
            let glyphs = self.store.read(&key)?.ok_or_else(|| CorpusError::CacheMissing {
                font: font.name.clone(),
                key: key.clone(),
            })?;
            tracing::debug!("font {}: {} glyphs from {key}", font.name, glyphs.len());
            units.push((font.name.clone(), glyphs));
        }
        let corpus = Arc::new(Corpus::new(&self.params, units)?);
        tracing::info!(
            "loaded {} reference glyphs in {} fonts in {} ms",
            corpus.glyph_count(),
            corpus.font_count(),
            started.elapsed().as_millis()
        );
        *loaded = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    /// Build every unit with `renderer`, write it to the store and replace
    /// the loaded corpus
    pub fn rebuild(&self, renderer: &dyn GlyphRenderer) -> CorpusResult<Arc<Corpus>> {
        let mut loaded = self.loaded.lock().map_err(|_| CorpusError::LockPoisoned)?;
        *loaded = None;
        let builder = CorpusBuilder::new(self.params.clone())?;
        let corpus = Arc::new(builder.build_all(renderer, self.store.as_ref())?);
        *loaded = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    /// The loaded corpus, if any
    pub fn corpus(&self) -> CorpusResult<Option<Arc<Corpus>>> {
        let loaded = self.loaded.lock().map_err(|_| CorpusError::LockPoisoned)?;
        Ok(loaded.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().map(|l| l.is_some()).unwrap_or(false)
    }
}

impl std::fmt::Debug for CorpusLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusLoader")
            .field("params", &self.params)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FontSpec;
    use crate::store::MemoryStore;
    use image::{GrayImage, Luma};

    struct BarRenderer;

    impl GlyphRenderer for BarRenderer {
        fn render(&self, _font: &str, _c: char, px: f32) -> CorpusResult<Option<GrayImage>> {
            let side = px as u32 + 4;
            Ok(Some(GrayImage::from_fn(side, side, |x, y| {
                if x >= 2 && x < side - 2 && y >= 2 && y < 8 {
                    Luma([0])
                } else {
                    Luma([255])
                }
            })))
        }
    }

    fn params() -> CorpusParams {
        CorpusParams::default()
            .with_fonts(vec![FontSpec::new("Bar", "bar.ttf")])
            .with_characters("一二")
    }

    #[test]
    fn test_missing_then_rebuild() {
        let store = Arc::new(MemoryStore::new());
        let loader = CorpusLoader::new(params(), store.clone()).unwrap();
        match loader.load() {
            Err(CorpusError::CacheMissing { font, key }) => {
                assert_eq!(font, "Bar");
                assert_eq!(key, storage_key("Bar", &params()));
            }
            other => panic!("unexpected {:?}", other.map(|c| c.glyph_count())),
        }
        assert!(!loader.is_loaded());

        let built = loader.rebuild(&BarRenderer).unwrap();
        assert_eq!(built.glyph_count(), 2);
        assert!(loader.is_loaded());
        assert_eq!(store.keys().unwrap(), vec![storage_key("Bar", &params())]);

        // a fresh loader reads the stored unit
        let fresh = CorpusLoader::new(params(), store).unwrap();
        let loaded = fresh.load().unwrap();
        assert_eq!(loaded.glyphs("Bar"), built.glyphs("Bar"));
        assert!(Arc::ptr_eq(&loaded, &fresh.load().unwrap()));
    }

    #[test]
    fn test_empty_unit_is_missing() {
        let store = Arc::new(MemoryStore::new());
        store.write(&storage_key("Bar", &params()), &[]).unwrap();
        let loader = CorpusLoader::new(params(), store).unwrap();
        assert!(matches!(loader.load(), Err(CorpusError::CacheMissing { .. })));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_corrupt() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw(storage_key("Bar", &params()), vec![7; 5]).unwrap();
        let loader = CorpusLoader::new(params(), store).unwrap();
        assert!(matches!(loader.load(), Err(CorpusError::CacheCorrupt { .. })));
    }
}
