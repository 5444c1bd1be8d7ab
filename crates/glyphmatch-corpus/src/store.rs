//! Storage of encoded corpus units
//!
//! A store maps a storage key to one font's glyphs. Units are written as
//! opaque bytes produced by [`encode_glyphs`] and decoded on read, so a
//! unit that cannot be decoded surfaces as [`CorpusError::CacheCorrupt`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::codec::{decode_glyphs, encode_glyphs};
use crate::error::{CorpusError, CorpusResult};
use crate::glyph::ReferenceGlyph;

/// Read/write capability for corpus units
pub trait CorpusStore: Send + Sync {
    /// Glyphs stored under `key`, or `None` if there is no such unit
    fn read(&self, key: &str) -> CorpusResult<Option<Vec<ReferenceGlyph>>>;

    /// Store `glyphs` under `key`, replacing any previous unit
    fn write(&self, key: &str, glyphs: &[ReferenceGlyph]) -> CorpusResult<()>;
}

/// Directory-backed store
///
/// Reads search the bundled (read-only) directory first, then the cache
/// directory. Writes always go to the cache directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    cache_dir: PathBuf,
    bundled_dir: Option<PathBuf>,
}

impl FsStore {
    /// Store writing to `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            bundled_dir: None,
        }
    }

    /// Store writing to the per-user cache directory
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no cache directory.
    pub fn in_user_cache() -> CorpusResult<Self> {
        Self::default_cache_dir().map(Self::new)
    }

    /// `<user cache dir>/glyphmatch`
    pub fn default_cache_dir() -> CorpusResult<PathBuf> {
        dirs::cache_dir()
            .map(|d| d.join("glyphmatch"))
            .ok_or_else(|| CorpusError::InvalidParameters("no user cache directory available".into()))
    }

    /// Also read units shipped in `dir`
    pub fn with_bundled(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    /// Writable cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn read_from(dir: &Path, key: &str) -> CorpusResult<Option<Vec<u8>>> {
        let path = dir.join(key);
        match fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!("read {} ({} bytes)", path.display(), bytes.len());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl CorpusStore for FsStore {
    fn read(&self, key: &str) -> CorpusResult<Option<Vec<ReferenceGlyph>>> {
        let mut bytes = None;
        if let Some(dir) = &self.bundled_dir {
            bytes = Self::read_from(dir, key)?;
        }
        if bytes.is_none() {
            bytes = Self::read_from(&self.cache_dir, key)?;
        }
        bytes.map(|b| decode_glyphs(key, &b)).transpose()
    }

    fn write(&self, key: &str, glyphs: &[ReferenceGlyph]) -> CorpusResult<()> {
        let bytes = encode_glyphs(glyphs)?;
        fs::create_dir_all(&self.cache_dir)?;
        // write-then-rename so readers never see a partial unit
        let path = self.cache_dir.join(key);
        let tmp = self.cache_dir.join(format!("{key}.tmp"));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        tracing::info!("wrote {} glyphs to {}", glyphs.len(), path.display());
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    units: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `key` without encoding them
    pub fn insert_raw(&self, key: impl Into<String>, bytes: Vec<u8>) -> CorpusResult<()> {
        self.units
            .lock()
            .map_err(|_| CorpusError::LockPoisoned)?
            .insert(key.into(), bytes);
        Ok(())
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> CorpusResult<Vec<String>> {
        let units = self.units.lock().map_err(|_| CorpusError::LockPoisoned)?;
        let mut keys: Vec<String> = units.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl CorpusStore for MemoryStore {
    fn read(&self, key: &str) -> CorpusResult<Option<Vec<ReferenceGlyph>>> {
        let units = self.units.lock().map_err(|_| CorpusError::LockPoisoned)?;
        units.get(key).map(|b| decode_glyphs(key, b)).transpose()
    }

    fn write(&self, key: &str, glyphs: &[ReferenceGlyph]) -> CorpusResult<()> {
        let bytes = encode_glyphs(glyphs)?;
        self.insert_raw(key, bytes)
    }
}
