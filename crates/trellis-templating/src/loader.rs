//! Template sources.
//!
//! A [`Loader`] turns a logical filename into raw template bytes. It performs no
//! validation of the filename; callers are expected to pass trusted names.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;

/// Source of raw template bytes, keyed by logical filename.
///
/// Implementations must be side-effect free beyond reading and safe to call
/// from several threads at once.
pub trait Loader: Send + Sync {
    /// Return the raw source for `filename`.
    fn load(&self, filename: &str) -> Result<Vec<u8>, LoadError>;
}

impl<L: Loader + ?Sized> Loader for Arc<L> {
    fn load(&self, filename: &str) -> Result<Vec<u8>, LoadError> {
        (**self).load(filename)
    }
}

impl<L: Loader + ?Sized> Loader for &L {
    fn load(&self, filename: &str) -> Result<Vec<u8>, LoadError> {
        (**self).load(filename)
    }
}

/// Loads templates from a directory on the file system.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory templates are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Loader for FsLoader {
    fn load(&self, filename: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.root.join(filename);
        std::fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(filename.to_string()),
            _ => LoadError::Io { path, source: e },
        })
    }
}

/// Loads templates through a lookup function, typically backed by assets
/// compiled into the binary.
pub struct AssetLoader<F> {
    lookup: F,
}

impl<F> AssetLoader<F>
where
    F: Fn(&str) -> Result<Cow<'static, [u8]>, LoadError> + Send + Sync,
{
    /// Wrap a lookup function.
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F> Loader for AssetLoader<F>
where
    F: Fn(&str) -> Result<Cow<'static, [u8]>, LoadError> + Send + Sync,
{
    fn load(&self, filename: &str) -> Result<Vec<u8>, LoadError> {
        (self.lookup)(filename).map(Cow::into_owned)
    }
}

impl<F> std::fmt::Debug for AssetLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader").finish_non_exhaustive()
    }
}

/// Holds template sources in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template source, replacing any previous one under the same name.
    pub fn insert(&mut self, filename: impl Into<String>, source: impl Into<Vec<u8>>) {
        self.sources.insert(filename.into(), source.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, filename: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        self.insert(filename, source);
        self
    }

    /// Number of stored sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no sources are stored.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Loader for MemoryLoader {
    fn load(&self, filename: &str) -> Result<Vec<u8>, LoadError> {
        self.sources
            .get(filename)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(filename.to_string()))
    }
}

/// Loader reading templates from `dir` on the file system.
pub fn fs_loader(dir: impl Into<PathBuf>) -> FsLoader {
    FsLoader::new(dir)
}

/// Loader delegating to an asset lookup function.
pub fn asset_loader<F>(lookup: F) -> AssetLoader<F>
where
    F: Fn(&str) -> Result<Cow<'static, [u8]>, LoadError> + Send + Sync,
{
    AssetLoader::new(lookup)
}
