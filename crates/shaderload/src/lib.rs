//! Turns logical shader names into raw GLSL source text.
//!
//! The renderer never touches the filesystem itself; it asks a [`SourceLoader`]
//! for the text behind a name such as `fragment` and compiles whatever comes
//! back. Two loaders ship with the crate:
//!
//! - [`DirectoryLoader`] searches an ordered list of roots on disk and falls
//!   back to registered built-in sources.
//! - [`MemoryLoader`] serves sources from an in-memory table, which is handy
//!   for tests and embedded defaults.

mod builtin;
mod fs;

pub use builtin::BUILTIN_VERTEX;
pub use fs::{DirectoryLoader, SOURCE_EXTENSIONS};

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("shader `{name}` not found (searched: {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to read shader source at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Supplies shader source text for a logical name.
pub trait SourceLoader {
    fn load(&self, name: &str) -> Result<String, LoadError>;
}

impl<T: SourceLoader + ?Sized> SourceLoader for &T {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        (**self).load(name)
    }
}

impl<T: SourceLoader + ?Sized> SourceLoader for Box<T> {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        (**self).load(name)
    }
}

/// Loader backed by an in-memory name → source table.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the source served for `name`.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.sources.insert(name.into(), source.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
                searched: Vec::new(),
            })
    }
}
