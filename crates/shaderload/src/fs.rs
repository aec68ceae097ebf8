//! Filesystem-backed shader lookup.
//!
//! Types:
//!
//! - `DirectoryLoader` holds ordered search roots plus a table of built-in
//!   sources consulted when nothing on disk matches.
//!
//! Functions:
//!
//! - `DirectoryLoader::candidates` expands a logical name into the concrete
//!   paths probed, in order, so error messages can list them.
//! - `SourceLoader::load` reads the first candidate that exists.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{LoadError, SourceLoader};

/// File extensions tried after the bare name, in order.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["shader", "glsl", "vert", "frag"];

#[derive(Debug, Clone, Default)]
pub struct DirectoryLoader {
    roots: Vec<PathBuf>,
    builtins: BTreeMap<String, &'static str>,
}

impl DirectoryLoader {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            builtins: BTreeMap::new(),
        }
    }

    /// Registers a source returned when `name` is not found under any root.
    pub fn with_builtin(mut self, name: impl Into<String>, source: &'static str) -> Self {
        self.builtins.insert(name.into(), source);
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Paths probed for `name`, in lookup order.
    ///
    /// Names that look like paths (absolute, or containing a separator) are
    /// taken verbatim and never joined onto a root.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let as_path = Path::new(name);
        if is_explicit_path(name, as_path) {
            return vec![as_path.to_path_buf()];
        }

        let mut candidates = Vec::with_capacity(self.roots.len() * (SOURCE_EXTENSIONS.len() + 1));
        for root in &self.roots {
            candidates.push(root.join(name));
            for extension in SOURCE_EXTENSIONS {
                candidates.push(root.join(format!("{name}.{extension}")));
            }
        }
        candidates
    }
}

fn is_explicit_path(name: &str, path: &Path) -> bool {
    path.is_absolute() || name.contains('/') || name.contains(std::path::MAIN_SEPARATOR)
}

impl SourceLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        let candidates = self.candidates(name);
        for candidate in &candidates {
            if !candidate.is_file() {
                continue;
            }
            let source = fs::read_to_string(candidate).map_err(|source| LoadError::Io {
                path: candidate.clone(),
                source,
            })?;
            tracing::debug!(shader = name, path = %candidate.display(), "loaded shader source");
            return Ok(source);
        }

        if let Some(source) = self.builtins.get(name) {
            tracing::debug!(shader = name, "using built-in shader source");
            return Ok((*source).to_string());
        }

        Err(LoadError::NotFound {
            name: name.to_string(),
            searched: candidates,
        })
    }
}
