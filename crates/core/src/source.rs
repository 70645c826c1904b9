//! Source provider abstraction for filesystem-independent compilation.
//!
//! The [`SourceProvider`] trait abstracts file I/O so the pipeline can run
//! against in-memory documents in tests and embedding hosts.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Tree notation of a source document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// `.yaml` / `.yml` / `.json`, case-insensitive. Anything else is `None`.
    pub fn from_path(path: &Path) -> Option<SourceFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// Trait that abstracts reading source documents.
pub trait SourceProvider {
    /// Read the source text for a given path.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;
}

/// Default filesystem-backed source provider.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

/// In-memory source provider for testing and embedding.
///
/// Lookups normalize `.` and `..` components without touching the
/// filesystem.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, text)| (Self::normalize_path(&path), text))
            .collect();
        Self { files }
    }

    /// Add one document, replacing any previous text at the same path.
    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.files
            .insert(Self::normalize_path(path.as_ref()), text.into());
        self
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("document not found in memory: {}", normalized.display()),
            )
        })
    }
}
