//! Where document text comes from.
//!
//! A missing or unreadable document is never fatal: [`load_or_fallback`]
//! logs the failure and substitutes [`FALLBACK_TEXT`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Text shown in place of a document that could not be read.
pub const FALLBACK_TEXT: &str = "# Sample Markdown Not Found\n\nPlease ensure sample_markdown.md exists.";

/// Name of the full sample document shown in the last section.
pub const CANONICAL_DOCUMENT: &str = "sample_markdown.md";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not valid UTF-8")]
    Encoding(String),

    #[error("no document named {0}")]
    Unknown(String),
}

/// Resolves a document name to its text.
pub trait DocumentSource {
    /// # Errors
    /// Returns [`SourceError`] if the document is missing or unreadable.
    fn read(&self, name: &str) -> Result<String, SourceError>;
}

/// Documents stored as files under one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl DocumentSource for DirSource {
    fn read(&self, name: &str) -> Result<String, SourceError> {
        let path = self.path_of(name);
        let bytes = std::fs::read(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| SourceError::Encoding(path.display().to_string()))
    }
}

/// In-memory documents, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(name.into(), text.into());
        self
    }
}

impl DocumentSource for StaticSource {
    fn read(&self, name: &str) -> Result<String, SourceError> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::Unknown(name.to_string()))
    }
}

/// Read `name`, or log the failure and return [`FALLBACK_TEXT`].
pub fn load_or_fallback(source: &dyn DocumentSource, name: &str) -> String {
    match source.read(name) {
        Ok(text) => {
            crate::perf::log_event("source.load", format!("name={name} bytes={}", text.len()));
            text
        }
        Err(err) => {
            tracing::warn!(document = name, error = %err, "using fallback document");
            crate::perf::log_event("source.fallback", format!("name={name} error={err}"));
            FALLBACK_TEXT.to_string()
        }
    }
}
