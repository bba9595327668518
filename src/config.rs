//! Configuration for page indexing and highlight reconstruction.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Indexing and query-time configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Root directory of the persisted page metadata.
    pub metadata_root: PathBuf,

    /// Vertical tolerance (layout units) for grouping boxes into one row
    /// when ordering flattened boxes.
    pub line_margin: f32,

    /// Padding (layout units) added above and below a matched word when
    /// computing snippet regions.
    pub snippet_padding: f32,

    /// Minimum height (layout units) of a snippet region.
    pub snippet_min_height: f32,

    /// Number of ingestion worker threads (0 = rayon default).
    pub worker_threads: usize,

    /// Cache page metadata reads.
    pub cache_metadata: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            metadata_root: PathBuf::from("metadata"),
            line_margin: 2.0,
            snippet_padding: 10.0,
            snippet_min_height: 40.0,
            worker_threads: 0,
            cache_metadata: true,
        }
    }

    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Set the metadata root directory.
    pub fn with_metadata_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.metadata_root = root.into();
        self
    }

    /// Set the row grouping tolerance.
    pub fn with_line_margin(mut self, margin: f32) -> Self {
        self.line_margin = margin;
        self
    }

    /// Set the snippet padding.
    pub fn with_snippet_padding(mut self, padding: f32) -> Self {
        self.snippet_padding = padding;
        self
    }

    /// Set the minimum snippet height.
    pub fn with_snippet_min_height(mut self, height: f32) -> Self {
        self.snippet_min_height = height;
        self
    }

    /// Set the number of ingestion worker threads.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Enable or disable the metadata cache.
    pub fn with_cache_metadata(mut self, enable: bool) -> Self {
        self.cache_metadata = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.metadata_root, PathBuf::from("metadata"));
        assert_eq!(config.line_margin, 2.0);
        assert_eq!(config.worker_threads, 0);
        assert!(config.cache_metadata);
    }

    #[test]
    fn test_builder() {
        let config = IndexConfig::new()
            .with_metadata_root("/tmp/meta")
            .with_line_margin(4.0)
            .with_snippet_padding(5.0)
            .with_snippet_min_height(20.0)
            .with_worker_threads(3)
            .with_cache_metadata(false);

        assert_eq!(config.metadata_root, PathBuf::from("/tmp/meta"));
        assert_eq!(config.line_margin, 4.0);
        assert_eq!(config.snippet_padding, 5.0);
        assert_eq!(config.snippet_min_height, 20.0);
        assert_eq!(config.worker_threads, 3);
        assert!(!config.cache_metadata);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: IndexConfig = serde_json::from_str(r#"{"line_margin": 3.5}"#).unwrap();
        assert_eq!(config.line_margin, 3.5);
        assert_eq!(config.snippet_padding, 10.0);
    }
}
