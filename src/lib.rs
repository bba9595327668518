// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # Page Highlight
//!
//! Word-level geometric indexing of PDF pages and multilingual highlight
//! reconstruction for search results.
//!
//! ## Core Features
//!
//! ### Indexing
//! - **Word Segmentation**: characters of each layout line grouped into words,
//!   each word mapped to the union box of its characters
//! - **Multilingual Stemming**: Snowball stemmers per language code, with a
//!   deterministic English fallback
//! - **Persistence**: one metadata record per `(document, page)`, read-through cached
//! - **Batch Ingestion**: pages indexed in parallel, failures isolated per page
//!
//! ### Highlighting
//! - **Term Resolution**: query translations stemmed with the ingestion stemmer
//!   and matched against each page's stem groups, gated by language
//! - **Synonyms**: multi-word synonym terms matched over the page's reading order
//! - **Projection**: page-relative or crop-relative boxes for the presentation layer
//! - **Snippets**: merged full-width regions around the matches of a hit
//!
//! ## Quick Start
//!
//! ```ignore
//! use page_highlight::{IndexConfig, Ingestor, FsPageStore};
//! use page_highlight::search::{BoundingBoxRequest, build_bounding_box_view};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IndexConfig::default();
//! let ingestor = Ingestor::new(FsPageStore::new(&config.metadata_root), config.clone());
//! let report = ingestor.ingest_all(&documents);
//! println!("{} pages indexed", report.pages_indexed);
//!
//! let view = build_bounding_box_view(&request, config.line_margin)?;
//! for (flat, highlight) in view.boxes.iter().zip(&view.highlights) {
//!     println!("{} {:?}: {}", flat.word, highlight.kind, highlight.title);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry primitives
pub mod geometry;

// Layout input and word segmentation
pub mod layout;

// Stemming
pub mod text;

// Per-page metadata
pub mod index;
pub mod store;

// Batch ingestion
pub mod ingest;

// Query-time highlighting
pub mod search;

// Re-exports
pub use config::IndexConfig;
pub use error::{Error, Result};
pub use geometry::BoundingBox;
pub use index::{index_page, Dimensions, PageData};
pub use ingest::{ErrorSummary, IngestError, IngestReport, Ingestor};
pub use layout::{DocumentLayout, PageInput, PageLayout, WordBoxIndex};
pub use store::{
    decode_document_id, open_store, CachedPageStore, FsPageStore, MemoryPageStore, PageStore,
};
pub use text::StemIndex;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
