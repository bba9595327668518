//! Query-time highlight reconstruction.
//!
//! Given the metadata persisted for a hit page and the query's translations,
//! this module works out which words on the page to highlight and why:
//! - Flattening the Word Box Index into ordered, normalized boxes
//! - Resolving query stems and synonym groups against the page
//! - Building tooltip titles, page views and snippet regions
//!
//! ## Example
//!
//! ```ignore
//! use page_highlight::search::{SearchRequest, SearchService};
//!
//! let service = SearchService::new(client, store, IndexConfig::default());
//! let response = service.search(&SearchRequest::new("signal corps"))?;
//! for hit in &response.hits {
//!     let page = &response.bounding_boxes[&hit.fields.parent_doc][&hit.fields.page];
//!     println!("{} page {}: {}", hit.fields.parent_doc, hit.fields.page, page.is_some());
//! }
//! ```

pub mod explain;
pub mod flatten;
pub mod highlight;
pub mod query;
pub mod resolver;
pub mod service;
pub mod snippets;

pub use explain::{language_names, word_title};
pub use flatten::{
    flatten_bounding_boxes, flatten_snippet_bounding_boxes, flatten_word_boxes,
    sort_reading_order, FlatBox,
};
pub use highlight::{
    build_bounding_box_view, BoundingBoxRequest, BoundingBoxView, Highlight, HighlightKind,
};
pub use query::{
    Hit, HitFields, PhraseTranslations, QueryMetadata, StemDescriptor, StemInfo,
    SynonymGroup, Translation,
};
pub use resolver::{
    filter_synonyms, find_synonym_positions, gated_synonyms, language_admits, main_terms,
    mainterm_map, relevant_stems, relevant_synonyms, relevant_terms, Relevance, SynonymPositions,
};
pub use service::{
    bounding_box_data, BoundingBoxData, RetrievalClient, RetrievalResponse, SearchRequest,
    SearchResponse, SearchService, SortDirection,
};
pub use snippets::{build_query_snippets, snippet_regions, PageSnippets, SnippetData, SnippetRequest};
