//! Query orchestration over an external retrieval client.
//!
//! The retrieval service itself (ranking, translation, synonym expansion) is
//! not part of this crate; it is reached through [`RetrievalClient`]. The
//! service adds what highlighting needs on top of its answer: the query stems
//! and the persisted metadata of every hit page.

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::index::PageData;
use crate::search::highlight::{build_bounding_box_view, BoundingBoxRequest, BoundingBoxView};
use crate::search::query::{Hit, QueryMetadata};
use crate::search::snippets::{build_query_snippets, SnippetData, SnippetRequest};
use crate::store::PageStore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sort direction of an ordered query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// A user query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Query phrase
    pub query: String,
    /// Hits per result page
    pub hits: usize,
    /// Result page (0-indexed)
    pub page: usize,
    /// Restrict to pages detected in this language
    pub language: String,
    /// Restrict to one document
    pub document: Option<String>,
    /// Field to order by (relevance when empty)
    pub order_by: String,
    /// Order direction
    pub direction: SortDirection,
    /// Stems the retrieval service should not expand
    pub stem_filter: Vec<String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new("")
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl SearchRequest {
    /// Create a request for the first page of five hits.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            hits: 5,
            page: 0,
            language: String::new(),
            document: None,
            order_by: String::new(),
            direction: SortDirection::Desc,
            stem_filter: Vec::new(),
        }
    }

    /// Set the number of hits per page.
    pub fn with_hits(mut self, hits: usize) -> Self {
        self.hits = hits;
        self
    }

    /// Set the result page.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Restrict to a page language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Restrict to one document.
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Order by a field.
    pub fn with_order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = field.into();
        self.direction = direction;
        self
    }

    /// Exclude stems from expansion.
    pub fn with_stem_filter<I, S>(mut self, stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stem_filter = stems.into_iter().map(Into::into).collect();
        self
    }

    /// Offset of the first hit.
    pub fn offset(&self) -> usize {
        self.page * self.hits
    }

    /// Query string for the retrieval service.
    ///
    /// Quoted values are escaped; the order field must be a plain identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_highlight::search::SearchRequest;
    ///
    /// let yql = SearchRequest::new("signal corps").with_language("en").yql().unwrap();
    /// assert_eq!(
    ///     yql,
    ///     r#"select * from sources * where body contains "signal corps" and language contains "en";"#
    /// );
    /// ```
    pub fn yql(&self) -> Result<String> {
        let mut yql = format!(
            "select * from sources * where body contains \"{}\"",
            escape_quoted(&self.query)
        );
        if !self.language.is_empty() {
            yql.push_str(&format!(" and language contains \"{}\"", escape_quoted(&self.language)));
        }
        if let Some(document) = &self.document {
            yql.push_str(&format!(" and parent_doc contains \"{}\"", escape_quoted(document)));
        }
        if !self.order_by.is_empty() {
            let valid = self
                .order_by
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(Error::Retrieval(format!(
                    "invalid order field '{}'",
                    self.order_by
                )));
            }
            yql.push_str(&format!(" order by {} {}", self.order_by, self.direction));
        }
        yql.push(';');
        Ok(yql)
    }
}

/// Answer of the retrieval service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResponse {
    /// Ranked hits
    pub hits: Vec<Hit>,
    /// Translations and synonyms of the query
    pub query_metadata: QueryMetadata,
    /// Total number of matching pages
    pub total: u64,
}

/// Client of the external retrieval service.
pub trait RetrievalClient: Send + Sync {
    /// Run a query.
    fn search(&self, request: &SearchRequest) -> Result<RetrievalResponse>;
}

/// Document → page → metadata, `None` where no metadata exists.
pub type BoundingBoxData = BTreeMap<String, BTreeMap<u32, Option<PageData>>>;

/// Result page with everything needed for highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Ranked hits
    pub hits: Vec<Hit>,
    /// Query metadata with collected stems
    pub query_metadata: QueryMetadata,
    /// Metadata of every hit page
    pub bounding_boxes: BoundingBoxData,
    /// Total number of matching pages
    pub total: u64,
}

/// Load the metadata of every hit page.
///
/// Pages are loaded in parallel. A page that cannot be loaded is recorded as
/// `None` and logged; it never fails the whole response.
pub fn bounding_box_data<S: PageStore + ?Sized>(store: &S, hits: &[Hit]) -> BoundingBoxData {
    let loaded: Vec<(&str, u32, Option<PageData>)> = hits
        .par_iter()
        .map(|hit| {
            let doc = hit.fields.parent_doc.as_str();
            let page = hit.fields.page;
            match store.load(doc, page) {
                Ok(data) => (doc, page, Some(data)),
                Err(e) => {
                    log::warn!("No bounding data for {} page {}: {}", doc, page, e);
                    (doc, page, None)
                },
            }
        })
        .collect();

    let mut data = BoundingBoxData::new();
    for (doc, page, page_data) in loaded {
        data.entry(doc.to_string()).or_default().insert(page, page_data);
    }
    data
}

/// Query entry point.
pub struct SearchService<C, S> {
    client: C,
    store: S,
    config: IndexConfig,
}

impl<C: RetrievalClient, S: PageStore> SearchService<C, S> {
    /// Create a service.
    pub fn new(client: C, store: S, config: IndexConfig) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Retrieval client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Metadata store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Run a query and attach stems and bounding data.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let RetrievalResponse {
            hits,
            mut query_metadata,
            total,
        } = self.client.search(request)?;

        query_metadata.collect_stems();
        let bounding_boxes = bounding_box_data(&self.store, &hits);
        log::info!(
            "Query '{}': {} hits of {}, {} query stems",
            request.query,
            hits.len(),
            total,
            query_metadata.all_stems().len()
        );

        Ok(SearchResponse {
            hits,
            query_metadata,
            bounding_boxes,
            total,
        })
    }

    /// Highlight data for one page.
    pub fn bounding_boxes(&self, request: &BoundingBoxRequest) -> Result<BoundingBoxView> {
        build_bounding_box_view(request, self.config.line_margin)
    }

    /// Snippets of one hit.
    pub fn snippets(&self, request: &SnippetRequest) -> Result<SnippetData> {
        build_query_snippets(&self.store, request, &self.config)
    }
}
