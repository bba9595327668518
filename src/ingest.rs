//! Batch ingestion of page layouts into the metadata store.
//!
//! Every page is an independent unit of work: it is indexed and persisted on
//! the rayon pool without touching any other page. A failing page is
//! recorded in the report and never stops the batch.

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::index::{index_page, PageData};
use crate::layout::{DocumentLayout, PageInput};
use crate::store::PageStore;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A recorded ingestion failure, as stored in `errors.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestError {
    /// Document identifier
    pub file_name: String,
    /// Failing page, `-1` when the whole document failed
    pub page: i64,
    /// Failure description
    pub trace: String,
}

impl IngestError {
    /// Failure of one page.
    pub fn page(file_name: impl Into<String>, page: u32, trace: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            page: i64::from(page),
            trace: trace.into(),
        }
    }

    /// Failure of a whole document.
    pub fn document(file_name: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            page: -1,
            trace: trace.into(),
        }
    }

    /// Whether the failure concerns the whole document.
    pub fn is_document_error(&self) -> bool {
        self.page < 0
    }
}

/// Document and page error counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Failures of whole documents
    pub document_errors: usize,
    /// Failures of single pages
    pub page_errors: usize,
}

impl ErrorSummary {
    /// Count the errors of a report.
    pub fn from_errors(errors: &[IngestError]) -> Self {
        let document_errors = errors.iter().filter(|e| e.is_document_error()).count();
        Self {
            document_errors,
            page_errors: errors.len() - document_errors,
        }
    }
}

/// Write errors as a JSON array.
pub fn write_errors(path: impl AsRef<Path>, errors: &[IngestError]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, errors)?;
    writer.flush()?;
    Ok(())
}

/// Read errors written by [`write_errors`].
pub fn read_errors(path: impl AsRef<Path>) -> Result<Vec<IngestError>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Pages indexed and persisted
    pub pages_indexed: usize,
    /// Documents skipped because they were already ingested
    pub documents_skipped: usize,
    /// Isolated failures
    pub errors: Vec<IngestError>,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// End of the run
    pub finished_at: DateTime<Utc>,
}

impl IngestReport {
    /// Whether any page or document failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Error counts.
    pub fn summary(&self) -> ErrorSummary {
        ErrorSummary::from_errors(&self.errors)
    }
}

/// Indexes page layouts and persists the results.
pub struct Ingestor<S> {
    store: S,
    config: IndexConfig,
    force: bool,
    pool: Option<rayon::ThreadPool>,
}

impl<S: PageStore> Ingestor<S> {
    /// Create an ingestor writing to `store`.
    ///
    /// A dedicated pool is used when `config.worker_threads` is non-zero.
    pub fn new(store: S, config: IndexConfig) -> Self {
        let pool = match config.worker_threads {
            0 => None,
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Falling back to the global thread pool: {}", e);
                    None
                },
            },
        };
        Self {
            store,
            config,
            force: false,
            pool,
        }
    }

    /// Re-ingest documents that are already present in the store.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Metadata store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index and persist one page.
    pub fn ingest_page(&self, document: &str, page: u32, input: &PageInput) -> Result<PageData> {
        let data = index_page(input)
            .and_then(|data| self.store.save(document, page, &data).map(|_| data))
            .map_err(|e| Error::Ingest {
                document: document.to_string(),
                page,
                reason: e.to_string(),
            })?;
        log::debug!(
            "{} page {}: {} occurrences",
            document,
            page,
            data.occurrence_count()
        );
        Ok(data)
    }

    /// Ingest a single document.
    pub fn ingest_document(&self, document: &DocumentLayout) -> IngestReport {
        self.ingest_all(std::slice::from_ref(document))
    }

    /// Ingest every page of every document in parallel.
    pub fn ingest_all(&self, documents: &[DocumentLayout]) -> IngestReport {
        let started_at = Utc::now();
        let mut errors = Vec::new();
        let mut documents_skipped = 0;
        let mut jobs: Vec<(&str, u32, &PageInput)> = Vec::new();

        for document in documents {
            let id = document.document_id.as_str();
            if !self.force && self.store.contains(id, 0) {
                log::info!("Skipping {}: already ingested", id);
                documents_skipped += 1;
                continue;
            }
            if document.pages.is_empty() {
                log::warn!("Document {} has no pages", id);
                errors.push(IngestError::document(id, "document has no pages"));
                continue;
            }
            log::info!("Ingesting {} ({} pages)", id, document.pages.len());
            for (page_no, page) in document.pages.iter().enumerate() {
                match u32::try_from(page_no) {
                    Ok(page_no) => jobs.push((id, page_no, page)),
                    Err(_) => {
                        errors.push(IngestError::document(id, "page count exceeds u32"));
                        break;
                    },
                }
            }
        }

        let run = || {
            jobs.par_iter()
                .map(|&(id, page_no, input)| (id, page_no, self.ingest_page(id, page_no, input)))
                .collect::<Vec<_>>()
        };
        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let mut pages_indexed = 0;
        for (id, page_no, result) in results {
            match result {
                Ok(_) => pages_indexed += 1,
                Err(e) => {
                    log::warn!("{}", e);
                    errors.push(IngestError::page(id, page_no, e.to_string()));
                },
            }
        }

        log::info!(
            "Ingestion finished: {} pages indexed, {} documents skipped, {} errors",
            pages_indexed,
            documents_skipped,
            errors.len()
        );

        IngestReport {
            pages_indexed,
            documents_skipped,
            errors,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
