//! Index Page Layouts
//!
//! Reads `*.layout.json` document layouts from a folder, indexes every page
//! and writes the page metadata under the metadata root. Failures are
//! written to an errors file that `read_errors` can summarize.
//!
//! Usage:
//!   cargo run --release --bin index_pages -- data/layouts
//!   cargo run --release --bin index_pages -- data/layouts --metadata-root meta --force
//!   cargo run --release --bin index_pages -- data/layouts --config index.json --threads 4

use page_highlight::ingest::write_errors;
use page_highlight::{DocumentLayout, FsPageStore, IndexConfig, IngestError, Ingestor};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

const LAYOUT_SUFFIX: &str = ".layout.json";

struct IndexArgs {
    folder: PathBuf,
    config_file: Option<PathBuf>,
    metadata_root: Option<PathBuf>,
    errors_file: PathBuf,
    threads: Option<usize>,
    force: bool,
}

impl IndexArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut folder = PathBuf::from("data");
        let mut config_file = None;
        let mut metadata_root = None;
        let mut errors_file = PathBuf::from("errors.json");
        let mut threads = None;
        let mut force = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        config_file = Some(PathBuf::from(&args[i]));
                    }
                },
                "--metadata-root" => {
                    i += 1;
                    if i < args.len() {
                        metadata_root = Some(PathBuf::from(&args[i]));
                    }
                },
                "--errors" => {
                    i += 1;
                    if i < args.len() {
                        errors_file = PathBuf::from(&args[i]);
                    }
                },
                "--threads" => {
                    i += 1;
                    if i < args.len() {
                        threads = args[i].parse().ok();
                    }
                },
                "--force" | "-f" => {
                    force = true;
                },
                other if !other.starts_with('-') => {
                    folder = PathBuf::from(other);
                },
                other => {
                    eprintln!("Ignoring unknown option {}", other);
                },
            }
            i += 1;
        }

        Self {
            folder,
            config_file,
            metadata_root,
            errors_file,
            threads,
            force,
        }
    }

    fn index_config(&self) -> page_highlight::Result<IndexConfig> {
        let mut config = match &self.config_file {
            Some(path) => IndexConfig::from_json_file(path)?,
            None => IndexConfig::default(),
        };
        if let Some(root) = &self.metadata_root {
            config = config.with_metadata_root(root);
        }
        if let Some(threads) = self.threads {
            config = config.with_worker_threads(threads);
        }
        Ok(config)
    }
}

fn find_layouts(folder: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", folder.display(), e);
            return Vec::new();
        },
    };

    let mut layouts: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(LAYOUT_SUFFIX))
        })
        .collect();
    layouts.sort();
    layouts
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim_end_matches(LAYOUT_SUFFIX).to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn load_layout(path: &Path) -> page_highlight::Result<DocumentLayout> {
    let reader = BufReader::new(File::open(path)?);
    let mut layout: DocumentLayout = serde_json::from_reader(reader)?;
    if layout.document_id.is_empty() {
        layout.document_id = document_name(path);
    }
    Ok(layout)
}

fn main() {
    env_logger::init();
    let args = IndexArgs::from_args();

    let config = match args.index_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        },
    };

    println!("Page Layout Indexer");
    println!("===================");
    println!("Layout directory: {}", args.folder.display());
    println!("Metadata root: {}", config.metadata_root.display());
    println!();

    let files = find_layouts(&args.folder);
    println!("Found {} layout files\n", files.len());
    if files.is_empty() {
        return;
    }

    let start = Instant::now();
    let mut errors = Vec::new();
    let mut documents = Vec::new();
    for path in &files {
        match load_layout(path) {
            Ok(layout) => documents.push(layout),
            Err(e) => {
                eprintln!("✗ {}: {}", path.display(), e);
                errors.push(IngestError::document(document_name(path), e.to_string()));
            },
        }
    }

    let store = FsPageStore::new(&config.metadata_root);
    let ingestor = Ingestor::new(store, config).with_force(args.force);
    let report = ingestor.ingest_all(&documents);
    errors.extend(report.errors.iter().cloned());

    if let Err(e) = write_errors(&args.errors_file, &errors) {
        eprintln!("Error writing {}: {}", args.errors_file.display(), e);
    }

    println!("\n{}", "=".repeat(70));
    println!("Indexing Complete");
    println!("{}", "=".repeat(70));
    println!("Documents: {}", documents.len());
    println!("Skipped: {}", report.documents_skipped);
    println!("Pages indexed: {}", report.pages_indexed);
    println!("Errors: {} (see {})", errors.len(), args.errors_file.display());
    println!("Time: {:?}", start.elapsed());
    println!("{}", "=".repeat(70));
}
