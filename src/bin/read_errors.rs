//! Read Ingestion Errors
//!
//! Prints every entry of an errors file written by `index_pages`, followed
//! by the number of document and page errors.
//!
//! Usage:
//!   cargo run --release --bin read_errors
//!   cargo run --release --bin read_errors -- path/to/errors.json

use page_highlight::ingest::read_errors;
use page_highlight::ErrorSummary;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("errors.json"));

    let errors = match read_errors(&path) {
        Ok(errors) => errors,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            std::process::exit(1);
        },
    };

    let separator = "-".repeat(36);
    for error in &errors {
        println!("{} | {}\n{}", error.file_name, error.page, separator);
        println!("{}\n{}\n", error.trace, separator);
    }

    let summary = ErrorSummary::from_errors(&errors);
    println!("Doc errors: {}", summary.document_errors);
    println!("Page errors: {}", summary.page_errors);
}
