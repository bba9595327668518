//! Render-ready highlight data for one page.
//!
//! Combines the page metadata with the query metadata into the flat box list
//! plus everything the presentation layer needs to mark up and annotate the
//! boxes: matched terms, synonym positions and per-box titles.

use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::index::PageData;
use crate::search::explain::word_title;
use crate::search::flatten::{flatten_bounding_boxes, flatten_snippet_bounding_boxes, FlatBox};
use crate::search::query::{QueryMetadata, StemDescriptor};
use crate::search::resolver::{
    filter_synonyms, find_synonym_positions, gated_synonyms, main_terms, mainterm_map,
    relevant_stems, relevant_terms, Relevance, SynonymPositions,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Request for the highlight data of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoundingBoxRequest {
    /// Persisted metadata of the page
    pub bounding_data: PageData,
    /// Query metadata with collected stems
    pub meta_data: QueryMetadata,
    /// Detected language of the page
    #[serde(default)]
    pub language: String,
    /// Stems excluded by the user
    #[serde(default)]
    pub stem_filters: BTreeSet<String>,
    /// Crop rectangle when rendering a snippet instead of the full page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surrounding_box: Option<BoundingBox>,
}

/// Why a box is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    /// Shares a stem with the query
    Relevant,
    /// Covered by a synonym group
    Synonym,
    /// Not a match
    Plain,
}

/// Markup hint for one flattened box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Match kind
    pub kind: HighlightKind,
    /// Tooltip title
    pub title: String,
}

/// Highlight data for one page (or snippet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxView {
    /// Flattened boxes in reading order
    pub boxes: Vec<FlatBox>,
    /// Matched word → stem
    pub terms: Relevance,
    /// Query term → stems
    pub stem_map: BTreeMap<String, Vec<String>>,
    /// Stems applying to this page
    pub stems: StemDescriptor,
    /// Box position → covering synonyms
    pub synonym_positions: SynonymPositions,
    /// Synonym → main term, including groups whose main term was filtered
    pub mainterm_map: BTreeMap<String, String>,
    /// Main terms still in effect (lower-cased)
    pub main_terms: BTreeSet<String>,
    /// Width of the target space
    pub width: f32,
    /// Height of the target space
    pub height: f32,
    /// One entry per box, same order as `boxes`
    pub highlights: Vec<Highlight>,
}

impl BoundingBoxView {
    /// Number of boxes that are highlighted.
    pub fn highlighted_count(&self) -> usize {
        self.highlights
            .iter()
            .filter(|h| h.kind != HighlightKind::Plain)
            .count()
    }
}

/// Build the highlight data for a page.
///
/// Without a surrounding box, boxes are page fractions and the target size is
/// the page size; with one, boxes are relative to the crop and the target
/// size is the crop size.
pub fn build_bounding_box_view(
    request: &BoundingBoxRequest,
    line_margin: f32,
) -> Result<BoundingBoxView> {
    let page = &request.bounding_data;
    let translations = &request.meta_data.translations;

    let stems = relevant_stems(translations, &request.language, &request.stem_filters);
    let gated = gated_synonyms(translations, &request.language);
    let synonyms = filter_synonyms(&gated, &request.stem_filters);
    let terms = relevant_terms(stems.keys(), &page.stems);

    let (boxes, width, height) = match &request.surrounding_box {
        Some(crop) => (
            flatten_snippet_bounding_boxes(&page.boxes, crop, line_margin)?,
            crop.width(),
            crop.height(),
        ),
        None => {
            let dims = page.dimensions;
            (
                flatten_bounding_boxes(&page.boxes, dims.orig_width, dims.orig_height, line_margin)?,
                dims.orig_width,
                dims.orig_height,
            )
        },
    };

    let words: Vec<String> = boxes.iter().map(|b| b.word.clone()).collect();
    let synonym_positions =
        find_synonym_positions(&words, &synonyms, &page.stems, &request.language);
    let mainterms = mainterm_map(&gated);
    let main_terms = main_terms(&synonyms);

    let highlights = boxes
        .iter()
        .enumerate()
        .map(|(pos, flat)| {
            let covering = synonym_positions
                .get(&pos)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let kind = if terms.contains_key(&flat.word) {
                HighlightKind::Relevant
            } else if !covering.is_empty() {
                HighlightKind::Synonym
            } else {
                HighlightKind::Plain
            };
            Highlight {
                kind,
                title: word_title(
                    &flat.word,
                    &stems,
                    &terms,
                    covering,
                    &mainterms,
                    &main_terms,
                ),
            }
        })
        .collect();

    log::debug!(
        "Built highlight view: {} boxes, {} relevant terms, {} synonym positions",
        boxes.len(),
        terms.len(),
        synonym_positions.len()
    );

    Ok(BoundingBoxView {
        boxes,
        terms,
        stem_map: request.meta_data.stem_map(),
        stems,
        synonym_positions,
        mainterm_map: mainterms,
        main_terms,
        width,
        height,
        highlights,
    })
}
