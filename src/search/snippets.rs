//! Snippet regions around the query matches of a hit.
//!
//! A snippet is a full-width horizontal band of the page around one or more
//! matched words. Bands that overlap are merged so a paragraph with several
//! matches yields a single snippet. Every band gets a fresh identifier under
//! which the presentation layer can store its rasterized crop.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::index::PageData;
use crate::search::flatten::flatten_word_boxes;
use crate::search::query::{Hit, StemDescriptor, SynonymGroup};
use crate::search::resolver::{
    filter_synonyms, find_synonym_positions, gate_stems, language_admits, relevant_terms,
};
use crate::store::PageStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Request for the snippets of one hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SnippetRequest {
    /// The hit to build snippets for
    pub hit: Hit,
    /// Query stems, merged across phrases
    #[serde(default)]
    pub stems: StemDescriptor,
    /// Synonym groups of the query
    #[serde(default)]
    pub synonyms: Vec<SynonymGroup>,
    /// Stems excluded by the user
    #[serde(default)]
    pub stem_filters: BTreeSet<String>,
}

/// Snippets of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnippets {
    /// Snippet identifiers, one per region
    pub names: Vec<String>,
    /// Regions in layout units, top of the page first
    pub boxes: Vec<BoundingBox>,
}

impl PageSnippets {
    fn from_regions(regions: Vec<BoundingBox>) -> Self {
        Self {
            names: regions
                .iter()
                .map(|_| uuid::Uuid::new_v4().to_string())
                .collect(),
            boxes: regions,
        }
    }
}

/// Document → page → snippets.
pub type SnippetData = BTreeMap<String, BTreeMap<u32, PageSnippets>>;

/// Boxes of every occurrence matched through a stem or a synonym, in
/// reading order. Synonym tokens are stemmed in the page `language`.
pub fn matched_word_boxes(
    page: &PageData,
    stems: &StemDescriptor,
    synonyms: &[SynonymGroup],
    language: &str,
    line_margin: f32,
) -> Vec<BoundingBox> {
    let terms = relevant_terms(stems.keys(), &page.stems);
    let flat = flatten_word_boxes(&page.boxes, line_margin);
    let words: Vec<String> = flat.iter().map(|f| f.word.clone()).collect();
    let positions = find_synonym_positions(&words, synonyms, &page.stems, language);

    flat.into_iter()
        .enumerate()
        .filter(|(pos, f)| terms.contains_key(&f.word) || positions.contains_key(pos))
        .map(|(_, f)| f.bbox)
        .collect()
}

/// Band of the page around one word box.
///
/// The band spans the full page width and `padding` above and below the
/// word, grows to `min_height` around the word centre, and is shifted (then
/// clamped) to stay on the page.
fn word_region(
    word: &BoundingBox,
    width: f32,
    height: f32,
    padding: f32,
    min_height: f32,
) -> BoundingBox {
    let mut y0 = word.y0 - padding;
    let mut y1 = word.y1 + padding;
    if y1 - y0 < min_height {
        let center = (word.y0 + word.y1) / 2.0;
        y0 = center - min_height / 2.0;
        y1 = center + min_height / 2.0;
    }
    if y0 < 0.0 {
        y1 -= y0;
        y0 = 0.0;
    }
    if y1 > height {
        y0 -= y1 - height;
        y1 = height;
    }
    BoundingBox::new(0.0, width, y0.max(0.0), y1)
}

/// Merge word bands into snippet regions, top of the page first.
pub fn snippet_regions(
    words: &[BoundingBox],
    width: f32,
    height: f32,
    padding: f32,
    min_height: f32,
) -> Vec<BoundingBox> {
    let mut bands: Vec<BoundingBox> = words
        .iter()
        .filter(|w| !w.is_empty() && w.is_finite())
        .map(|w| word_region(w, width, height, padding, min_height))
        .collect();
    bands.sort_by(|a, b| b.y1.total_cmp(&a.y1));

    let mut regions: Vec<BoundingBox> = Vec::with_capacity(bands.len());
    for band in bands {
        match regions.last_mut() {
            Some(last) if band.y1 >= last.y0 => *last = last.union(&band),
            _ => regions.push(band),
        }
    }
    regions
}

/// Build the snippets of a hit.
///
/// Stems are language-gated against the hit language and stem-filtered;
/// synonym groups are gated and filtered the same way. A page without
/// metadata yields an empty entry.
pub fn build_query_snippets<S: PageStore + ?Sized>(
    store: &S,
    request: &SnippetRequest,
    config: &IndexConfig,
) -> Result<SnippetData> {
    let fields = &request.hit.fields;

    let mut stems = StemDescriptor::new();
    gate_stems(&request.stems, &fields.language, &request.stem_filters, &mut stems);
    let synonyms: Vec<SynonymGroup> = request
        .synonyms
        .iter()
        .filter(|group| language_admits(&group.languages, &fields.language))
        .cloned()
        .collect();
    let synonyms = filter_synonyms(&synonyms, &request.stem_filters);

    let snippets = match store.load(&fields.parent_doc, fields.page) {
        Ok(page) => {
            let words = matched_word_boxes(
                &page,
                &stems,
                &synonyms,
                &fields.language,
                config.line_margin,
            );
            let regions = snippet_regions(
                &words,
                page.dimensions.orig_width,
                page.dimensions.orig_height,
                config.snippet_padding,
                config.snippet_min_height,
            );
            log::debug!(
                "Snippets for {} page {}: {} matches in {} regions",
                fields.parent_doc,
                fields.page,
                words.len(),
                regions.len()
            );
            PageSnippets::from_regions(regions)
        },
        Err(e) if e.is_not_found() => {
            log::warn!("{}", e);
            PageSnippets::default()
        },
        Err(e) => return Err(e),
    };

    let mut data = SnippetData::new();
    data.entry(fields.parent_doc.clone())
        .or_default()
        .insert(fields.page, snippets);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Dimensions;
    use crate::layout::WordBoxIndex;
    use crate::search::query::StemInfo;
    use crate::store::MemoryPageStore;
    use crate::text::stem_words;

    fn page() -> PageData {
        let mut boxes = WordBoxIndex::new();
        let mut put = |w: &str, y0: f32| {
            boxes
                .entry(w.to_string())
                .or_default()
                .push(BoundingBox::new(10.0, 50.0, y0, y0 + 10.0));
        };
        put("running", 700.0);
        put("troops", 680.0);
        put("jumps", 400.0);
        put("running", 100.0);
        let stems = stem_words(boxes.keys(), "en");
        PageData {
            boxes,
            stems,
            dimensions: Dimensions {
                scale: 1.0,
                orig_width: 600.0,
                orig_height: 800.0,
            },
        }
    }

    fn stems(entries: &[(&str, &[&str])]) -> StemDescriptor {
        entries
            .iter()
            .map(|(stem, langs)| {
                (
                    stem.to_string(),
                    StemInfo {
                        languages: langs.iter().map(|s| s.to_string()).collect(),
                        terms: BTreeSet::new(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_word_region_min_height() {
        let word = BoundingBox::new(10.0, 50.0, 700.0, 710.0);
        let region = word_region(&word, 600.0, 800.0, 10.0, 40.0);
        assert_eq!(region, BoundingBox::new(0.0, 600.0, 685.0, 725.0));
    }

    #[test]
    fn test_word_region_clamped_to_page() {
        let word = BoundingBox::new(10.0, 50.0, 790.0, 800.0);
        let top = word_region(&word, 600.0, 800.0, 10.0, 40.0);
        assert_eq!(top, BoundingBox::new(0.0, 600.0, 760.0, 800.0));
        let word = BoundingBox::new(10.0, 50.0, 0.0, 10.0);
        let bottom = word_region(&word, 600.0, 800.0, 10.0, 40.0);
        assert_eq!(bottom, BoundingBox::new(0.0, 600.0, 0.0, 40.0));
    }

    #[test]
    fn test_overlapping_regions_merge() {
        let words = [
            BoundingBox::new(10.0, 50.0, 100.0, 110.0),
            BoundingBox::new(10.0, 50.0, 700.0, 710.0),
            BoundingBox::new(10.0, 50.0, 680.0, 690.0),
        ];
        let regions = snippet_regions(&words, 600.0, 800.0, 10.0, 40.0);
        assert_eq!(
            regions,
            vec![
                BoundingBox::new(0.0, 600.0, 665.0, 725.0),
                BoundingBox::new(0.0, 600.0, 85.0, 125.0),
            ]
        );
    }

    #[test]
    fn test_build_query_snippets() {
        let store = MemoryPageStore::new();
        store.save("doc", 4, &page()).unwrap();
        let request = SnippetRequest {
            hit: Hit::new("doc", 4, "en"),
            stems: stems(&[("run", &["en"]), ("", &["en"])]),
            synonyms: vec![SynonymGroup::new("army", ["army", "troops"])],
            stem_filters: BTreeSet::new(),
        };
        let data = build_query_snippets(&store, &request, &IndexConfig::default()).unwrap();
        let snippets = &data["doc"][&4];
        assert_eq!(snippets.boxes.len(), 2);
        assert_eq!(snippets.names.len(), 2);
        assert_ne!(snippets.names[0], snippets.names[1]);
        assert!(snippets.boxes[0].y0 > snippets.boxes[1].y1);
    }

    #[test]
    fn test_synonym_matches_inflected_word() {
        let mut boxes = WordBoxIndex::new();
        boxes.insert("armies".into(), vec![BoundingBox::new(10.0, 50.0, 300.0, 310.0)]);
        let stems_on_page = stem_words(boxes.keys(), "en");
        let store = MemoryPageStore::new();
        store
            .save(
                "doc",
                0,
                &PageData {
                    boxes,
                    stems: stems_on_page,
                    dimensions: page().dimensions,
                },
            )
            .unwrap();
        let request = SnippetRequest {
            hit: Hit::new("doc", 0, "en"),
            stems: StemDescriptor::new(),
            synonyms: vec![SynonymGroup::new("army", ["army"])],
            stem_filters: BTreeSet::new(),
        };
        let data = build_query_snippets(&store, &request, &IndexConfig::default()).unwrap();
        assert_eq!(data["doc"][&0].boxes, vec![BoundingBox::new(0.0, 600.0, 285.0, 325.0)]);
    }

    #[test]
    fn test_language_excluded_stems_yield_no_snippets() {
        let store = MemoryPageStore::new();
        store.save("doc", 0, &page()).unwrap();
        let request = SnippetRequest {
            hit: Hit::new("doc", 0, "en"),
            stems: stems(&[("run", &["fr"])]),
            synonyms: Vec::new(),
            stem_filters: BTreeSet::new(),
        };
        let data = build_query_snippets(&store, &request, &IndexConfig::default()).unwrap();
        assert!(data["doc"][&0].boxes.is_empty());
    }

    #[test]
    fn test_stem_filter_yields_no_snippets() {
        let store = MemoryPageStore::new();
        store.save("doc", 0, &page()).unwrap();
        let request = SnippetRequest {
            hit: Hit::new("doc", 0, "en"),
            stems: stems(&[("run", &["en"])]),
            synonyms: Vec::new(),
            stem_filters: ["run".to_string()].into_iter().collect(),
        };
        let data = build_query_snippets(&store, &request, &IndexConfig::default()).unwrap();
        assert!(data["doc"][&0].names.is_empty());
    }

    #[test]
    fn test_missing_page_is_empty_entry() {
        let store = MemoryPageStore::new();
        let request = SnippetRequest {
            hit: Hit::new("lost", 9, "en"),
            stems: stems(&[("run", &[])]),
            synonyms: Vec::new(),
            stem_filters: BTreeSet::new(),
        };
        let data = build_query_snippets(&store, &request, &IndexConfig::default()).unwrap();
        assert_eq!(data["lost"][&9], PageSnippets::default());
    }

    #[test]
    fn test_request_json_keys() {
        let json = r#"{
            "hit": {"id": "doc_0", "fields": {"parent_doc": "doc", "page": 0, "language": "en"}},
            "stems": {"run": {"languages": ["en"], "terms": ["running"]}},
            "synonyms": [{"mainTerm": "army", "terms": ["troops"]}],
            "stem-filters": ["corp"]
        }"#;
        let request: SnippetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.hit.fields.parent_doc, "doc");
        assert!(request.stem_filters.contains("corp"));
        assert_eq!(request.synonyms[0].main_term, "army");
    }
}
