//! Per-page metadata built at ingestion time.
//!
//! A page is indexed into its Word Box Index, the stem index of the words on
//! the page, and the dimensions needed to project boxes into image space.

use crate::error::{Error, Result};
use crate::layout::{extract_word_boxes, PageInput, WordBoxIndex};
use crate::search::flatten::flatten_word_boxes;
use crate::text::{stem_words, StemIndex};
use serde::{Deserialize, Serialize};

/// Page dimensions persisted with the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Rasterized image width divided by layout width
    pub scale: f32,
    /// Layout width
    pub orig_width: f32,
    /// Layout height
    pub orig_height: f32,
}

/// Persisted metadata of one page. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// Word → boxes (layout units)
    pub boxes: WordBoxIndex,
    /// Stem → distinct page words
    pub stems: StemIndex,
    /// Page dimensions
    pub dimensions: Dimensions,
}

impl PageData {
    /// Word Box Index multiplied by `dimensions.scale` (image pixels).
    pub fn scaled_boxes(&self) -> WordBoxIndex {
        let scale = self.dimensions.scale;
        self.boxes
            .iter()
            .map(|(word, boxes)| (word.clone(), boxes.iter().map(|b| b.scaled(scale)).collect()))
            .collect()
    }

    /// Every word occurrence of the page in reading order.
    pub fn words(&self, line_margin: f32) -> Vec<String> {
        flatten_word_boxes(&self.boxes, line_margin)
            .into_iter()
            .map(|flat| flat.word)
            .collect()
    }

    /// Number of word occurrences on the page.
    pub fn occurrence_count(&self) -> usize {
        self.boxes.values().map(Vec::len).sum()
    }
}

/// Index one page: segment words, stem them and record dimensions.
pub fn index_page(input: &PageInput) -> Result<PageData> {
    input.layout.validate()?;
    if !(input.image_width.is_finite() && input.image_width > 0.0) {
        return Err(Error::InvalidLayout(format!(
            "image width is {}",
            input.image_width
        )));
    }

    let boxes = extract_word_boxes(&input.layout);
    let stems = stem_words(boxes.keys(), &input.language);
    log::debug!(
        "Indexed page: {} words, {} stems, language '{}'",
        boxes.len(),
        stems.len(),
        input.language
    );

    Ok(PageData {
        boxes,
        stems,
        dimensions: Dimensions {
            scale: input.image_width / input.layout.width,
            orig_width: input.layout.width,
            orig_height: input.layout.height,
        },
    })
}
