//! Flattening of the Word Box Index into render-ready box lists.
//!
//! Two projections are supported:
//! - page mode: boxes as fractions of the page width/height
//! - snippet mode: boxes relative to a crop rectangle, in layout units
//!
//! Both keep reading order (top-to-bottom rows, left-to-right within a row),
//! which synonym matching relies on to find multi-word phrases.

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use crate::layout::WordBoxIndex;
use serde::{Deserialize, Serialize};

/// One word occurrence with its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatBox {
    /// Lower-cased word
    pub word: String,
    /// Box in the target coordinate space
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl FlatBox {
    /// Create a flat box.
    pub fn new(word: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            word: word.into(),
            bbox,
        }
    }

    /// Undo page-mode normalization.
    pub fn to_page_units(&self, width: f32, height: f32) -> FlatBox {
        FlatBox::new(self.word.clone(), self.bbox.denormalized(width, height))
    }
}

/// Sort boxes into reading order.
///
/// Layout coordinates have their origin at the bottom-left, so higher rows
/// have larger `y0`. Boxes whose `y0` lies within `line_margin` of the first
/// box of a row belong to that row.
pub fn sort_reading_order(boxes: &mut [FlatBox], line_margin: f32) {
    boxes.sort_by(|a, b| {
        b.bbox
            .y0
            .total_cmp(&a.bbox.y0)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut row_start = 0;
    while row_start < boxes.len() {
        let anchor = boxes[row_start].bbox.y0;
        let mut row_end = row_start + 1;
        while row_end < boxes.len() && anchor - boxes[row_end].bbox.y0 <= line_margin {
            row_end += 1;
        }
        boxes[row_start..row_end].sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        row_start = row_end;
    }
}

/// Flatten the index in layout units, in reading order.
pub fn flatten_word_boxes(boxes: &WordBoxIndex, line_margin: f32) -> Vec<FlatBox> {
    let mut flat: Vec<FlatBox> = boxes
        .iter()
        .flat_map(|(word, word_boxes)| {
            word_boxes
                .iter()
                .filter(|b| !b.is_empty())
                .map(move |b| FlatBox::new(word.clone(), *b))
        })
        .collect();
    sort_reading_order(&mut flat, line_margin);
    flat
}

/// Page mode: boxes as fractions of `(width, height)`.
pub fn flatten_bounding_boxes(
    boxes: &WordBoxIndex,
    width: f32,
    height: f32,
    line_margin: f32,
) -> Result<Vec<FlatBox>> {
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(Error::InvalidBox(format!(
            "page dimensions {}x{} cannot be used for normalization",
            width, height
        )));
    }

    Ok(flatten_word_boxes(boxes, line_margin)
        .into_iter()
        .map(|flat| FlatBox::new(flat.word, flat.bbox.normalized(width, height)))
        .collect())
}

/// Snippet mode: boxes relative to the crop rectangle.
///
/// A box is kept iff its centre lies inside the crop; kept boxes are clipped
/// to the crop and translated so the crop origin is `(0, 0)`.
pub fn flatten_snippet_bounding_boxes(
    boxes: &WordBoxIndex,
    crop: &BoundingBox,
    line_margin: f32,
) -> Result<Vec<FlatBox>> {
    if !crop.is_finite() || crop.width() <= 0.0 || crop.height() <= 0.0 {
        return Err(Error::InvalidBox(format!("degenerate crop rectangle {:?}", crop)));
    }

    Ok(flatten_word_boxes(boxes, line_margin)
        .into_iter()
        .filter_map(|flat| {
            flat.bbox
                .relative_to(crop)
                .map(|bbox| FlatBox::new(flat.word, bbox))
        })
        .collect())
}
