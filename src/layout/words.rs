//! Character-to-word segmentation.
//!
//! Words are built line by line from the character elements of a page. A
//! character joins the current word if it is alphanumeric or one of `-`, `&`,
//! `/`; anything else (punctuation, space markers, non-character elements)
//! ends the word. The word's box is the union of its characters' boxes.

use crate::geometry::BoundingBox;
use crate::layout::tree::{LayoutNode, PageLayout};
use indexmap::IndexMap;

/// Lower-cased word → one box per occurrence, in first-occurrence order.
pub type WordBoxIndex = IndexMap<String, Vec<BoundingBox>>;

const INCLUDED_PUNCTUATION: [&str; 3] = ["-", "&", "/"];

/// Whether a character's text may be part of a word.
///
/// # Examples
///
/// ```
/// use page_highlight::layout::is_word_char;
///
/// assert!(is_word_char("a"));
/// assert!(is_word_char("7"));
/// assert!(is_word_char("&"));
/// assert!(!is_word_char(" "));
/// assert!(!is_word_char("."));
/// ```
pub fn is_word_char(text: &str) -> bool {
    if text == " " {
        return false;
    }
    INCLUDED_PUNCTUATION.contains(&text)
        || (!text.is_empty() && text.chars().all(char::is_alphanumeric))
}

/// Running state for the word currently being assembled on a line.
#[derive(Debug, Default)]
struct WordAccumulator {
    word: String,
    bbox: BoundingBox,
}

impl WordAccumulator {
    fn push(&mut self, text: &str, bbox: &BoundingBox) {
        self.word.push_str(text);
        self.bbox.expand(bbox);
    }

    /// Store the buffered word (if any) and reset.
    fn flush(&mut self, index: &mut WordBoxIndex) {
        if !self.word.is_empty() && !self.bbox.is_empty() {
            index
                .entry(self.word.to_lowercase())
                .or_default()
                .push(self.bbox);
        }
        self.word.clear();
        self.bbox = BoundingBox::empty();
    }
}

/// Add the words of one text line to `index`.
///
/// A word still buffered when the line ends is flushed as well, so the last
/// word of a line is never lost.
pub fn extract_line_word_boxes(line: &[LayoutNode], index: &mut WordBoxIndex) {
    let mut acc = WordAccumulator::default();

    for elem in line {
        match elem {
            LayoutNode::Char { text, bbox } if is_word_char(text) => acc.push(text, bbox),
            _ => acc.flush(index),
        }
    }
    acc.flush(index);
}

/// Build the Word Box Index of a page.
///
/// # Examples
///
/// ```
/// use page_highlight::geometry::BoundingBox;
/// use page_highlight::layout::{extract_word_boxes, LayoutNode, PageLayout};
///
/// let line = LayoutNode::line(vec![
///     LayoutNode::char("O", BoundingBox::new(0.0, 5.0, 0.0, 10.0)),
///     LayoutNode::char("k", BoundingBox::new(5.0, 9.0, 0.0, 9.0)),
/// ]);
/// let page = PageLayout::new(100.0, 100.0, vec![line]);
/// let index = extract_word_boxes(&page);
/// assert_eq!(index["ok"], vec![BoundingBox::new(0.0, 9.0, 0.0, 10.0)]);
/// ```
pub fn extract_word_boxes(layout: &PageLayout) -> WordBoxIndex {
    let mut index = WordBoxIndex::new();
    for line in layout.lines() {
        extract_line_word_boxes(line, &mut index);
    }
    log::trace!("Segmented {} distinct words", index.len());
    index
}
