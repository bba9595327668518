//! Page layout input and word segmentation.
//!
//! This module provides:
//! - The layout tree data contract (containers → lines → characters)
//! - Character-to-word segmentation into a Word Box Index

pub mod tree;
pub mod words;

// Re-export main types
pub use tree::{DocumentLayout, LayoutNode, PageInput, PageLayout};
pub use words::{extract_line_word_boxes, extract_word_boxes, is_word_char, WordBoxIndex};
