//! Page layout tree as produced by a PDF layout analyser.
//!
//! A page holds containers (text boxes) which hold text lines, and lines hold
//! the characters and non-character markers (inter-word spaces, etc.) in
//! reading order.

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// A node of the page layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutNode {
    /// Grouping element such as a text box or figure
    Container {
        /// Nested nodes
        children: Vec<LayoutNode>,
    },
    /// One text line
    Line {
        /// Line elements in reading order
        children: Vec<LayoutNode>,
    },
    /// A positioned character
    Char {
        /// Decoded text (usually one character, ligatures may carry more)
        text: String,
        /// Character bounding box in layout units
        bbox: BoundingBox,
    },
    /// A non-positioned marker, e.g. a virtual space between words
    Anno {
        /// Marker text
        text: String,
    },
}

impl LayoutNode {
    /// Shorthand for a character node.
    pub fn char(text: impl Into<String>, bbox: BoundingBox) -> Self {
        LayoutNode::Char {
            text: text.into(),
            bbox,
        }
    }

    /// Shorthand for a space marker.
    pub fn space() -> Self {
        LayoutNode::Anno {
            text: " ".to_string(),
        }
    }

    /// Shorthand for a line.
    pub fn line(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Line { children }
    }

    /// Shorthand for a container.
    pub fn container(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Container { children }
    }
}

/// Layout of one PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width in layout units
    pub width: f32,
    /// Page height in layout units
    pub height: f32,
    /// Top-level nodes
    #[serde(default)]
    pub children: Vec<LayoutNode>,
}

impl PageLayout {
    /// Create a page layout.
    pub fn new(width: f32, height: f32, children: Vec<LayoutNode>) -> Self {
        Self {
            width,
            height,
            children,
        }
    }

    /// Check that the page dimensions are usable as divisors.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidLayout(format!("page width is {}", self.width)));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::InvalidLayout(format!("page height is {}", self.height)));
        }
        Ok(())
    }

    /// Collect every text line of the page in document order.
    ///
    /// Containers are walked with an explicit stack, so arbitrarily deep
    /// nesting cannot overflow the call stack. Lines nested inside lines are
    /// not descended into; characters outside any line are ignored.
    pub fn lines(&self) -> Vec<&[LayoutNode]> {
        let mut lines = Vec::new();
        let mut stack = vec![self.children.iter()];

        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                Some(LayoutNode::Container { children }) => stack.push(children.iter()),
                Some(LayoutNode::Line { children }) => lines.push(children.as_slice()),
                Some(_) => {},
                None => {
                    stack.pop();
                },
            }
        }

        lines
    }

    /// Reconstruct the plain text of the page, one line per text line.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in self.lines() {
            for elem in line {
                match elem {
                    LayoutNode::Char { text: t, .. } | LayoutNode::Anno { text: t } => {
                        text.push_str(t)
                    },
                    _ => {},
                }
            }
            if !text.ends_with('\n') {
                text.push('\n');
            }
        }
        text
    }
}

/// Everything needed to index one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    /// Layout tree of the page
    pub layout: PageLayout,
    /// Width in pixels of the rasterized page image
    pub image_width: f32,
    /// Detected two-letter language code of the page text
    #[serde(default)]
    pub language: String,
}

/// Layout of a whole document, one entry per page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Document identifier (file stem)
    #[serde(default)]
    pub document_id: String,
    /// Pages in order; the index is the page number
    pub pages: Vec<PageInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: &str, x: f32) -> LayoutNode {
        LayoutNode::char(c, BoundingBox::new(x, x + 5.0, 100.0, 110.0))
    }

    #[test]
    fn test_lines_in_document_order() {
        let page = PageLayout::new(
            600.0,
            800.0,
            vec![
                LayoutNode::container(vec![
                    LayoutNode::line(vec![ch("a", 0.0)]),
                    LayoutNode::container(vec![LayoutNode::line(vec![ch("b", 0.0)])]),
                ]),
                LayoutNode::line(vec![ch("c", 0.0)]),
                ch("stray", 0.0),
            ],
        );

        let lines = page.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], &[ch("a", 0.0)][..]);
        assert_eq!(lines[1], &[ch("b", 0.0)][..]);
        assert_eq!(lines[2], &[ch("c", 0.0)][..]);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut node = LayoutNode::line(vec![ch("x", 0.0)]);
        for _ in 0..1_000 {
            node = LayoutNode::container(vec![node]);
        }
        let page = PageLayout::new(10.0, 10.0, vec![node]);
        assert_eq!(page.lines().len(), 1);
    }

    #[test]
    fn test_text() {
        let page = PageLayout::new(
            600.0,
            800.0,
            vec![LayoutNode::container(vec![
                LayoutNode::line(vec![ch("H", 0.0), ch("i", 5.0), LayoutNode::space()]),
                LayoutNode::line(vec![ch("y", 0.0), ch("o", 5.0)]),
            ])],
        );
        assert_eq!(page.text(), "Hi \nyo\n");
    }

    #[test]
    fn test_validate() {
        assert!(PageLayout::new(612.0, 792.0, vec![]).validate().is_ok());
        assert!(PageLayout::new(0.0, 792.0, vec![]).validate().is_err());
        assert!(PageLayout::new(612.0, f32::NAN, vec![]).validate().is_err());
    }

    #[test]
    fn test_deserialize_tagged_nodes() {
        let json = r#"{
            "width": 612.0,
            "height": 792.0,
            "children": [
                {"type": "container", "children": [
                    {"type": "line", "children": [
                        {"type": "char", "text": "A", "bbox": [1.0, 2.0, 3.0, 4.0]},
                        {"type": "anno", "text": " "}
                    ]}
                ]}
            ]
        }"#;
        let page: PageLayout = serde_json::from_str(json).unwrap();
        let lines = page.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0], LayoutNode::char("A", BoundingBox::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(lines[0][1], LayoutNode::space());
    }
}
