//! Integration tests for word segmentation and page indexing.
//!
//! These tests build layout trees the way a PDF layout analyser emits them
//! (text boxes holding lines holding characters and space markers) and check
//! the resulting Word Box Index and page metadata.

use page_highlight::geometry::BoundingBox;
use page_highlight::layout::{extract_word_boxes, LayoutNode, PageInput, PageLayout};
use page_highlight::{index_page, Error};

// ============================================================================
// Helper Functions for Creating Mock Data
// ============================================================================

const CHAR_WIDTH: f32 = 6.0;

/// Character nodes for `text` starting at `x`, with a space marker between
/// words. Returns the nodes and the x position after the last character.
fn mock_chars(text: &str, x: f32, y: f32) -> (Vec<LayoutNode>, f32) {
    let mut nodes = Vec::new();
    let mut x = x;
    for c in text.chars() {
        if c == ' ' {
            nodes.push(LayoutNode::space());
        } else {
            nodes.push(LayoutNode::char(
                c.to_string(),
                BoundingBox::new(x, x + CHAR_WIDTH, y, y + 10.0),
            ));
        }
        x += CHAR_WIDTH;
    }
    (nodes, x)
}

fn mock_line(text: &str, x: f32, y: f32) -> LayoutNode {
    LayoutNode::line(mock_chars(text, x, y).0)
}

fn mock_page(children: Vec<LayoutNode>) -> PageLayout {
    PageLayout::new(612.0, 792.0, children)
}

// ============================================================================
// Segmentation
// ============================================================================

#[test]
fn test_signal_corps_scenario() {
    let line = LayoutNode::line(vec![
        LayoutNode::char("S", BoundingBox::new(10.0, 17.0, 700.0, 712.0)),
        LayoutNode::char("i", BoundingBox::new(17.0, 20.0, 700.0, 712.0)),
        LayoutNode::char("g", BoundingBox::new(20.0, 26.0, 697.0, 709.0)),
        LayoutNode::char("n", BoundingBox::new(26.0, 32.0, 700.0, 709.0)),
        LayoutNode::char("a", BoundingBox::new(32.0, 38.0, 700.0, 709.0)),
        LayoutNode::char("l", BoundingBox::new(38.0, 41.0, 700.0, 713.0)),
        LayoutNode::space(),
        LayoutNode::char("C", BoundingBox::new(45.0, 52.0, 700.0, 712.0)),
        LayoutNode::char("o", BoundingBox::new(52.0, 58.0, 700.0, 709.0)),
        LayoutNode::char("r", BoundingBox::new(58.0, 62.0, 700.0, 709.0)),
        LayoutNode::char("p", BoundingBox::new(62.0, 68.0, 697.0, 709.0)),
        LayoutNode::char("s", BoundingBox::new(68.0, 73.0, 700.0, 709.0)),
    ]);
    let index = extract_word_boxes(&mock_page(vec![LayoutNode::container(vec![line])]));

    assert_eq!(index.len(), 2);
    assert_eq!(index["signal"], vec![BoundingBox::new(10.0, 41.0, 697.0, 713.0)]);
    assert_eq!(index["corps"], vec![BoundingBox::new(45.0, 73.0, 697.0, 712.0)]);
}

#[test]
fn test_words_do_not_span_lines() {
    let page = mock_page(vec![LayoutNode::container(vec![
        mock_line("sig", 10.0, 700.0),
        mock_line("nal", 10.0, 680.0),
    ])]);
    let index = extract_word_boxes(&page);
    assert!(index.contains_key("sig"));
    assert!(index.contains_key("nal"));
    assert!(!index.contains_key("signal"));
}

#[test]
fn test_last_word_of_line_is_kept() {
    let page = mock_page(vec![mock_line("the end", 10.0, 700.0)]);
    let index = extract_word_boxes(&page);
    assert!(index.contains_key("end"));
}

#[test]
fn test_punctuation_splits_but_joiners_stay() {
    let page = mock_page(vec![mock_line("well-known, R&D a/b.", 10.0, 700.0)]);
    let index = extract_word_boxes(&page);
    let words: Vec<&str> = index.keys().map(String::as_str).collect();
    assert_eq!(words, vec!["well-known", "r&d", "a/b"]);
}

#[test]
fn test_only_excluded_characters_produce_nothing() {
    let page = mock_page(vec![mock_line("... ,;: !?", 10.0, 700.0)]);
    assert!(extract_word_boxes(&page).is_empty());
}

#[test]
fn test_repeated_word_collects_all_boxes() {
    let page = mock_page(vec![
        mock_line("the cat", 10.0, 700.0),
        mock_line("The dog", 10.0, 680.0),
    ]);
    let index = extract_word_boxes(&page);
    assert_eq!(index["the"].len(), 2);
    assert_eq!(index["the"][0].y0, 700.0);
    assert_eq!(index["the"][1].y0, 680.0);
}

#[test]
fn test_non_latin_letters() {
    let page = mock_page(vec![mock_line("Straße für Übung", 10.0, 700.0)]);
    let index = extract_word_boxes(&page);
    assert!(index.contains_key("straße"));
    assert!(index.contains_key("für"));
    assert!(index.contains_key("übung"));
}

#[test]
fn test_layout_json_contract() {
    let json = r#"{
        "width": 612.0,
        "height": 792.0,
        "children": [
            {"type": "container", "children": [
                {"type": "line", "children": [
                    {"type": "char", "text": "O", "bbox": [0.0, 6.0, 0.0, 10.0]},
                    {"type": "char", "text": "k", "bbox": [6.0, 11.0, 0.0, 10.0]},
                    {"type": "anno", "text": " "}
                ]}
            ]}
        ]
    }"#;
    let page: PageLayout = serde_json::from_str(json).unwrap();
    let index = extract_word_boxes(&page);
    assert_eq!(index["ok"], vec![BoundingBox::new(0.0, 11.0, 0.0, 10.0)]);
}

// ============================================================================
// Page Indexing
// ============================================================================

#[test]
fn test_index_page_metadata() {
    let input = PageInput {
        layout: mock_page(vec![
            mock_line("Running runs", 10.0, 700.0),
            mock_line("run jumps", 10.0, 680.0),
        ]),
        image_width: 1224.0,
        language: "en".to_string(),
    };
    let data = index_page(&input).unwrap();

    assert_eq!(data.dimensions.scale, 2.0);
    assert_eq!(data.dimensions.orig_width, 612.0);
    assert_eq!(data.dimensions.orig_height, 792.0);
    assert_eq!(data.stems["run"], vec!["run", "running", "runs"]);
    assert_eq!(data.stems["jump"], vec!["jumps"]);
    assert_eq!(data.occurrence_count(), 4);
    assert_eq!(data.words(2.0), vec!["running", "runs", "run", "jumps"]);

    let scaled = data.scaled_boxes();
    assert_eq!(scaled["run"][0], data.boxes["run"][0].scaled(2.0));
}

#[test]
fn test_index_page_rejects_bad_layout() {
    let input = PageInput {
        layout: PageLayout::new(0.0, 792.0, Vec::new()),
        image_width: 1224.0,
        language: "en".to_string(),
    };
    assert!(matches!(index_page(&input), Err(Error::InvalidLayout(_))));
}

#[test]
fn test_index_page_unknown_language_falls_back() {
    let input = PageInput {
        layout: mock_page(vec![mock_line("running", 10.0, 700.0)]),
        image_width: 612.0,
        language: "un".to_string(),
    };
    let data = index_page(&input).unwrap();
    assert_eq!(data.stems["run"], vec!["running"]);
}
