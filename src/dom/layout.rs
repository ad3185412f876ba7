use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::types::{LayoutBox, NodeData, NodeId};
use crate::toc::heading_level;

/// Elements laid out as blocks; everything else flows inline
const BLOCK_ELEMENTS: [&str; 30] = [
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "html", "li",
    "main", "nav", "ol", "p", "pre", "section", "ul",
];

/// Tags that count as table rows for layout purposes
const ROW_ELEMENTS: [&str; 4] = ["table", "tr", "thead", "tbody"];

/// Metrics for the block-flow approximation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowMetrics {
    /// Height of one line of body text
    pub line_height: f64,
    /// Characters that fit on one line before wrapping
    pub chars_per_line: usize,
    /// Vertical gap after each leaf block
    pub block_gap: f64,
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            chars_per_line: 80,
            block_gap: 16.0,
        }
    }
}

impl FlowMetrics {
    /// Line-height multiplier for a heading rank
    fn heading_scale(rank: u8) -> f64 {
        match rank {
            1 => 2.0,
            2 => 1.6,
            3 => 1.35,
            4 => 1.2,
            _ => 1.0,
        }
    }
}

fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag) || ROW_ELEMENTS.contains(&tag)
}

/// Assign document-relative boxes to every node with a simple block flow.
///
/// Leaf blocks take as many lines as their text needs; container blocks span
/// their children; inline nodes share the box of the block that holds them.
/// Returns the total content height.
pub fn flow_layout(doc: &mut Document, metrics: &FlowMetrics) -> f64 {
    let root = doc.root();
    let height = layout_block(doc, root, 0.0, metrics);
    doc.set_layout_box(root, LayoutBox::new(0.0, height));
    height
}

fn has_block_child(doc: &Document, id: NodeId) -> bool {
    doc.children(id)
        .iter()
        .any(|child| doc.tag_name(*child).map(is_block).unwrap_or(false))
}

fn layout_block(doc: &mut Document, id: NodeId, top: f64, metrics: &FlowMetrics) -> f64 {
    let is_document = matches!(doc.data(id), Some(NodeData::Document));

    if !is_document && !has_block_child(doc, id) {
        let text = doc.text_content(id);
        let chars = text.split_whitespace().map(|w| w.chars().count() + 1).sum::<usize>();
        let lines = chars.div_ceil(metrics.chars_per_line.max(1)).max(1) as f64;
        let scale = doc
            .tag_name(id)
            .and_then(heading_level)
            .map(FlowMetrics::heading_scale)
            .unwrap_or(1.0);
        let height = lines * metrics.line_height * scale;
        assign_subtree(doc, id, LayoutBox::new(top, height));
        return height + metrics.block_gap;
    }

    let mut cursor = top;
    let mut inline_run = false;
    for child in doc.children(id).to_vec() {
        let block = doc.tag_name(child).map(is_block).unwrap_or(false);
        if block {
            if inline_run {
                cursor += metrics.line_height;
                inline_run = false;
            }
            let used = layout_block(doc, child, cursor, metrics);
            cursor += used;
        } else {
            let has_text = !doc.text_content(child).trim().is_empty();
            assign_subtree(doc, child, LayoutBox::new(cursor, metrics.line_height));
            inline_run |= has_text;
        }
    }
    if inline_run {
        cursor += metrics.line_height;
    }
    let height = cursor - top;
    doc.set_layout_box(id, LayoutBox::new(top, height));
    height
}

fn assign_subtree(doc: &mut Document, id: NodeId, layout: LayoutBox) {
    doc.set_layout_box(id, layout);
    for node in doc.descendants(id) {
        doc.set_layout_box(node, layout);
    }
}
