use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::content::{ContentRoot, ResolvedContent};
use crate::dom::{Document, NodeId};
use crate::toc::types::{ElementRef, Epoch, HeadingDescriptor};
use crate::utils::error::ViewerError;

lazy_static! {
    // Anything that is neither an ASCII word character nor a CJK ideograph
    static ref NON_ID_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_\x{4e00}-\x{9fff}]+").unwrap();
}

/// Heading rank for a tag name (`h1` -> 1 ... `h6` -> 6)
pub fn heading_level(tag: &str) -> Option<u8> {
    let bytes = tag.as_bytes();
    match bytes {
        [b'h' | b'H', rank @ b'1'..=b'6'] => Some(rank - b'0'),
        _ => None,
    }
}

/// Generate an anchor id for a heading without one.
///
/// Lowercases the text, collapses runs of characters that are neither ASCII
/// word characters nor CJK ideographs into a single hyphen, trims hyphens
/// from both ends and suffixes the heading's position.
pub fn generate_heading_id(text: &str, index: usize) -> String {
    let lowered = text.to_lowercase();
    let collapsed = NON_ID_CHARS.replace_all(&lowered, "-");
    let base = collapsed.trim_matches('-');

    if base.is_empty() {
        format!("heading-{}", index)
    } else {
        format!("heading-{}-{}", base, index)
    }
}

/// Extract headings from a content root.
///
/// Unreadable roots yield `ContentUnavailable`, which callers treat exactly
/// like a document without headings.
pub fn extract_headings(
    root: &ContentRoot,
    levels: &[String],
    epoch: Epoch,
) -> Result<Vec<HeadingDescriptor>, ViewerError> {
    let content = root.resolve()?;
    extract_resolved(&content, levels, epoch)
}

/// Extract headings from already-resolved content
pub fn extract_resolved(
    content: &ResolvedContent,
    levels: &[String],
    epoch: Epoch,
) -> Result<Vec<HeadingDescriptor>, ViewerError> {
    let mut doc = content
        .document
        .try_borrow_mut()
        .map_err(|_| ViewerError::ContentUnavailable("content document is busy".to_string()))?;
    Ok(extract_from_document(&mut doc, content.scope, levels, epoch))
}

/// Collect the headings under `scope` in document order, assigning ids
/// to headings that lack one.
pub fn extract_from_document(
    doc: &mut Document,
    scope: NodeId,
    levels: &[String],
    epoch: Epoch,
) -> Vec<HeadingDescriptor> {
    let mut nodes: Vec<(NodeId, u8)> = doc
        .query_tags(scope, levels)
        .into_iter()
        .filter_map(|node| doc.tag_name(node).and_then(heading_level).map(|level| (node, level)))
        .collect();
    nodes.sort_by(|(a, _), (b, _)| doc.compare_document_position(*a, *b));

    let document = doc.id();
    let mut headings = Vec::with_capacity(nodes.len());

    for (index, (node, level)) in nodes.into_iter().enumerate() {
        let text = doc.text_content(node).trim().to_string();

        let id = match doc.element_id(node) {
            Some(existing) => existing.to_string(),
            None => {
                let generated = generate_heading_id(&text, index);
                doc.set_element_id(node, &generated);
                generated
            }
        };

        headings.push(HeadingDescriptor {
            id,
            text,
            level,
            index,
            element: ElementRef { node, document, epoch },
        });
    }

    debug!("Extracted {} heading(s) from {}", headings.len(), document);
    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::EmbeddedFrame;
    use crate::config::defaults::default_toc_levels as default_levels;
    use std::rc::Rc;

    fn extract(html: &str) -> (Document, Vec<HeadingDescriptor>) {
        let mut doc = Document::parse("https://notes.local", html);
        let root = doc.root();
        let headings = extract_from_document(&mut doc, root, &default_levels(), Epoch(1));
        (doc, headings)
    }

    #[test]
    fn test_generate_heading_id() {
        assert_eq!(generate_heading_id("Getting Started!", 2), "heading-getting-started-2");
        assert_eq!(generate_heading_id("  --Hello,   World--  ", 0), "heading-hello-world-0");
        assert_eq!(generate_heading_id("snake_case stays", 4), "heading-snake_case-stays-4");
        assert_eq!(generate_heading_id("快速 开始", 1), "heading-快速-开始-1");
        assert_eq!(generate_heading_id("!!!", 7), "heading-7");
        assert_eq!(generate_heading_id("", 3), "heading-3");
        // Accented letters are not ASCII word characters
        assert_eq!(generate_heading_id("Café Menu", 5), "heading-caf-menu-5");
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("H6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn test_document_order_not_tag_order() {
        let (_, headings) = extract(
            "<h3>Deep</h3><section><h1>Top</h1><div><h2>Mid</h2></div></section><h6>Tail</h6>",
        );
        let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
        let indices: Vec<usize> = headings.iter().map(|h| h.index).collect();

        assert_eq!(texts, vec!["Deep", "Top", "Mid", "Tail"]);
        assert_eq!(levels, vec![3, 1, 2, 6]);
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_existing_ids_reused_and_missing_ids_written_back() {
        let (doc, headings) = extract("<h1 id=\"a\">Intro</h1><h2>Details</h2>");

        assert_eq!(headings[0].id, "a");
        assert_eq!(headings[0].text, "Intro");
        assert_eq!(headings[1].id, "heading-details-1");
        assert_eq!(headings[1].level, 2);
        assert_eq!(doc.element_id(headings[1].element.node), Some("heading-details-1"));
    }

    #[test]
    fn test_duplicate_existing_ids_are_not_rewritten() {
        let (_, headings) = extract("<h2 id=\"dup\">One</h2><h2 id=\"dup\">Two</h2>");
        assert_eq!(headings[0].id, "dup");
        assert_eq!(headings[1].id, "dup");
    }

    #[test]
    fn test_text_is_trimmed_and_flattened() {
        let (_, headings) = extract("<h2>\n   <em>Nested</em> <code>text</code>   </h2>");
        assert_eq!(headings[0].text, "Nested text");
        assert_eq!(headings[0].id, "heading-nested-text-0");
    }

    #[test]
    fn test_no_headings_is_empty() {
        let (_, headings) = extract("<p>Just prose.</p>");
        assert!(headings.is_empty());
    }

    #[test]
    fn test_configured_levels_only() {
        let mut doc = Document::parse("o", "<h1>A</h1><h2>B</h2><h3>C</h3>");
        let root = doc.root();
        let levels = vec!["h2".to_string(), "h3".to_string()];
        let headings = extract_from_document(&mut doc, root, &levels, Epoch(1));
        let ids: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["heading-b-0", "heading-c-1"]);
    }

    #[test]
    fn test_unreadable_frame_is_content_unavailable() {
        let frame = Rc::new(EmbeddedFrame::new("content", "https://notes.local"));
        frame.load_html("https://other.example", "<h1>Hidden</h1>");
        let root = ContentRoot::embedded(frame);

        let err = extract_headings(&root, &default_levels(), Epoch(1)).unwrap_err();
        assert!(err.is_content_unavailable());
    }

    #[test]
    fn test_inline_scope_limits_extraction() {
        let doc = Document::parse(
            "o",
            "<nav><h2>Sidebar</h2></nav><main id=\"note\"><h1>Body</h1></main>",
        )
        .into_shared();
        let container = doc.borrow().get_element_by_id(None, "note").unwrap();
        let root = ContentRoot::inline(doc, container);

        let headings = extract_headings(&root, &default_levels(), Epoch(1)).unwrap();
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Body");
    }
}
