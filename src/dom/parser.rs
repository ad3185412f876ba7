use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::dom::document::Document;
use crate::dom::types::NodeId;

lazy_static! {
    // Comments, doctype/processing instructions, or a start/end tag
    static ref TOKEN_REGEX: Regex = Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#
    ).unwrap();

    static ref ATTR_REGEX: Regex = Regex::new(
        r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#
    ).unwrap();
}

/// Elements that never have children
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is not markup
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Parse an attribute string into ordered key/value pairs
pub fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTR_REGEX
        .captures_iter(raw)
        .map(|cap| {
            let name = cap[1].to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn push_text(doc: &mut Document, parent: NodeId, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let text = html_escape::decode_html_entities(raw);
    let node = doc.create_text(&text);
    let _ = doc.append_child(parent, node);
}

/// Parse a markup fragment and append the resulting nodes under `parent`.
///
/// Tolerant of sloppy markup: unknown end tags are ignored, an end tag closes
/// every element opened after its matching start tag, and anything still open
/// at the end is closed implicitly.
pub fn parse_into(doc: &mut Document, parent: NodeId, html: &str) {
    let mut open: Vec<(String, NodeId)> = Vec::new();
    let mut cursor = 0;
    let mut raw_text_until: Option<String> = None;

    for cap in TOKEN_REGEX.captures_iter(html) {
        let whole = match cap.get(0) {
            Some(m) => m,
            None => continue,
        };
        let current = open.last().map(|(_, id)| *id).unwrap_or(parent);

        if let Some(raw_tag) = &raw_text_until {
            // Inside <script>/<style>: only the matching end tag counts
            let is_close = cap.get(1).map(|m| m.as_str() == "/").unwrap_or(false);
            let closes = is_close
                && cap.get(2).map(|m| m.as_str().eq_ignore_ascii_case(raw_tag)).unwrap_or(false);
            if !closes {
                continue;
            }
            raw_text_until = None;
            open.pop();
            cursor = whole.end();
            continue;
        }

        push_text(doc, current, &html[cursor..whole.start()]);
        cursor = whole.end();

        let tag = match cap.get(2) {
            Some(m) => m.as_str().to_ascii_lowercase(),
            None => continue, // comment, doctype or processing instruction
        };

        if &cap[1] == "/" {
            if let Some(pos) = open.iter().rposition(|(name, _)| *name == tag) {
                open.truncate(pos);
            } else {
                debug!("Ignoring unmatched end tag </{}>", tag);
            }
            continue;
        }

        let element = doc.create_element(&tag);
        for (name, value) in parse_attributes(&cap[3]) {
            doc.set_attribute(element, &name, &value);
        }
        let _ = doc.append_child(current, element);

        let self_closing = &cap[4] == "/";
        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            continue;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            raw_text_until = Some(tag.clone());
        }
        open.push((tag, element));
    }

    if raw_text_until.is_none() {
        let current = open.last().map(|(_, id)| *id).unwrap_or(parent);
        push_text(doc, current, &html[cursor..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#" id="intro" class='lead big' data-x=5 hidden title="a &amp; b""#);
        assert_eq!(
            attrs,
            vec![
                ("id".to_string(), "intro".to_string()),
                ("class".to_string(), "lead big".to_string()),
                ("data-x".to_string(), "5".to_string()),
                ("hidden".to_string(), String::new()),
                ("title".to_string(), "a & b".to_string()),
            ]
        );
    }

    #[test]
    fn test_entities_decoded_in_text() {
        let doc = Document::parse("o", "<h1>Fish &amp; Chips &lt;3</h1>");
        let h1 = doc.query_tags(doc.root(), &["h1".to_string()])[0];
        assert_eq!(doc.text_content(h1), "Fish & Chips <3");
    }

    #[test]
    fn test_comments_scripts_and_void_elements() {
        let html = "<!DOCTYPE html><!-- <h1>hidden</h1> --><p>a<br>b<img src=x.png/></p>\
                    <script>var s = '<h2>not a heading</h2>';</script><h2>Real</h2>";
        let doc = Document::parse("o", html);
        let h2s = doc.query_tags(doc.root(), &["h1".to_string(), "h2".to_string()]);
        assert_eq!(h2s.len(), 1);
        assert_eq!(doc.text_content(h2s[0]), "Real");

        let p = doc.query_tags(doc.root(), &["p".to_string()])[0];
        assert_eq!(doc.text_content(p), "ab");
    }

    #[test]
    fn test_mismatched_end_tags_recover() {
        let doc = Document::parse("o", "<div><p>one</span><h3>two</div><h4>three</h4>");
        let div = doc.query_tags(doc.root(), &["div".to_string()])[0];
        let h4 = doc.query_tags(doc.root(), &["h4".to_string()])[0];
        assert!(!doc.contains(div, h4));
        assert_eq!(doc.text_content(div), "onetwo");
    }
}
