use serde::{Deserialize, Serialize};

/// A note as supplied by the note list: identity, label and where its markup lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable note identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Inline markup, or a path ending in `.html` to load
    #[serde(default)]
    pub content: Option<String>,

    /// Remote location of the markup
    #[serde(default)]
    pub url: Option<String>,
}

impl Note {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: None,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Location to fetch the note from: `content` when it names a document, else `url`
    pub fn source_url(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|c| c.ends_with(".html") || c.ends_with(".htm"))
            .or(self.url.as_deref())
    }

    /// Markup carried directly in `content`, when it is not a document path
    pub fn inline_markup(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|c| !(c.ends_with(".html") || c.ends_with(".htm")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_prefers_document_path() {
        let note = Note::new("1", "One").with_content("notes/one.html").with_url("https://x/one");
        assert_eq!(note.source_url(), Some("notes/one.html"));

        let note = Note::new("2", "Two").with_content("<p>inline</p>").with_url("https://x/two");
        assert_eq!(note.source_url(), Some("https://x/two"));

        assert_eq!(Note::new("3", "Three").source_url(), None);
    }

    #[test]
    fn test_inline_markup() {
        let note = Note::new("1", "One").with_content("<h1>Hi</h1>");
        assert_eq!(note.inline_markup(), Some("<h1>Hi</h1>"));
        assert_eq!(Note::new("2", "Two").with_content("two.html").inline_markup(), None);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let note: Note = serde_json::from_str(r#"{"id":"a","title":"Alpha"}"#).unwrap();
        assert_eq!(note, Note::new("a", "Alpha"));
    }
}
