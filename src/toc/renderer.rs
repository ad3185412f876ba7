use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::toc::model::TocModel;
use crate::toc::types::Epoch;

/// View shared by the renderer and the tracker that moves its active marker
pub type SharedView = Rc<RefCell<TocView>>;

/// A rendered, clickable TOC entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocLink {
    pub id: String,
    pub index: usize,
    pub level: u8,
    /// HTML-escaped label
    pub label: String,
    pub active: bool,
}

impl TocLink {
    /// Render as a list item
    pub fn to_html(&self) -> String {
        let id = html_escape::encode_double_quoted_attribute(&self.id);
        let active = if self.active { " active" } else { "" };
        format!(
            "<li class=\"toc-item\"><a href=\"#{id}\" class=\"toc-link toc-level-{level}{active}\" \
             data-heading-id=\"{id}\" data-heading-index=\"{index}\" data-heading-level=\"{level}\">{label}</a></li>",
            id = id,
            level = self.level,
            active = active,
            index = self.index,
            label = self.label,
        )
    }
}

/// Rendered state of the table of contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocView {
    links: Vec<TocLink>,
    placeholder: String,
    #[serde(skip)]
    epoch: Epoch,
}

impl Default for TocView {
    fn default() -> Self {
        Self::placeholder("No table of contents")
    }
}

impl TocView {
    /// The non-interactive empty state
    pub fn placeholder(message: &str) -> Self {
        Self {
            links: Vec::new(),
            placeholder: message.to_string(),
            epoch: Epoch::default(),
        }
    }

    pub fn into_shared(self) -> SharedView {
        Rc::new(RefCell::new(self))
    }

    pub fn links(&self) -> &[TocLink] {
        &self.links
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_placeholder(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link(&self, id: &str) -> Option<&TocLink> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Id of the link currently carrying the active marker
    pub fn active_id(&self) -> Option<&str> {
        self.links.iter().find(|l| l.active).map(|l| l.id.as_str())
    }

    /// Move the active marker to `id`; returns false when no link matches
    pub fn mark_active(&mut self, id: &str) -> bool {
        if self.link(id).is_none() {
            return false;
        }
        for link in &mut self.links {
            link.active = link.id == id;
        }
        true
    }

    /// Remove the active marker
    pub fn clear_active(&mut self) {
        for link in &mut self.links {
            link.active = false;
        }
    }

    /// Scroll offset that centres the active link in a scrollable TOC
    /// container, or `None` when it is already fully visible.
    pub fn reveal_active(&self, container_scroll: f64, container_height: f64, item_height: f64) -> Option<f64> {
        let position = self.links.iter().position(|l| l.active)?;
        let content_height = self.links.len() as f64 * item_height;
        if content_height <= container_height {
            return None;
        }

        let item_top = position as f64 * item_height;
        let item_bottom = item_top + item_height;
        if item_top >= container_scroll && item_bottom <= container_scroll + container_height {
            return None;
        }

        let centred = item_top + item_height / 2.0 - container_height / 2.0;
        Some(centred.clamp(0.0, content_height - container_height))
    }

    /// Markup for the whole list
    pub fn to_html(&self) -> String {
        if self.links.is_empty() {
            return format!(
                "<li class=\"no-toc-message\">{}</li>",
                html_escape::encode_text(&self.placeholder)
            );
        }
        self.links.iter().map(TocLink::to_html).collect::<Vec<_>>().join("\n")
    }
}

/// Render the model as a list of links; an empty model renders the placeholder
pub fn render(model: &TocModel, placeholder: &str) -> TocView {
    let active = model.active_id();
    let links = model
        .entries()
        .iter()
        .map(|entry| TocLink {
            id: entry.id.clone(),
            index: entry.index,
            level: entry.level,
            label: html_escape::encode_text(&entry.text).into_owned(),
            active: active == Some(entry.id.as_str()),
        })
        .collect();

    TocView {
        links,
        placeholder: placeholder.to_string(),
        epoch: model.epoch(),
    }
}
