use std::cell::RefCell;
use std::rc::Rc;

use crate::content::{ContentRoot, Note};
use crate::toc::types::{Epoch, HeadingDescriptor, SourceContext};
use crate::utils::error::ViewerError;

/// Model shared by the generator, tracker, renderer and navigator
pub type SharedModel = Rc<RefCell<TocModel>>;

/// Accessor for the content root the current model was generated from
pub type SharedRoot = Rc<RefCell<Option<ContentRoot>>>;

/// Outcome of an active-section update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveUpdate {
    /// The id was already active; nothing to notify
    Unchanged,
    Changed { previous: Option<String> },
}

/// Ordered headings of the current note plus the active pointer
#[derive(Debug, Default)]
pub struct TocModel {
    entries: Vec<HeadingDescriptor>,
    active_id: Option<String>,
    source: Option<SourceContext>,
    note: Option<Note>,
    epoch: Epoch,
}

impl TocModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedModel {
        Rc::new(RefCell::new(self))
    }

    pub fn entries(&self) -> &[HeadingDescriptor] {
        &self.entries
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn source(&self) -> Option<&SourceContext> {
        self.source.as_ref()
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `epoch` still names the current generation
    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.epoch == epoch
    }

    pub fn entry(&self, id: &str) -> Option<&HeadingDescriptor> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Start a new generation: discard everything and bump the epoch
    pub fn begin_generation(&mut self, note: Option<Note>) -> Epoch {
        self.epoch = self.epoch.next();
        self.entries.clear();
        self.active_id = None;
        self.source = None;
        self.note = note;
        self.epoch
    }

    /// Install the entries extracted for the current generation
    pub fn install(&mut self, entries: Vec<HeadingDescriptor>, source: SourceContext) {
        debug_assert_eq!(source.epoch, self.epoch);
        self.entries = entries;
        self.source = Some(source);
    }

    /// Drop all content, invalidating every outstanding handle
    pub fn clear(&mut self) -> Epoch {
        self.begin_generation(None)
    }

    /// Point the active marker at `id`; unknown ids are rejected
    pub fn set_active(&mut self, id: &str) -> Result<ActiveUpdate, ViewerError> {
        if self.active_id.as_deref() == Some(id) {
            return Ok(ActiveUpdate::Unchanged);
        }
        if self.entry(id).is_none() {
            return Err(ViewerError::ElementNotFound(id.to_string()));
        }
        let previous = self.active_id.replace(id.to_string());
        Ok(ActiveUpdate::Changed { previous })
    }
}
