use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, warn};

use crate::dom::{Document, NodeId, ReadyState, SharedDocument};
use crate::utils::error::ViewerError;

/// Synchronous access check for an embedded browsing context.
///
/// Implementations must never panic: an unreadable frame is reported as `None`.
pub trait FrameAccess {
    /// The frame's document if it is fully loaded and readable from the host origin
    fn readable_document(&self) -> Option<SharedDocument>;

    /// Short label for diagnostics
    fn describe(&self) -> String {
        "embedded frame".to_string()
    }
}

/// An inline frame hosted by a page of `host_origin`
#[derive(Debug)]
pub struct EmbeddedFrame {
    host_origin: String,
    name: String,
    document: RefCell<Option<SharedDocument>>,
}

impl EmbeddedFrame {
    pub fn new(name: impl Into<String>, host_origin: impl Into<String>) -> Self {
        Self {
            host_origin: host_origin.into(),
            name: name.into(),
            document: RefCell::new(None),
        }
    }

    /// Attach a document to the frame, replacing any previous one
    pub fn attach(&self, document: SharedDocument) {
        *self.document.borrow_mut() = Some(document);
    }

    /// Navigate the frame to freshly parsed markup from `origin`
    pub fn load_html(&self, origin: &str, html: &str) -> SharedDocument {
        let document = Document::parse(origin, html).into_shared();
        self.attach(document.clone());
        document
    }

    /// Drop the frame's document
    pub fn unload(&self) {
        *self.document.borrow_mut() = None;
    }

    /// The attached document regardless of readiness or origin
    pub fn document(&self) -> Option<SharedDocument> {
        self.document.borrow().clone()
    }

    pub fn host_origin(&self) -> &str {
        &self.host_origin
    }
}

impl FrameAccess for EmbeddedFrame {
    fn readable_document(&self) -> Option<SharedDocument> {
        let document = match self.document.try_borrow() {
            Ok(slot) => slot.clone()?,
            Err(_) => return None,
        };

        let readable = match document.try_borrow() {
            Ok(doc) if doc.origin() != self.host_origin => {
                warn!("Cannot access {} document (cross-origin: {})", self.name, doc.origin());
                false
            }
            Ok(doc) if doc.ready_state() != ReadyState::Complete => {
                warn!("{} document not fully loaded", self.name);
                false
            }
            Ok(_) => true,
            Err(_) => {
                debug!("{} document is busy", self.name);
                false
            }
        };

        readable.then_some(document)
    }

    fn describe(&self) -> String {
        format!("frame '{}'", self.name)
    }
}

/// Where note content is rendered: a container in the host document, or an embedded frame
#[derive(Clone)]
pub enum ContentRoot {
    Inline {
        document: SharedDocument,
        container: NodeId,
    },
    Embedded(Rc<dyn FrameAccess>),
}

impl fmt::Debug for ContentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRoot::Inline { container, .. } => {
                f.debug_struct("Inline").field("container", container).finish()
            }
            ContentRoot::Embedded(frame) => f.debug_tuple("Embedded").field(&frame.describe()).finish(),
        }
    }
}

/// A readable document plus the subtree holding the note
#[derive(Clone)]
pub struct ResolvedContent {
    pub document: SharedDocument,
    pub scope: NodeId,
}

impl fmt::Debug for ResolvedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedContent").field("scope", &self.scope).finish()
    }
}

impl ContentRoot {
    pub fn inline(document: SharedDocument, container: NodeId) -> Self {
        ContentRoot::Inline { document, container }
    }

    pub fn embedded(frame: Rc<dyn FrameAccess>) -> Self {
        ContentRoot::Embedded(frame)
    }

    /// Resolve to a readable document, or `ContentUnavailable`
    pub fn resolve(&self) -> Result<ResolvedContent, ViewerError> {
        match self {
            ContentRoot::Inline { document, container } => {
                let alive = document
                    .try_borrow()
                    .map(|doc| doc.is_alive(*container))
                    .unwrap_or(false);
                if !alive {
                    return Err(ViewerError::ContentUnavailable(
                        "content container is missing".to_string(),
                    ));
                }
                Ok(ResolvedContent {
                    document: document.clone(),
                    scope: *container,
                })
            }
            ContentRoot::Embedded(frame) => {
                let document = frame.readable_document().ok_or_else(|| {
                    ViewerError::ContentUnavailable(format!("{} is not readable", frame.describe()))
                })?;
                let scope = document.borrow().root();
                Ok(ResolvedContent { document, scope })
            }
        }
    }
}
