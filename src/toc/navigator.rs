use std::rc::Rc;

use log::{debug, warn};

use crate::dom::{Document, NodeId, ScrollBehavior, ScrollRecord};
use crate::events::{EventBus, ViewerEvent};
use crate::toc::model::{SharedModel, SharedRoot};
use crate::toc::tracker::SectionTracker;
use crate::toc::types::{Epoch, HeadingDescriptor};
use crate::utils::error::ViewerError;

/// Result of following a TOC link
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub id: String,
    pub index: usize,
    pub scroll: ScrollRecord,
}

/// Scrolls the content to a heading when its TOC link is followed
pub struct TocNavigator {
    model: SharedModel,
    root: SharedRoot,
    tracker: Rc<SectionTracker>,
    bus: EventBus,
    scroll_offset: f64,
}

impl TocNavigator {
    pub fn new(model: SharedModel, root: SharedRoot, tracker: Rc<SectionTracker>, bus: EventBus, scroll_offset: f64) -> Self {
        Self {
            model,
            root,
            tracker,
            bus,
            scroll_offset,
        }
    }

    /// Jump to the heading `id`.
    ///
    /// Scrolls so the heading sits `scroll_offset` below the top of the
    /// viewport, marks it active and announces the jump. A heading whose
    /// element is gone aborts without side effects.
    pub fn activate(&self, id: &str) -> Result<Activation, ViewerError> {
        let (heading, note, epoch) = {
            let model = self.model.borrow();
            match model.entry(id) {
                Some(heading) => (heading.clone(), model.note().cloned(), model.epoch()),
                None => {
                    let err = ViewerError::ElementNotFound(id.to_string());
                    warn!("{}", err);
                    return Err(err);
                }
            }
        };

        let root = self.root.borrow().clone().ok_or_else(|| {
            ViewerError::ContentUnavailable("no content has been rendered".to_string())
        })?;
        let content = root.resolve().map_err(|e| {
            warn!("Cannot jump to {}: {}", id, e);
            e
        })?;

        let scroll = {
            let mut doc = content
                .document
                .try_borrow_mut()
                .map_err(|_| ViewerError::ContentUnavailable("content document is busy".to_string()))?;

            let node = match live_element(&doc, &heading, epoch, content.scope) {
                Some(node) => node,
                None => {
                    let err = ViewerError::ElementNotFound(id.to_string());
                    warn!("{}", err);
                    return Err(err);
                }
            };

            let top = doc.offset_top(node).unwrap_or(0.0);
            doc.scroll_to((top - self.scroll_offset).max(0.0), ScrollBehavior::Smooth)
        };
        debug!("Jumped to {} at {}px ({:?})", id, scroll.top, scroll.behavior);

        self.bus.publish(ViewerEvent::Scroll {
            id: heading.id.clone(),
            index: heading.index,
            scroll_top: scroll.top,
            note: note.clone(),
        });

        self.tracker.set_active(id)?;

        self.bus.publish(ViewerEvent::SectionJump {
            id: heading.id.clone(),
            index: heading.index,
            level: heading.level,
            note,
        });

        Ok(Activation {
            id: heading.id,
            index: heading.index,
            scroll,
        })
    }
}

/// The heading's element, if still attached to the current content.
///
/// Prefers the recorded handle; falls back to an id lookup inside the scope.
fn live_element(doc: &Document, heading: &HeadingDescriptor, epoch: Epoch, scope: NodeId) -> Option<NodeId> {
    let handle = heading.element;
    let handle_valid = handle.epoch == epoch
        && handle.document == doc.id()
        && doc.is_alive(handle.node)
        && doc.element_id(handle.node) == Some(heading.id.as_str());

    if handle_valid {
        Some(handle.node)
    } else {
        doc.get_element_by_id(Some(scope), &heading.id)
    }
}
