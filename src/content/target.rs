use std::rc::Rc;

use log::debug;

use crate::content::access::{ContentRoot, EmbeddedFrame};
use crate::dom::{flow_layout, FlowMetrics, NodeId, SharedDocument};
use crate::utils::error::ViewerError;

/// Container that loaded note markup is written into
#[derive(Debug, Clone)]
pub enum ContentTarget {
    /// A container element in the host document
    Inline {
        document: SharedDocument,
        container: NodeId,
    },
    /// An inline frame that receives a document of its own
    Frame(Rc<EmbeddedFrame>),
}

impl ContentTarget {
    /// Content root the table of contents reads from
    pub fn root(&self) -> ContentRoot {
        match self {
            ContentTarget::Inline { document, container } => {
                ContentRoot::inline(document.clone(), *container)
            }
            ContentTarget::Frame(frame) => ContentRoot::embedded(frame.clone()),
        }
    }

    /// Replace the target's content with `html` and lay it out
    pub fn render(&self, html: &str, metrics: &FlowMetrics) -> Result<ContentRoot, ViewerError> {
        match self {
            ContentTarget::Inline { document, container } => {
                let mut doc = document.try_borrow_mut().map_err(|_| {
                    ViewerError::ContentUnavailable("host document is busy".to_string())
                })?;
                doc.set_inner_html(*container, html)
                    .map_err(|_| ViewerError::ContentUnavailable("content container is missing".to_string()))?;
                doc.set_scroll_top(0.0);
                let height = flow_layout(&mut doc, metrics);
                debug!("Rendered {} bytes inline ({}px)", html.len(), height);
            }
            ContentTarget::Frame(frame) => {
                let document = frame.load_html(frame.host_origin(), html);
                let height = flow_layout(&mut document.borrow_mut(), metrics);
                debug!("Rendered {} bytes into frame ({}px)", html.len(), height);
            }
        }
        Ok(self.root())
    }
}
