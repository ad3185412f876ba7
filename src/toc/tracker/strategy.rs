use serde::Serialize;

use crate::dom::{Document, LayoutBox};
use crate::toc::types::{Epoch, HeadingDescriptor};

/// Which tracking strategy is driving the active section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingKind {
    /// Visibility-ratio observation of heading elements
    Visibility,
    /// Debounced scroll-position scan
    Scroll,
}

/// Geometry a strategy needs to decide which heading is current
pub trait ViewportProbe {
    fn scroll_top(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// Document-relative box of a heading's element, if it is still live
    fn element_box(&self, heading: &HeadingDescriptor) -> Option<LayoutBox>;
}

/// Decides the active heading from the current viewport
pub trait SectionTrackingStrategy {
    fn kind(&self) -> TrackingKind;

    /// Candidate active id, or `None` to leave the active section alone
    fn current_active(&mut self, entries: &[HeadingDescriptor], probe: &dyn ViewportProbe) -> Option<String>;
}

/// Probe backed by a live document.
///
/// Element handles are only honoured when their epoch and document match the
/// generation being tracked.
pub struct DocumentProbe<'a> {
    doc: &'a Document,
    epoch: Epoch,
}

impl<'a> DocumentProbe<'a> {
    pub fn new(doc: &'a Document, epoch: Epoch) -> Self {
        Self { doc, epoch }
    }
}

impl ViewportProbe for DocumentProbe<'_> {
    fn scroll_top(&self) -> f64 {
        self.doc.scroll_top()
    }

    fn viewport_height(&self) -> f64 {
        self.doc.viewport().height
    }

    fn element_box(&self, heading: &HeadingDescriptor) -> Option<LayoutBox> {
        let element = heading.element;
        if element.epoch != self.epoch || element.document != self.doc.id() {
            return None;
        }
        self.doc.layout_box(element.node)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::*;
    use crate::dom::{DocumentId, NodeId};
    use crate::toc::types::ElementRef;

    /// Hand-built viewport for strategy tests
    pub(crate) struct SyntheticViewport {
        pub scroll_top: f64,
        pub height: f64,
        pub boxes: HashMap<String, LayoutBox>,
    }

    impl ViewportProbe for SyntheticViewport {
        fn scroll_top(&self) -> f64 {
            self.scroll_top
        }

        fn viewport_height(&self) -> f64 {
            self.height
        }

        fn element_box(&self, heading: &HeadingDescriptor) -> Option<LayoutBox> {
            self.boxes.get(&heading.id).copied()
        }
    }

    /// Entries plus a viewport where heading `i` sits at `tops[i]`
    pub(crate) fn layout(tops: &[f64], height: f64) -> (Vec<HeadingDescriptor>, SyntheticViewport) {
        let entries: Vec<HeadingDescriptor> = tops
            .iter()
            .enumerate()
            .map(|(index, _)| HeadingDescriptor {
                id: format!("h{}", index),
                text: format!("Heading {}", index),
                level: 2,
                index,
                element: ElementRef {
                    node: NodeId::new(index as u32, 1),
                    document: DocumentId(0),
                    epoch: Epoch(1),
                },
            })
            .collect();
        let boxes = entries
            .iter()
            .zip(tops)
            .map(|(e, top)| (e.id.clone(), LayoutBox::new(*top, 30.0)))
            .collect();
        let viewport = SyntheticViewport { scroll_top: 0.0, height, boxes };
        (entries, viewport)
    }
}
