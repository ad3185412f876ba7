use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Handle to a node inside a [`Document`](crate::dom::Document).
///
/// A slot index plus the generation of that slot. Removing a node frees its
/// slot; reusing the slot bumps the generation, so a stale `NodeId` never
/// aliases a different live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this handle was issued for
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Process-unique identity of a document instance
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DocumentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Loading state of a document
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Capabilities of the platform hosting a document
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Visibility change notifications are available
    pub intersection_observer: bool,
    /// `scrollTo` honours `behavior: smooth`
    pub smooth_scroll: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            smooth_scroll: true,
        }
    }
}

/// Scrollable viewport of a document
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_top: 0.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Document-relative box of an element
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub top: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// How a programmatic scroll was performed
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The most recent programmatic scroll applied to a document
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollRecord {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Payload of an arena node
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    /// The document itself
    Document,
    /// An element with a lowercase tag name and attributes in source order
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A text run
    Text(String),
}

impl NodeData {
    pub fn element(tag: &str) -> Self {
        NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }
}
