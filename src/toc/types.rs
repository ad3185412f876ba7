use std::fmt;

use serde::Serialize;

use crate::dom::{DocumentId, NodeId};

/// Generation token bumped every time the table of contents is replaced.
///
/// Callbacks and element handles carry the epoch they were created for; any
/// mismatch with the model's current epoch marks them stale.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-owning handle to a live heading element, tagged with its generation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ElementRef {
    pub node: NodeId,
    pub document: DocumentId,
    pub epoch: Epoch,
}

/// One entry of the table of contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingDescriptor {
    /// Anchor id, unique within one generation
    pub id: String,
    /// Trimmed text content of the heading
    pub text: String,
    /// Heading rank, 1 to 6
    pub level: u8,
    /// Position among all matched headings in document order
    pub index: usize,
    #[serde(skip)]
    pub element: ElementRef,
}

/// Identity of the content a table of contents was generated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub epoch: Epoch,
    pub document: Option<DocumentId>,
    pub note_id: Option<String>,
}
