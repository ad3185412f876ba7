//! Minimal document model: an arena tree with generation-tagged handles,
//! a tolerant markup parser and a block-flow layout approximation.

mod document;
pub mod layout;
pub mod parser;
mod types;

pub use document::{Document, SharedDocument};
pub use layout::{flow_layout, FlowMetrics};
pub use types::*;
