mod controller;
pub mod extractor;
mod model;
mod navigator;
mod renderer;
pub mod tracker;
mod types;

pub use controller::{TableOfContents, TocState};
pub use extractor::{extract_headings, generate_heading_id, heading_level};
pub use model::{ActiveUpdate, SharedModel, SharedRoot, TocModel};
pub use navigator::{Activation, TocNavigator};
pub use renderer::{render, SharedView, TocLink, TocView};
pub use tracker::{IntersectionRecord, SectionTracker, TrackingKind};
pub use types::{ElementRef, Epoch, HeadingDescriptor, SourceContext};
