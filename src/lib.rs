//! Note viewer core: table of contents generation, active-section tracking,
//! responsive layout and note loading over a host-independent document model.

// Module declarations
pub mod config;
pub mod content;
pub mod dom;
pub mod events;
pub mod layout;
pub mod loader;
pub mod menu;
pub mod toc;
pub mod utils;
mod viewer;

pub use config::{load_config_str, ConfigFormat, ViewerConfig};
pub use content::{ContentRoot, ContentTarget, EmbeddedFrame, Note};
pub use events::{EventBus, EventKind, ViewerEvent};
pub use toc::{HeadingDescriptor, TableOfContents, TocState};
pub use utils::error::ViewerError;
pub use utils::logging::init_logging;
pub use viewer::Viewer;
