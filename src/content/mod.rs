mod access;
mod target;
mod types;

pub use access::{ContentRoot, EmbeddedFrame, FrameAccess, ResolvedContent};
pub use target::ContentTarget;
pub use types::Note;
