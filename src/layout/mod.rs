mod manager;
mod types;

pub use manager::LayoutManager;
pub use types::{LayoutMode, LayoutState};
