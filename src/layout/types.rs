use std::fmt;

use serde::Serialize;

use crate::config::LayoutConfig;

/// Responsive layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Desktop,
    Mobile,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Desktop => write!(f, "desktop"),
            LayoutMode::Mobile => write!(f, "mobile"),
        }
    }
}

/// Snapshot of the layout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub current_mode: LayoutMode,
    pub sidebar_visible: bool,
    pub menu_visible: bool,
    pub width: f64,
    pub height: f64,
    pub breakpoints: LayoutConfig,
}
