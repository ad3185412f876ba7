use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::dom::FlowMetrics;

/// Table of contents configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocConfig {
    /// Heading tags to collect
    #[serde(default = "defaults::default_toc_levels")]
    pub levels: Vec<String>,

    /// Header clearance applied when jumping to a heading
    #[serde(default = "defaults::default_scroll_offset")]
    pub scroll_offset: f64,

    /// Offset used by the scroll-position fallback tracker
    #[serde(default = "defaults::default_highlight_threshold")]
    pub highlight_threshold: f64,

    #[serde(default = "defaults::default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,

    #[serde(default = "defaults::default_visibility_thresholds")]
    pub visibility_thresholds: Vec<f64>,

    #[serde(default = "defaults::default_bottom_cutoff_ratio")]
    pub bottom_cutoff_ratio: f64,

    /// Placeholder message for notes without headings
    #[serde(default = "defaults::default_empty_message")]
    pub empty_message: String,

    /// Layout metrics for rendered notes
    #[serde(default = "defaults::default_flow_metrics")]
    pub flow: FlowMetrics,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            levels: defaults::default_toc_levels(),
            scroll_offset: defaults::default_scroll_offset(),
            highlight_threshold: defaults::default_highlight_threshold(),
            scroll_debounce_ms: defaults::default_scroll_debounce_ms(),
            visibility_thresholds: defaults::default_visibility_thresholds(),
            bottom_cutoff_ratio: defaults::default_bottom_cutoff_ratio(),
            empty_message: defaults::default_empty_message(),
            flow: defaults::default_flow_metrics(),
        }
    }
}

impl TocConfig {
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }
}

/// Responsive layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "defaults::default_mobile_breakpoint")]
    pub mobile_breakpoint: f64,

    #[serde(default = "defaults::default_tablet_breakpoint")]
    pub tablet_breakpoint: f64,

    #[serde(default = "defaults::default_desktop_breakpoint")]
    pub desktop_breakpoint: f64,

    #[serde(default = "defaults::default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: defaults::default_mobile_breakpoint(),
            tablet_breakpoint: defaults::default_tablet_breakpoint(),
            desktop_breakpoint: defaults::default_desktop_breakpoint(),
            resize_debounce_ms: defaults::default_resize_debounce_ms(),
        }
    }
}

impl LayoutConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Note loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "defaults::default_enable_cache")]
    pub enable_cache: bool,

    #[serde(default = "defaults::default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,

    #[serde(default = "defaults::default_load_timeout_ms")]
    pub load_timeout_ms: u64,

    #[serde(default = "defaults::default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "defaults::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enable_cache: defaults::default_enable_cache(),
            cache_timeout_ms: defaults::default_cache_timeout_ms(),
            load_timeout_ms: defaults::default_load_timeout_ms(),
            retry_attempts: defaults::default_retry_attempts(),
            retry_delay_ms: defaults::default_retry_delay_ms(),
        }
    }
}

impl LoaderConfig {
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Overlay menu configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "defaults::default_animation_ms")]
    pub animation_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            animation_ms: defaults::default_animation_ms(),
        }
    }
}

/// Viewer configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub toc: TocConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub menu: MenuConfig,
}
