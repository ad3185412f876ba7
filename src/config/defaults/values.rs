use crate::dom::FlowMetrics;

/// Vertical clearance left above a heading after a jump (fixed header height)
pub fn default_scroll_offset() -> f64 {
    60.0
}

/// Distance below the scroll position at which a heading counts as current
pub fn default_highlight_threshold() -> f64 {
    100.0
}

/// Quiet period before the scroll fallback re-evaluates
pub fn default_scroll_debounce_ms() -> u64 {
    100
}

/// Fraction of the viewport height where the observation band ends
pub fn default_bottom_cutoff_ratio() -> f64 {
    0.5
}

/// Placeholder shown when a note has no headings
pub fn default_empty_message() -> String {
    "No table of contents".to_string()
}

/// Block-flow metrics used to lay out rendered notes
pub fn default_flow_metrics() -> FlowMetrics {
    FlowMetrics::default()
}

/// Widths at or below this use the mobile layout
pub fn default_mobile_breakpoint() -> f64 {
    768.0
}

pub fn default_tablet_breakpoint() -> f64 {
    1024.0
}

pub fn default_desktop_breakpoint() -> f64 {
    1200.0
}

/// Quiet period before a resize is handled
pub fn default_resize_debounce_ms() -> u64 {
    150
}

/// Cache fetched note content
pub fn default_enable_cache() -> bool {
    true
}

/// Lifetime of a cached note (5 minutes)
pub fn default_cache_timeout_ms() -> u64 {
    300_000
}

/// Timeout for a single fetch attempt
pub fn default_load_timeout_ms() -> u64 {
    10_000
}

/// Attempts per load before giving up
pub fn default_retry_attempts() -> u32 {
    3
}

/// Base back-off between attempts, multiplied by the attempt number
pub fn default_retry_delay_ms() -> u64 {
    1_000
}

/// Duration of the overlay menu's open/close animation
pub fn default_animation_ms() -> u64 {
    300
}
