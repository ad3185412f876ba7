pub mod values;

// Export the default values
pub use values::*;

/// Heading tags collected into the table of contents
pub fn default_toc_levels() -> Vec<String> {
    (1..=6).map(|rank| format!("h{}", rank)).collect()
}

/// Visibility ratios at which the section tracker is notified
pub fn default_visibility_thresholds() -> Vec<f64> {
    vec![0.0, 0.1, 0.5, 1.0]
}
