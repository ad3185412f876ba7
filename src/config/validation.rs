use log::debug;

use crate::config::types::{LayoutConfig, LoaderConfig, TocConfig, ViewerConfig};
use crate::toc::heading_level;
use crate::utils::error::{BoxResult, ViewerError};

/// Validate the configuration
pub fn validate_config(config: &ViewerConfig) -> BoxResult<()> {
    validate_toc(&config.toc)?;
    validate_layout(&config.layout)?;
    validate_loader(&config.loader)?;

    debug!("Configuration is valid");
    Ok(())
}

fn validate_toc(toc: &TocConfig) -> BoxResult<()> {
    if toc.levels.is_empty() {
        return Err(ViewerError::Config("toc.levels must name at least one heading tag".to_string()).into());
    }

    if let Some(bad) = toc.levels.iter().find(|tag| heading_level(tag).is_none()) {
        return Err(ViewerError::Config(format!(
            "toc.levels contains '{}', expected h1 to h6", bad
        )).into());
    }

    if toc.scroll_offset < 0.0 || toc.highlight_threshold < 0.0 {
        return Err(ViewerError::Config("toc offsets must not be negative".to_string()).into());
    }

    if let Some(bad) = toc.visibility_thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
        return Err(ViewerError::Config(format!(
            "toc.visibility_thresholds value {} is outside [0, 1]", bad
        )).into());
    }

    if !(toc.bottom_cutoff_ratio > 0.0 && toc.bottom_cutoff_ratio <= 1.0) {
        return Err(ViewerError::Config(format!(
            "toc.bottom_cutoff_ratio {} is outside (0, 1]", toc.bottom_cutoff_ratio
        )).into());
    }

    if toc.flow.chars_per_line == 0 || toc.flow.line_height <= 0.0 {
        return Err(ViewerError::Config("toc.flow metrics must be positive".to_string()).into());
    }

    Ok(())
}

fn validate_layout(layout: &LayoutConfig) -> BoxResult<()> {
    let increasing = layout.mobile_breakpoint > 0.0
        && layout.mobile_breakpoint < layout.tablet_breakpoint
        && layout.tablet_breakpoint < layout.desktop_breakpoint;

    if !increasing {
        return Err(ViewerError::Config(format!(
            "layout breakpoints must increase: mobile {} < tablet {} < desktop {}",
            layout.mobile_breakpoint, layout.tablet_breakpoint, layout.desktop_breakpoint
        )).into());
    }

    Ok(())
}

fn validate_loader(loader: &LoaderConfig) -> BoxResult<()> {
    if loader.retry_attempts == 0 {
        return Err(ViewerError::Config("loader.retry_attempts must be at least 1".to_string()).into());
    }

    if loader.load_timeout_ms == 0 {
        return Err(ViewerError::Config("loader.load_timeout_ms must be positive".to_string()).into());
    }

    Ok(())
}
