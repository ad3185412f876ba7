use crate::toc::tracker::strategy::{SectionTrackingStrategy, TrackingKind, ViewportProbe};
use crate::toc::types::HeadingDescriptor;

/// Scroll-position fallback.
///
/// Picks the last heading whose top is at or above `scroll_top + threshold`;
/// when none qualifies the first heading is active.
#[derive(Debug, Clone)]
pub struct ScrollFallbackStrategy {
    threshold: f64,
}

impl ScrollFallbackStrategy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl SectionTrackingStrategy for ScrollFallbackStrategy {
    fn kind(&self) -> TrackingKind {
        TrackingKind::Scroll
    }

    fn current_active(&mut self, entries: &[HeadingDescriptor], probe: &dyn ViewportProbe) -> Option<String> {
        let limit = probe.scroll_top() + self.threshold;

        entries
            .iter()
            .rev()
            .find(|heading| {
                probe
                    .element_box(heading)
                    .map(|b| b.top <= limit)
                    .unwrap_or(false)
            })
            .or_else(|| entries.first())
            .map(|heading| heading.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::tracker::strategy::testing::layout;

    #[test]
    fn test_picks_last_heading_above_line() {
        let (entries, mut viewport) = layout(&[0.0, 400.0, 900.0, 1500.0], 800.0);
        let mut strategy = ScrollFallbackStrategy::new(100.0);

        viewport.scroll_top = 850.0;
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h2".to_string()));

        // 400 <= 300 + 100
        viewport.scroll_top = 300.0;
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h1".to_string()));

        viewport.scroll_top = 5000.0;
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h3".to_string()));
    }

    #[test]
    fn test_falls_back_to_first_entry() {
        let (entries, mut viewport) = layout(&[500.0, 900.0], 800.0);
        let mut strategy = ScrollFallbackStrategy::new(100.0);
        viewport.scroll_top = 0.0;
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h0".to_string()));
    }

    #[test]
    fn test_missing_elements_are_skipped() {
        let (entries, mut viewport) = layout(&[0.0, 200.0, 400.0], 800.0);
        viewport.boxes.remove("h2");
        viewport.scroll_top = 1000.0;
        let mut strategy = ScrollFallbackStrategy::new(100.0);
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h1".to_string()));
    }

    #[test]
    fn test_empty_entries() {
        let (_, viewport) = layout(&[], 800.0);
        let mut strategy = ScrollFallbackStrategy::new(100.0);
        assert_eq!(strategy.current_active(&[], &viewport), None);
    }
}
