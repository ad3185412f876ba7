use std::collections::HashMap;

use serde::Serialize;

use crate::dom::LayoutBox;
use crate::toc::tracker::strategy::{SectionTrackingStrategy, TrackingKind, ViewportProbe};
use crate::toc::types::HeadingDescriptor;

/// Observation band and thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Pixels trimmed from the top of the viewport
    pub top_margin: f64,
    /// Fraction of the viewport height where the band ends
    pub bottom_cutoff_ratio: f64,
    /// Visibility ratios whose crossing produces a record
    pub thresholds: Vec<f64>,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            top_margin: 60.0,
            bottom_cutoff_ratio: 0.5,
            thresholds: vec![0.0, 0.1, 0.5, 1.0],
        }
    }
}

/// A visibility change for one observed heading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionRecord {
    pub target_id: String,
    pub is_intersecting: bool,
    /// Fraction of the element inside the band
    pub ratio: f64,
    /// Element top relative to the viewport
    pub bounding_top: f64,
}

/// Tracks visibility of heading elements inside the observation band and
/// reports only the ones whose state crossed a threshold since last time.
#[derive(Debug, Clone, Default)]
pub struct IntersectionObserver {
    options: ObserverOptions,
    observed: HashMap<String, (bool, usize)>,
}

impl IntersectionObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: HashMap::new(),
        }
    }

    /// Measure one element against the band
    pub fn measure(&self, id: &str, layout: LayoutBox, scroll_top: f64, viewport_height: f64) -> IntersectionRecord {
        let band_top = scroll_top + self.options.top_margin;
        let band_bottom = scroll_top + viewport_height * self.options.bottom_cutoff_ratio;

        let is_intersecting = band_bottom >= band_top && layout.top <= band_bottom && layout.bottom() >= band_top;
        let ratio = if !is_intersecting {
            0.0
        } else if layout.height <= 0.0 {
            1.0
        } else {
            let overlap = layout.bottom().min(band_bottom) - layout.top.max(band_top);
            (overlap.max(0.0) / layout.height).min(1.0)
        };

        IntersectionRecord {
            target_id: id.to_string(),
            is_intersecting,
            ratio,
            bounding_top: layout.top - scroll_top,
        }
    }

    fn bucket(&self, record: &IntersectionRecord) -> usize {
        if !record.is_intersecting {
            return 0;
        }
        self.options.thresholds.iter().filter(|t| record.ratio >= **t).count()
    }

    /// Records for every heading whose state changed since the last call
    pub fn take_records(&mut self, entries: &[HeadingDescriptor], probe: &dyn ViewportProbe) -> Vec<IntersectionRecord> {
        let scroll_top = probe.scroll_top();
        let height = probe.viewport_height();
        let mut records = Vec::new();

        for heading in entries {
            let layout = match probe.element_box(heading) {
                Some(layout) => layout,
                None => continue,
            };
            let record = self.measure(&heading.id, layout, scroll_top, height);
            let state = (record.is_intersecting, self.bucket(&record));
            if self.observed.get(&heading.id) != Some(&state) {
                self.observed.insert(heading.id.clone(), state);
                records.push(record);
            }
        }
        records
    }
}

/// Choose the active heading from a batch of records.
///
/// Among intersecting records the one nearest the top of the viewport wins;
/// equal tops prefer the higher ratio; exact ties keep the earlier record.
pub fn pick_active(records: &[IntersectionRecord]) -> Option<&IntersectionRecord> {
    records
        .iter()
        .filter(|r| r.is_intersecting)
        .fold(None, |best: Option<&IntersectionRecord>, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                let closer = candidate.bounding_top < current.bounding_top;
                let fuller = candidate.bounding_top == current.bounding_top && candidate.ratio > current.ratio;
                if closer || fuller {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        })
}

/// Visibility-driven tracking
#[derive(Debug, Clone, Default)]
pub struct VisibilityStrategy {
    observer: IntersectionObserver,
}

impl VisibilityStrategy {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            observer: IntersectionObserver::new(options),
        }
    }
}

impl SectionTrackingStrategy for VisibilityStrategy {
    fn kind(&self) -> TrackingKind {
        TrackingKind::Visibility
    }

    fn current_active(&mut self, entries: &[HeadingDescriptor], probe: &dyn ViewportProbe) -> Option<String> {
        let records = self.observer.take_records(entries, probe);
        pick_active(&records).map(|r| r.target_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::tracker::strategy::testing::layout;

    fn record(id: &str, intersecting: bool, ratio: f64, top: f64) -> IntersectionRecord {
        IntersectionRecord {
            target_id: id.to_string(),
            is_intersecting: intersecting,
            ratio,
            bounding_top: top,
        }
    }

    #[test]
    fn test_pick_active_smallest_top() {
        let records = vec![
            record("a", true, 1.0, 200.0),
            record("b", true, 0.2, 80.0),
            record("c", false, 0.0, 10.0),
        ];
        assert_eq!(pick_active(&records).unwrap().target_id, "b");
    }

    #[test]
    fn test_pick_active_tie_prefers_higher_ratio() {
        let records = vec![record("a", true, 0.5, 100.0), record("b", true, 1.0, 100.0)];
        assert_eq!(pick_active(&records).unwrap().target_id, "b");
    }

    #[test]
    fn test_pick_active_exact_tie_keeps_first() {
        let records = vec![record("a", true, 1.0, 100.0), record("b", true, 1.0, 100.0)];
        assert_eq!(pick_active(&records).unwrap().target_id, "a");
    }

    #[test]
    fn test_pick_active_none_intersecting() {
        let records = vec![record("a", false, 0.0, 100.0)];
        assert!(pick_active(&records).is_none());
        assert!(pick_active(&[]).is_none());
    }

    #[test]
    fn test_band_excludes_top_margin_and_lower_half() {
        let observer = IntersectionObserver::default();
        // band is [60, 400] for an 800px viewport
        let above = observer.measure("a", LayoutBox::new(0.0, 30.0), 0.0, 800.0);
        let inside = observer.measure("b", LayoutBox::new(100.0, 30.0), 0.0, 800.0);
        let below = observer.measure("c", LayoutBox::new(500.0, 30.0), 0.0, 800.0);
        let edge = observer.measure("d", LayoutBox::new(400.0, 30.0), 0.0, 800.0);

        assert!(!above.is_intersecting);
        assert!(inside.is_intersecting);
        assert_eq!(inside.ratio, 1.0);
        assert!(!below.is_intersecting);
        assert!(edge.is_intersecting);
        assert_eq!(edge.ratio, 0.0);
    }

    #[test]
    fn test_partial_overlap_ratio() {
        let observer = IntersectionObserver::default();
        let partial = observer.measure("a", LayoutBox::new(40.0, 40.0), 0.0, 800.0);
        assert!(partial.is_intersecting);
        assert_eq!(partial.ratio, 0.5);
        assert_eq!(partial.bounding_top, 40.0);
    }

    #[test]
    fn test_only_changes_are_reported() {
        let (entries, mut viewport) = layout(&[100.0, 600.0, 1200.0], 800.0);
        let mut observer = IntersectionObserver::default();

        let first = observer.take_records(&entries, &viewport);
        assert_eq!(first.len(), 3);

        let second = observer.take_records(&entries, &viewport);
        assert!(second.is_empty());

        // h0 leaves the band, h1 enters it
        viewport.scroll_top = 500.0;
        let third = observer.take_records(&entries, &viewport);
        let ids: Vec<&str> = third.iter().map(|r| r.target_id.as_str()).collect();
        assert_eq!(ids, vec!["h0", "h1"]);
    }

    #[test]
    fn test_strategy_picks_visible_heading() {
        let (entries, mut viewport) = layout(&[100.0, 600.0, 1200.0], 800.0);
        let mut strategy = VisibilityStrategy::default();
        assert_eq!(strategy.kind(), TrackingKind::Visibility);
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h0".to_string()));

        // nothing changed, so nothing to report
        assert_eq!(strategy.current_active(&entries, &viewport), None);

        viewport.scroll_top = 1100.0;
        assert_eq!(strategy.current_active(&entries, &viewport), Some("h2".to_string()));
    }
}
