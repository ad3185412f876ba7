pub mod scroll;
pub mod strategy;
pub mod visibility;

use std::cell::RefCell;
use std::time::Instant;

use log::{debug, warn};

use crate::config::TocConfig;
use crate::content::ResolvedContent;
use crate::events::{EventBus, ViewerEvent};
use crate::toc::model::{ActiveUpdate, SharedModel};
use crate::toc::renderer::SharedView;
use crate::toc::types::Epoch;
use crate::utils::debounce::Debouncer;
use crate::utils::error::ViewerError;

pub use scroll::ScrollFallbackStrategy;
pub use strategy::{DocumentProbe, SectionTrackingStrategy, TrackingKind, ViewportProbe};
pub use visibility::{pick_active, IntersectionObserver, IntersectionRecord, ObserverOptions, VisibilityStrategy};

impl From<&TocConfig> for ObserverOptions {
    fn from(config: &TocConfig) -> Self {
        Self {
            top_margin: config.scroll_offset,
            bottom_cutoff_ratio: config.bottom_cutoff_ratio,
            thresholds: config.visibility_thresholds.clone(),
        }
    }
}

/// Live observation of one generation's headings
struct Observation {
    epoch: Epoch,
    content: ResolvedContent,
    strategy: Box<dyn SectionTrackingStrategy>,
    scroll: Debouncer,
}

/// Keeps the active TOC entry in step with what the reader is looking at.
///
/// Every signal names the epoch it was registered for. Signals for a disposed
/// observation or a superseded generation are dropped.
pub struct SectionTracker {
    model: SharedModel,
    view: SharedView,
    bus: EventBus,
    config: TocConfig,
    observation: RefCell<Option<Observation>>,
}

impl SectionTracker {
    pub fn new(model: SharedModel, view: SharedView, bus: EventBus, config: TocConfig) -> Self {
        Self {
            model,
            view,
            bus,
            config,
            observation: RefCell::new(None),
        }
    }

    /// Start observing `content` for generation `epoch`.
    ///
    /// Any previous observation is disposed first. The strategy follows the
    /// platform's capabilities; visibility observation reports its initial
    /// state right away.
    pub fn attach(&self, epoch: Epoch, content: ResolvedContent) -> TrackingKind {
        self.dispose();

        let platform = content
            .document
            .try_borrow()
            .map(|doc| doc.platform())
            .unwrap_or_default();

        let strategy: Box<dyn SectionTrackingStrategy> = if platform.intersection_observer {
            Box::new(VisibilityStrategy::new(ObserverOptions::from(&self.config)))
        } else {
            Box::new(ScrollFallbackStrategy::new(self.config.highlight_threshold))
        };
        let kind = strategy.kind();

        *self.observation.borrow_mut() = Some(Observation {
            epoch,
            content,
            strategy,
            scroll: Debouncer::new(self.config.scroll_debounce()),
        });
        debug!("Tracking active section for epoch {} ({:?})", epoch, kind);

        if kind == TrackingKind::Visibility {
            if let Err(e) = self.evaluate(epoch) {
                debug!("Initial visibility check skipped: {}", e);
            }
        }
        kind
    }

    /// Stop observing; safe to call any number of times
    pub fn dispose(&self) -> bool {
        let previous = self.observation.borrow_mut().take();
        if let Some(observation) = &previous {
            debug!("Disposed section tracking for epoch {}", observation.epoch);
        }
        previous.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.observation.borrow().is_some()
    }

    pub fn kind(&self) -> Option<TrackingKind> {
        self.observation.borrow().as_ref().map(|o| o.strategy.kind())
    }

    /// Epoch of the current observation
    pub fn epoch(&self) -> Option<Epoch> {
        self.observation.borrow().as_ref().map(|o| o.epoch)
    }

    fn guard(&self, epoch: Epoch) -> Result<(), ViewerError> {
        let current = self.model.borrow().epoch();
        let observed = self.epoch();

        if observed == Some(epoch) && current == epoch {
            return Ok(());
        }
        let err = ViewerError::ObserverDisposalRace {
            expected: current,
            actual: epoch,
        };
        debug!("{}", err);
        Err(err)
    }

    /// Content scrolled. Visibility tracking re-measures immediately; the
    /// fallback waits for the scroll to settle (see [`tick`](Self::tick)).
    pub fn on_scroll(&self, epoch: Epoch, now: Instant) -> Result<(), ViewerError> {
        self.guard(epoch)?;

        match self.kind() {
            Some(TrackingKind::Visibility) => self.evaluate(epoch).map(|_| ()),
            Some(TrackingKind::Scroll) => {
                if let Some(observation) = self.observation.borrow_mut().as_mut() {
                    observation.scroll.signal(now);
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Advance time; runs a pending debounced scroll evaluation.
    ///
    /// Returns the newly active id, if the active section changed.
    pub fn tick(&self, now: Instant) -> Result<Option<String>, ViewerError> {
        let due = {
            let mut slot = self.observation.borrow_mut();
            match slot.as_mut() {
                Some(observation) => observation.scroll.poll(now).then_some(observation.epoch),
                None => None,
            }
        };

        match due {
            Some(epoch) => self.evaluate(epoch),
            None => Ok(None),
        }
    }

    /// Intersection records delivered by a native observer
    pub fn on_intersections(&self, epoch: Epoch, records: &[IntersectionRecord]) -> Result<Option<String>, ViewerError> {
        self.guard(epoch)?;

        match pick_active(records) {
            Some(record) => {
                let id = record.target_id.clone();
                Ok(self.set_active(&id)?.then_some(id))
            }
            None => Ok(None),
        }
    }

    fn evaluate(&self, epoch: Epoch) -> Result<Option<String>, ViewerError> {
        self.guard(epoch)?;

        let candidate = {
            let model = self.model.borrow();
            let mut slot = self.observation.borrow_mut();
            let observation = match slot.as_mut() {
                Some(observation) => observation,
                None => return Ok(None),
            };
            let doc = observation
                .content
                .document
                .try_borrow()
                .map_err(|_| ViewerError::ContentUnavailable("content document is busy".to_string()))?;
            let probe = DocumentProbe::new(&doc, epoch);
            observation.strategy.current_active(model.entries(), &probe)
        };

        match candidate {
            Some(id) => Ok(self.set_active(&id)?.then_some(id)),
            None => Ok(None),
        }
    }

    /// Move the active marker to `id`.
    ///
    /// Returns `Ok(false)` when `id` is already active. Unknown ids are
    /// logged and leave the state untouched.
    pub fn set_active(&self, id: &str) -> Result<bool, ViewerError> {
        let update = self.model.borrow_mut().set_active(id);

        let previous = match update {
            Ok(ActiveUpdate::Unchanged) => return Ok(false),
            Ok(ActiveUpdate::Changed { previous }) => previous,
            Err(e) => {
                warn!("{}", e);
                return Err(e);
            }
        };

        self.view.borrow_mut().mark_active(id);
        let note = self.model.borrow().note().cloned();
        debug!("Active section {:?} -> {}", previous, id);

        self.bus.publish(ViewerEvent::ActiveSectionChange {
            id: id.to_string(),
            previous_id: previous,
            note,
        });
        Ok(true)
    }
}
