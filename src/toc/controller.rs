use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::TocConfig;
use crate::content::{ContentRoot, Note};
use crate::events::{EventBus, ViewerEvent};
use crate::toc::extractor::extract_resolved;
use crate::toc::model::{SharedModel, SharedRoot, TocModel};
use crate::toc::navigator::{Activation, TocNavigator};
use crate::toc::renderer::{render, SharedView, TocView};
use crate::toc::tracker::{IntersectionRecord, SectionTracker, TrackingKind};
use crate::toc::types::{Epoch, HeadingDescriptor, SourceContext};
use crate::utils::error::ViewerError;

/// Snapshot of the table of contents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocState {
    pub items: Vec<HeadingDescriptor>,
    pub active_section: Option<String>,
    pub note: Option<Note>,
    pub has_content: bool,
    pub epoch: Epoch,
    pub tracking: Option<TrackingKind>,
}

/// Table of contents for the note being viewed.
///
/// Owns the model, its rendered view, the active-section tracker and the
/// navigator, and replaces all of them wholesale whenever content changes.
pub struct TableOfContents {
    config: TocConfig,
    model: SharedModel,
    view: SharedView,
    root: SharedRoot,
    tracker: Rc<SectionTracker>,
    navigator: TocNavigator,
    bus: EventBus,
}

impl TableOfContents {
    pub fn new(config: TocConfig, bus: EventBus) -> Self {
        let model = TocModel::new().into_shared();
        let view = TocView::placeholder(&config.empty_message).into_shared();
        let root: SharedRoot = Rc::new(RefCell::new(None));
        let tracker = Rc::new(SectionTracker::new(
            model.clone(),
            view.clone(),
            bus.clone(),
            config.clone(),
        ));
        let navigator = TocNavigator::new(
            model.clone(),
            root.clone(),
            tracker.clone(),
            bus.clone(),
            config.scroll_offset,
        );

        Self {
            config,
            model,
            view,
            root,
            tracker,
            navigator,
            bus,
        }
    }

    /// Rebuild the table of contents from `root`.
    ///
    /// Observation of the previous content is disposed before anything else.
    /// Unreadable content produces the placeholder, exactly like content
    /// without headings.
    pub fn generate(&self, note: Option<Note>, root: ContentRoot) -> Vec<HeadingDescriptor> {
        self.tracker.dispose();
        let epoch = self.model.borrow_mut().begin_generation(note.clone());
        *self.root.borrow_mut() = Some(root.clone());

        let extracted = root
            .resolve()
            .and_then(|content| extract_resolved(&content, &self.config.levels, epoch).map(|entries| (entries, content)));

        let (entries, content) = match extracted {
            Ok((entries, content)) => (entries, Some(content)),
            Err(e) => {
                warn!("{}", e);
                (Vec::new(), None)
            }
        };

        let source = SourceContext {
            epoch,
            document: content.as_ref().map(|c| c.document.borrow().id()),
            note_id: note.as_ref().map(|n| n.id.clone()),
        };
        self.model.borrow_mut().install(entries.clone(), source);
        *self.view.borrow_mut() = render(&self.model.borrow(), &self.config.empty_message);

        self.bus.publish(ViewerEvent::TocGenerated {
            note: note.clone(),
            entries: entries.clone(),
        });

        if let Some(content) = content.filter(|_| !entries.is_empty()) {
            self.tracker.attach(epoch, content);
        }

        info!(
            "Generated table of contents with {} heading(s) for {}",
            entries.len(),
            note.as_ref().map(|n| n.title.as_str()).unwrap_or("untitled content")
        );
        entries
    }

    /// Regenerate from the current content root
    pub fn refresh(&self) -> Vec<HeadingDescriptor> {
        let root = self.root.borrow().clone();
        match root {
            Some(root) => {
                let note = self.model.borrow().note().cloned();
                self.generate(note, root)
            }
            None => {
                debug!("Nothing to refresh");
                Vec::new()
            }
        }
    }

    /// Stop observation and show the placeholder
    pub fn clear(&self) {
        self.tracker.dispose();
        self.model.borrow_mut().clear();
        *self.root.borrow_mut() = None;
        *self.view.borrow_mut() = TocView::placeholder(&self.config.empty_message);
        debug!("Table of contents cleared");
    }

    /// Release the content and observation; safe to call repeatedly
    pub fn destroy(&self) {
        self.clear();
        info!("Table of contents destroyed");
    }

    /// Follow the link for heading `id`
    pub fn activate(&self, id: &str) -> Result<Activation, ViewerError> {
        self.navigator.activate(id)
    }

    /// Click handler for a rendered link; failures are logged and ignored
    pub fn on_link_click(&self, id: &str) -> bool {
        self.activate(id).is_ok()
    }

    pub fn current_epoch(&self) -> Epoch {
        self.model.borrow().epoch()
    }

    /// Forward a content scroll registered for `epoch`
    pub fn on_scroll(&self, epoch: Epoch, now: Instant) -> Result<(), ViewerError> {
        self.tracker.on_scroll(epoch, now)
    }

    pub fn on_intersections(&self, epoch: Epoch, records: &[IntersectionRecord]) -> Result<Option<String>, ViewerError> {
        self.tracker.on_intersections(epoch, records)
    }

    /// Advance time for debounced tracking
    pub fn tick(&self, now: Instant) -> Result<Option<String>, ViewerError> {
        self.tracker.tick(now)
    }

    pub fn state(&self) -> TocState {
        let model = self.model.borrow();
        TocState {
            items: model.entries().to_vec(),
            active_section: model.active_id().map(str::to_string),
            note: model.note().cloned(),
            has_content: !model.is_empty(),
            epoch: model.epoch(),
            tracking: self.tracker.kind(),
        }
    }

    pub fn active_id(&self) -> Option<String> {
        self.model.borrow().active_id().map(str::to_string)
    }

    /// Markup of the rendered list
    pub fn to_html(&self) -> String {
        self.view.borrow().to_html()
    }

    /// Offset to scroll a TOC container of fixed-height rows so the active
    /// link is centred; `None` when it is already in view or nothing is active.
    pub fn reveal_active(&self, container_scroll: f64, container_height: f64, item_height: f64) -> Option<f64> {
        self.view.borrow().reveal_active(container_scroll, container_height, item_height)
    }

    pub fn view(&self) -> SharedView {
        self.view.clone()
    }

    pub fn tracker(&self) -> &Rc<SectionTracker> {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::EmbeddedFrame;
    use crate::dom::{flow_layout, Document, FlowMetrics, Platform, SharedDocument};
    use crate::events::EventKind;

    fn content(html: &str, platform: Platform) -> (SharedDocument, ContentRoot) {
        let mut document = Document::parse("https://notes.local", html);
        document.set_platform(platform);
        flow_layout(&mut document, &FlowMetrics::default());
        let doc = document.into_shared();
        let root = doc.borrow().root();
        (doc.clone(), ContentRoot::inline(doc, root))
    }

    fn toc() -> (TableOfContents, EventBus) {
        let bus = EventBus::new();
        (TableOfContents::new(TocConfig::default(), bus.clone()), bus)
    }

    fn summary(entries: &[HeadingDescriptor]) -> Vec<(String, String, u8, usize)> {
        entries
            .iter()
            .map(|e| (e.id.clone(), e.text.clone(), e.level, e.index))
            .collect()
    }

    #[test]
    fn test_end_to_end() {
        let (toc, bus) = toc();
        let recorder = bus.recorder();
        let (doc, root) = content("<h1 id=\"a\">Intro</h1><h2>Details</h2>", Platform::default());

        let entries = toc.generate(Some(Note::new("n1", "First")), root);
        assert_eq!(
            summary(&entries),
            vec![
                ("a".to_string(), "Intro".to_string(), 1, 0),
                ("heading-details-1".to_string(), "Details".to_string(), 2, 1),
            ]
        );

        let expected_top = {
            let d = doc.borrow();
            let node = d.get_element_by_id(None, "heading-details-1").unwrap();
            (d.offset_top(node).unwrap() - 60.0).max(0.0)
        };
        let activation = toc.activate("heading-details-1").unwrap();
        assert_eq!(activation.scroll.top, expected_top);
        assert_eq!(doc.borrow().scroll_top(), expected_top);
        assert_eq!(toc.active_id().as_deref(), Some("heading-details-1"));
        assert_eq!(recorder.count(EventKind::SectionJump), 1);
        assert!(toc.to_html().contains("toc-level-2 active"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let (toc, _) = toc();
        let (_, root) = content("<h2>B</h2><h1 id=\"x\">A</h1><h3>C</h3>", Platform::default());

        let first = toc.generate(None, root.clone());
        let second = toc.generate(None, root);
        assert_eq!(summary(&first), summary(&second));
        assert!(second[0].element.epoch > first[0].element.epoch);
    }

    #[test]
    fn test_empty_content_renders_placeholder() {
        let (toc, bus) = toc();
        let recorder = bus.recorder();
        let (_, root) = content("<p>No headings</p>", Platform::default());

        assert!(toc.generate(None, root).is_empty());
        assert_eq!(toc.to_html(), "<li class=\"no-toc-message\">No table of contents</li>");
        assert_eq!(
            recorder.of_kind(EventKind::TocGenerated),
            vec![ViewerEvent::TocGenerated { note: None, entries: Vec::new() }]
        );
        assert!(!toc.tracker().is_attached());
        assert!(!toc.state().has_content);
    }

    #[test]
    fn test_unreadable_frame_degrades_to_placeholder() {
        let (toc, bus) = toc();
        let recorder = bus.recorder();
        let frame = Rc::new(EmbeddedFrame::new("content", "https://notes.local"));
        frame.load_html("https://elsewhere.example", "<h1>Secret</h1>");

        let entries = toc.generate(None, ContentRoot::embedded(frame));
        assert!(entries.is_empty());
        assert!(toc.view().borrow().is_placeholder());
        assert_eq!(recorder.count(EventKind::TocGenerated), 1);
    }

    #[test]
    fn test_disposal_race_after_regeneration() {
        let (toc, bus) = toc();
        let fallback = Platform { intersection_observer: false, smooth_scroll: true };
        let (old_doc, old_root) = content("<h1>Old</h1><p>x</p><h2>Older</h2>", fallback);
        toc.generate(None, old_root);
        let stale = toc.current_epoch();

        let (_, new_root) = content("<h1>New</h1>", fallback);
        toc.generate(None, new_root);
        let recorder = bus.recorder();
        let before = toc.state();

        old_doc.borrow_mut().set_scroll_top(500.0);
        let now = Instant::now();
        assert!(matches!(
            toc.on_scroll(stale, now),
            Err(ViewerError::ObserverDisposalRace { .. })
        ));
        let record = IntersectionRecord {
            target_id: "heading-old-0".to_string(),
            is_intersecting: true,
            ratio: 1.0,
            bounding_top: 70.0,
        };
        assert!(toc.on_intersections(stale, &[record]).is_err());
        assert_eq!(toc.tick(now + std::time::Duration::from_secs(1)).unwrap(), None);

        assert_eq!(toc.state(), before);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_clear_and_destroy() {
        let (toc, _) = toc();
        let (_, root) = content("<h1>One</h1>", Platform::default());
        toc.generate(Some(Note::new("n", "N")), root);
        let epoch = toc.current_epoch();

        toc.clear();
        assert!(toc.state().items.is_empty());
        assert!(toc.state().note.is_none());
        assert!(toc.current_epoch() > epoch);
        assert!(!toc.tracker().is_attached());
        assert!(toc.refresh().is_empty());

        toc.destroy();
        toc.destroy();
        assert!(toc.view().borrow().is_placeholder());
    }

    #[test]
    fn test_refresh_picks_up_new_headings() {
        let (toc, _) = toc();
        let (doc, root) = content("<main id=\"m\"><h1>One</h1></main>", Platform::default());
        toc.generate(Some(Note::new("n", "N")), root);

        {
            let mut d = doc.borrow_mut();
            let main = d.get_element_by_id(None, "m").unwrap();
            let h2 = d.create_element("h2");
            let text = d.create_text("Two");
            d.append_child(h2, text).unwrap();
            d.append_child(main, h2).unwrap();
        }

        let entries = toc.refresh();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "heading-two-1");
        assert_eq!(toc.state().note.map(|n| n.id), Some("n".to_string()));
    }

    #[test]
    fn test_link_click_on_missing_heading_is_noop() {
        let (toc, bus) = toc();
        let recorder = bus.recorder();
        let (_, root) = content("<h1>One</h1>", Platform::default());
        toc.generate(None, root);
        recorder.clear();

        assert!(!toc.on_link_click("missing"));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_reveal_active_follows_activation() {
        let (toc, _) = toc();
        let html: String = (0..20).map(|i| format!("<h2>Item {}</h2>", i)).collect();
        let (_, root) = content(&html, Platform::default());
        toc.generate(None, root);

        toc.activate("heading-item-8-8").unwrap();
        assert_eq!(toc.reveal_active(0.0, 200.0, 20.0), None);
        assert_eq!(toc.reveal_active(200.0, 200.0, 20.0), Some(70.0));

        toc.activate("heading-item-15-15").unwrap();
        assert_eq!(toc.reveal_active(0.0, 200.0, 20.0), Some(200.0));

        toc.clear();
        assert_eq!(toc.reveal_active(0.0, 200.0, 20.0), None);
    }

    #[test]
    fn test_state_reports_tracking() {
        let (toc, _) = toc();
        let (_, root) = content("<h1>One</h1>", Platform::default());
        toc.generate(None, root);
        assert_eq!(toc.state().tracking, Some(TrackingKind::Visibility));

        let fallback = Platform { intersection_observer: false, smooth_scroll: false };
        let (_, root) = content("<h1>One</h1>", fallback);
        toc.generate(None, root);
        assert_eq!(toc.state().tracking, Some(TrackingKind::Scroll));
    }
}
