use std::rc::Rc;
use std::time::Instant;

use log::{debug, info};

use crate::config::ViewerConfig;
use crate::content::{ContentTarget, Note};
use crate::events::{EventBus, EventKind, SubscriptionId};
use crate::layout::LayoutManager;
use crate::loader::{ContentFetcher, NoteLoader};
use crate::menu::OverlayMenu;
use crate::toc::{Epoch, HeadingDescriptor, TableOfContents};
use crate::utils::error::ViewerError;

/// A note-viewing session: table of contents, responsive layout and overlay
/// menu wired together over one event bus.
pub struct Viewer {
    config: ViewerConfig,
    bus: EventBus,
    toc: TableOfContents,
    layout: Rc<LayoutManager>,
    menu: Rc<OverlayMenu>,
    subscriptions: Vec<SubscriptionId>,
}

impl Viewer {
    /// Create a session for a window of the given size
    pub fn new(config: ViewerConfig, width: f64, height: f64) -> Self {
        let bus = EventBus::new();
        let toc = TableOfContents::new(config.toc.clone(), bus.clone());
        let layout = Rc::new(LayoutManager::new(config.layout.clone(), bus.clone(), width, height));
        let menu = OverlayMenu::new(config.menu.clone(), bus.clone(), layout.mode());
        menu.attach();

        let subscriptions = vec![
            sync_menu(&bus, &layout, EventKind::MenuShow, true),
            sync_menu(&bus, &layout, EventKind::MenuHide, false),
        ];

        info!("Viewer initialized in {} mode", layout.mode());
        Self {
            config,
            bus,
            toc,
            layout,
            menu,
            subscriptions,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn toc(&self) -> &TableOfContents {
        &self.toc
    }

    pub fn layout(&self) -> &Rc<LayoutManager> {
        &self.layout
    }

    pub fn menu(&self) -> &Rc<OverlayMenu> {
        &self.menu
    }

    /// Load `note`, render it into `target` and rebuild the table of contents.
    ///
    /// A failed load leaves the placeholder in place of the previous note's
    /// table of contents.
    pub async fn open_note<F: ContentFetcher>(
        &self,
        loader: &NoteLoader<F>,
        note: &Note,
        target: &ContentTarget,
    ) -> Result<Vec<HeadingDescriptor>, ViewerError> {
        let loaded = match loader.load(note).await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.toc.clear();
                return Err(e);
            }
        };

        let root = match target.render(&loaded.content, &self.config.toc.flow) {
            Ok(root) => root,
            Err(e) => {
                self.toc.clear();
                return Err(e);
            }
        };

        self.layout.set_note_open(true);
        if self.layout.is_mobile() {
            self.layout.show_note_view();
        }

        let entries = self.toc.generate(Some(note.clone()), root);
        debug!("Opened note {} with {} heading(s)", note.id, entries.len());
        Ok(entries)
    }

    /// Generation that content scroll signals should be tagged with
    pub fn scroll_epoch(&self) -> Epoch {
        self.toc.current_epoch()
    }

    pub fn on_content_scroll(&self, epoch: Epoch, now: Instant) -> Result<(), ViewerError> {
        self.toc.on_scroll(epoch, now)
    }

    pub fn on_resize(&self, width: f64, height: f64, now: Instant) {
        self.layout.on_resize(width, height, now);
    }

    /// Advance time for every debounced handler
    pub fn tick(&self, now: Instant) {
        self.layout.tick(now);
        if let Err(e) = self.toc.tick(now) {
            debug!("Scroll evaluation dropped: {}", e);
        }
    }

    pub fn on_link_click(&self, id: &str) -> bool {
        self.toc.on_link_click(id)
    }

    pub fn handle_key(&self, key: &str) -> bool {
        self.menu.handle_key(key)
    }

    /// Tear down observation and subscriptions; safe to call repeatedly
    pub fn destroy(&mut self) {
        self.toc.destroy();
        self.menu.destroy();
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
    }
}

fn sync_menu(bus: &EventBus, layout: &Rc<LayoutManager>, kind: EventKind, visible: bool) -> SubscriptionId {
    let layout = Rc::downgrade(layout);
    bus.subscribe(kind, move |_| {
        if let Some(layout) = layout.upgrade() {
            layout.sync_menu_visible(visible);
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::content::EmbeddedFrame;
    use crate::dom::{Document, Platform, SharedDocument};
    use crate::events::ViewerEvent;
    use crate::layout::LayoutMode;
    use crate::loader::StaticFetcher;

    const NOTE_HTML: &str = "<h1 id=\"a\">Intro</h1><p>Opening words.</p><h2>Details</h2><p>More.</p>";

    fn inline_target() -> (SharedDocument, ContentTarget) {
        let doc = Document::parse(
            "https://notes.local",
            "<nav><h2>Notes</h2></nav><main id=\"note\"></main>",
        )
        .into_shared();
        let container = doc.borrow().get_element_by_id(None, "note").unwrap();
        (doc.clone(), ContentTarget::Inline { document: doc, container })
    }

    fn loader(bus: &EventBus) -> NoteLoader<StaticFetcher> {
        let fetcher = StaticFetcher::new().with_page("https://notes.local/one.html", NOTE_HTML);
        NoteLoader::new(fetcher, ViewerConfig::default().loader, bus.clone())
    }

    fn one() -> Note {
        Note::new("one", "One").with_url("https://notes.local/one.html")
    }

    #[tokio::test]
    async fn test_open_note_inline() {
        let viewer = Viewer::new(ViewerConfig::default(), 1280.0, 800.0);
        let recorder = viewer.bus().recorder();
        let loader = loader(viewer.bus());
        let (_, target) = inline_target();

        let entries = viewer.open_note(&loader, &one(), &target).await.unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "heading-details-1"]);
        assert_eq!(viewer.toc().state().note, Some(one()));

        let kinds: Vec<EventKind> = recorder.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds[0], EventKind::NoteLoaded);
        assert!(kinds.contains(&EventKind::TocGenerated));
    }

    #[tokio::test]
    async fn test_open_note_in_frame() {
        let viewer = Viewer::new(ViewerConfig::default(), 1280.0, 800.0);
        let loader = loader(viewer.bus());
        let frame = Rc::new(EmbeddedFrame::new("contentFrame", "https://notes.local"));
        let target = ContentTarget::Frame(frame.clone());

        let entries = viewer.open_note(&loader, &one(), &target).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(viewer.on_link_click("heading-details-1"));

        let doc = frame.document().unwrap();
        assert!(doc.borrow().scroll_top() >= 0.0);
        assert!(doc.borrow().last_scroll().is_some());
    }

    #[tokio::test]
    async fn test_failed_load_clears_toc() {
        let viewer = Viewer::new(ViewerConfig::default(), 1280.0, 800.0);
        let loader = loader(viewer.bus());
        let (_, target) = inline_target();
        viewer.open_note(&loader, &one(), &target).await.unwrap();

        let mut config = ViewerConfig::default().loader;
        config.retry_attempts = 1;
        let broken = NoteLoader::new(StaticFetcher::new(), config, viewer.bus().clone());
        let missing = Note::new("two", "Two").with_url("https://notes.local/two.html");

        assert!(viewer.open_note(&broken, &missing, &target).await.is_err());
        assert!(!viewer.toc().state().has_content);
        assert!(viewer.toc().view().borrow().is_placeholder());
    }

    #[tokio::test]
    async fn test_mobile_jump_closes_menu() {
        let viewer = Viewer::new(ViewerConfig::default(), 600.0, 900.0);
        let loader = loader(viewer.bus());
        let (_, target) = inline_target();
        viewer.open_note(&loader, &one(), &target).await.unwrap();
        assert!(!viewer.layout().sidebar_visible());

        assert_eq!(viewer.layout().toggle_menu(Some(true)), Some(true));
        assert!(viewer.menu().is_visible());

        assert!(viewer.on_link_click("heading-details-1"));
        assert!(!viewer.menu().is_visible());
        assert!(!viewer.layout().menu_visible());
    }

    #[tokio::test]
    async fn test_escape_syncs_layout() {
        let viewer = Viewer::new(ViewerConfig::default(), 600.0, 900.0);
        viewer.layout().toggle_menu(Some(true));
        assert!(viewer.handle_key("Escape"));
        assert!(!viewer.layout().menu_visible());
    }

    #[tokio::test]
    async fn test_resize_to_desktop_closes_menu() {
        let viewer = Viewer::new(ViewerConfig::default(), 600.0, 900.0);
        let recorder = viewer.bus().recorder();
        viewer.layout().toggle_menu(Some(true));

        let start = Instant::now();
        viewer.on_resize(1400.0, 900.0, start);
        viewer.tick(start + Duration::from_millis(200));

        assert_eq!(viewer.layout().mode(), LayoutMode::Desktop);
        assert!(!viewer.menu().is_visible());
        assert!(recorder.events().contains(&ViewerEvent::MenuHide));
    }

    #[tokio::test]
    async fn test_scroll_fallback_through_session() {
        let viewer = Viewer::new(ViewerConfig::default(), 1280.0, 800.0);
        let loader = loader(viewer.bus());
        let (doc, target) = inline_target();
        doc.borrow_mut().set_platform(Platform { intersection_observer: false, smooth_scroll: false });
        viewer.open_note(&loader, &one(), &target).await.unwrap();

        let epoch = viewer.scroll_epoch();
        let start = Instant::now();
        doc.borrow_mut().set_scroll_top(2000.0);
        viewer.on_content_scroll(epoch, start).unwrap();
        viewer.tick(start + Duration::from_millis(150));
        assert_eq!(viewer.toc().active_id().as_deref(), Some("heading-details-1"));
    }

    #[tokio::test]
    async fn test_destroy_is_repeatable() {
        let mut viewer = Viewer::new(ViewerConfig::default(), 1280.0, 800.0);
        viewer.destroy();
        viewer.destroy();
        assert_eq!(viewer.bus().subscriber_count(), 0);
    }
}
