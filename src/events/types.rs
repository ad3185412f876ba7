use serde::Serialize;

use crate::content::Note;
use crate::layout::LayoutMode;
use crate::toc::HeadingDescriptor;

/// Notifications published on the viewer's event bus
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewerEvent {
    /// A table of contents was (re)generated; `entries` is empty for the placeholder state
    TocGenerated {
        note: Option<Note>,
        entries: Vec<HeadingDescriptor>,
    },
    /// The user picked a TOC entry
    SectionJump {
        id: String,
        index: usize,
        level: u8,
        note: Option<Note>,
    },
    /// The highlighted section changed
    ActiveSectionChange {
        id: String,
        previous_id: Option<String>,
        note: Option<Note>,
    },
    /// Content was scrolled to a heading
    Scroll {
        id: String,
        index: usize,
        scroll_top: f64,
        note: Option<Note>,
    },
    /// Debounced viewport resize
    Resize {
        mode: LayoutMode,
        mode_changed: bool,
        width: f64,
        height: f64,
    },
    /// Layout switched between desktop and mobile
    ModeChange { from: LayoutMode, to: LayoutMode },
    SidebarToggle { visible: bool, mode: LayoutMode },
    /// Request to show or hide the overlay navigation panel
    MenuToggle { visible: bool, mode: LayoutMode },
    /// Mobile layout switched between the note list and the note itself
    ViewChange { view: MobileView },
    MenuShow { toc_items: usize },
    MenuHide,
    NoteLoaded { note: Note, from_cache: bool },
    NoteLoadError { note: Note, error: String },
}

/// Which pane the mobile layout shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MobileView {
    List,
    Note,
}

/// Event discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TocGenerated,
    SectionJump,
    ActiveSectionChange,
    Scroll,
    Resize,
    ModeChange,
    SidebarToggle,
    MenuToggle,
    ViewChange,
    MenuShow,
    MenuHide,
    NoteLoaded,
    NoteLoadError,
}

impl ViewerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewerEvent::TocGenerated { .. } => EventKind::TocGenerated,
            ViewerEvent::SectionJump { .. } => EventKind::SectionJump,
            ViewerEvent::ActiveSectionChange { .. } => EventKind::ActiveSectionChange,
            ViewerEvent::Scroll { .. } => EventKind::Scroll,
            ViewerEvent::Resize { .. } => EventKind::Resize,
            ViewerEvent::ModeChange { .. } => EventKind::ModeChange,
            ViewerEvent::SidebarToggle { .. } => EventKind::SidebarToggle,
            ViewerEvent::MenuToggle { .. } => EventKind::MenuToggle,
            ViewerEvent::ViewChange { .. } => EventKind::ViewChange,
            ViewerEvent::MenuShow { .. } => EventKind::MenuShow,
            ViewerEvent::MenuHide => EventKind::MenuHide,
            ViewerEvent::NoteLoaded { .. } => EventKind::NoteLoaded,
            ViewerEvent::NoteLoadError { .. } => EventKind::NoteLoadError,
        }
    }

    /// Namespaced event name, as dispatched to page listeners
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::TocGenerated => "toc:tocGenerated",
            EventKind::SectionJump => "toc:sectionJump",
            EventKind::ActiveSectionChange => "toc:activeSectionChange",
            EventKind::Scroll => "toc:scroll",
            EventKind::Resize => "layout:resize",
            EventKind::ModeChange => "layout:modeChange",
            EventKind::SidebarToggle => "layout:sidebarToggle",
            EventKind::MenuToggle => "layout:menuToggle",
            EventKind::ViewChange => "layout:viewChange",
            EventKind::MenuShow => "mobileMenu:show",
            EventKind::MenuHide => "mobileMenu:hide",
            EventKind::NoteLoaded => "noteRenderer:noteLoaded",
            EventKind::NoteLoadError => "noteRenderer:noteLoadError",
        }
    }
}
