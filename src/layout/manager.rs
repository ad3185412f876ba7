use std::cell::RefCell;
use std::time::Instant;

use log::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::events::{EventBus, MobileView, ViewerEvent};
use crate::layout::types::{LayoutMode, LayoutState};
use crate::utils::debounce::Debouncer;

struct LayoutInner {
    mode: LayoutMode,
    sidebar_visible: bool,
    menu_visible: bool,
    width: f64,
    height: f64,
    /// A note is open, so mobile mode starts on the note view
    note_open: bool,
    pending: Option<(f64, f64)>,
    resize: Debouncer,
}

/// Switches between desktop and mobile layouts and tracks which panes are visible.
///
/// State changes are announced on the bus; no borrow is held while publishing.
pub struct LayoutManager {
    config: LayoutConfig,
    bus: EventBus,
    inner: RefCell<LayoutInner>,
}

impl LayoutManager {
    pub fn new(config: LayoutConfig, bus: EventBus, width: f64, height: f64) -> Self {
        let mode = detect(&config, width);
        let resize = Debouncer::new(config.resize_debounce());
        debug!("Initial layout mode: {}", mode);

        Self {
            config,
            bus,
            inner: RefCell::new(LayoutInner {
                mode,
                sidebar_visible: true,
                menu_visible: false,
                width,
                height,
                note_open: false,
                pending: None,
                resize,
            }),
        }
    }

    /// Layout mode for a viewport width
    pub fn detect_mode(&self, width: f64) -> LayoutMode {
        detect(&self.config, width)
    }

    pub fn mode(&self) -> LayoutMode {
        self.inner.borrow().mode
    }

    pub fn is_mobile(&self) -> bool {
        self.mode() == LayoutMode::Mobile
    }

    pub fn sidebar_visible(&self) -> bool {
        self.inner.borrow().sidebar_visible
    }

    pub fn menu_visible(&self) -> bool {
        self.inner.borrow().menu_visible
    }

    /// Record whether a note is open
    pub fn set_note_open(&self, open: bool) {
        self.inner.borrow_mut().note_open = open;
    }

    /// Raw window resize; handled once resizing settles
    pub fn on_resize(&self, width: f64, height: f64, now: Instant) {
        let mut inner = self.inner.borrow_mut();
        inner.pending = Some((width, height));
        inner.resize.signal(now);
    }

    /// Advance time; returns true if a settled resize was handled
    pub fn tick(&self, now: Instant) -> bool {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            if inner.resize.poll(now) {
                inner.pending.take()
            } else {
                None
            }
        };

        match pending {
            Some((width, height)) => {
                self.handle_resize(width, height);
                true
            }
            None => false,
        }
    }

    /// Apply a new viewport size immediately
    pub fn handle_resize(&self, width: f64, height: f64) {
        let new_mode = self.detect_mode(width);
        let mode_changed = {
            let mut inner = self.inner.borrow_mut();
            inner.width = width;
            inner.height = height;
            new_mode != inner.mode
        };

        if mode_changed {
            info!("Layout mode changed: {} -> {}", self.mode(), new_mode);
            self.switch_mode(new_mode);
        }

        self.bus.publish(ViewerEvent::Resize {
            mode: self.mode(),
            mode_changed,
            width,
            height,
        });
    }

    /// Switch layout mode; returns false if already in `mode`
    pub fn switch_mode(&self, mode: LayoutMode) -> bool {
        let (from, note_open) = {
            let mut inner = self.inner.borrow_mut();
            if inner.mode == mode {
                return false;
            }
            let from = inner.mode;
            inner.mode = mode;
            (from, inner.note_open)
        };

        match mode {
            LayoutMode::Desktop => {
                let mut inner = self.inner.borrow_mut();
                inner.sidebar_visible = true;
                inner.menu_visible = false;
                debug!("Applied desktop layout");
            }
            LayoutMode::Mobile => {
                if note_open {
                    self.show_note_view();
                } else {
                    self.show_list_view();
                }
                debug!("Applied mobile layout");
            }
        }

        self.bus.publish(ViewerEvent::ModeChange { from, to: mode });
        true
    }

    /// Show, hide or flip the sidebar.
    ///
    /// In mobile mode the sidebar is the note list, so this switches views.
    pub fn toggle_sidebar(&self, visible: Option<bool>) -> bool {
        let (visible, mode) = {
            let mut inner = self.inner.borrow_mut();
            inner.sidebar_visible = visible.unwrap_or(!inner.sidebar_visible);
            (inner.sidebar_visible, inner.mode)
        };

        if mode == LayoutMode::Mobile {
            if visible {
                self.show_list_view();
            } else {
                self.show_note_view();
            }
        }

        self.bus.publish(ViewerEvent::SidebarToggle { visible, mode });
        debug!("Sidebar {} in {} mode", if visible { "shown" } else { "hidden" }, mode);
        visible
    }

    /// Show, hide or flip the overlay menu; only meaningful in mobile mode
    pub fn toggle_menu(&self, visible: Option<bool>) -> Option<bool> {
        let (visible, mode) = {
            let mut inner = self.inner.borrow_mut();
            if inner.mode != LayoutMode::Mobile {
                warn!("Menu toggle ignored in {} mode", inner.mode);
                return None;
            }
            inner.menu_visible = visible.unwrap_or(!inner.menu_visible);
            (inner.menu_visible, inner.mode)
        };

        self.bus.publish(ViewerEvent::MenuToggle { visible, mode });
        Some(visible)
    }

    /// Track visibility changes made by the menu itself (close button, Escape)
    pub fn sync_menu_visible(&self, visible: bool) {
        self.inner.borrow_mut().menu_visible = visible;
    }

    /// Mobile only: show the open note instead of the list
    pub fn show_note_view(&self) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.mode != LayoutMode::Mobile {
                warn!("Note view requested in {} mode", inner.mode);
                return false;
            }
            inner.sidebar_visible = false;
        }
        self.bus.publish(ViewerEvent::ViewChange { view: MobileView::Note });
        true
    }

    /// Show the note list
    pub fn show_list_view(&self) {
        self.inner.borrow_mut().sidebar_visible = true;
        self.bus.publish(ViewerEvent::ViewChange { view: MobileView::List });
    }

    /// Re-detect the mode from the last known width
    pub fn refresh(&self) -> bool {
        let width = self.inner.borrow().width;
        let changed = self.switch_mode(self.detect_mode(width));
        debug!("Layout refreshed");
        changed
    }

    pub fn state(&self) -> LayoutState {
        let inner = self.inner.borrow();
        LayoutState {
            current_mode: inner.mode,
            sidebar_visible: inner.sidebar_visible,
            menu_visible: inner.menu_visible,
            width: inner.width,
            height: inner.height,
            breakpoints: self.config.clone(),
        }
    }
}

fn detect(config: &LayoutConfig, width: f64) -> LayoutMode {
    if width <= config.mobile_breakpoint {
        LayoutMode::Mobile
    } else {
        LayoutMode::Desktop
    }
}
