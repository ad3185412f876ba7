use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::config::MenuConfig;
use crate::events::{EventBus, EventKind, SubscriptionId, ViewerEvent};
use crate::layout::LayoutMode;

/// Snapshot of the overlay menu
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuState {
    pub is_visible: bool,
    pub toc_items: usize,
    pub active_section: Option<String>,
    pub mode: LayoutMode,
}

#[derive(Debug)]
struct MenuInner {
    visible: bool,
    mode: LayoutMode,
    toc_items: usize,
    active_section: Option<String>,
    /// Background scrolling is suppressed while the menu is open
    scroll_locked: bool,
}

/// Slide-in panel holding the table of contents on small screens.
///
/// Coordinates with the rest of the viewer only through the event bus.
pub struct OverlayMenu {
    config: MenuConfig,
    bus: EventBus,
    inner: RefCell<MenuInner>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
}

impl OverlayMenu {
    pub fn new(config: MenuConfig, bus: EventBus, mode: LayoutMode) -> Rc<Self> {
        Rc::new(Self {
            config,
            bus,
            inner: RefCell::new(MenuInner {
                visible: false,
                mode,
                toc_items: 0,
                active_section: None,
                scroll_locked: false,
            }),
            subscriptions: RefCell::new(Vec::new()),
        })
    }

    /// Subscribe to layout and TOC events
    pub fn attach(self: &Rc<Self>) {
        if !self.subscriptions.borrow().is_empty() {
            return;
        }

        let ids = vec![
            self.listen(EventKind::ModeChange, |menu, event| {
                if let ViewerEvent::ModeChange { to, .. } = event {
                    menu.inner.borrow_mut().mode = *to;
                    if *to == LayoutMode::Desktop {
                        menu.hide();
                    }
                }
            }),
            self.listen(EventKind::MenuToggle, |menu, event| {
                if let ViewerEvent::MenuToggle { visible, .. } = event {
                    if *visible {
                        menu.show();
                    } else {
                        menu.hide();
                    }
                }
            }),
            self.listen(EventKind::SectionJump, |menu, _| {
                let close = {
                    let inner = menu.inner.borrow();
                    inner.visible && inner.mode == LayoutMode::Mobile
                };
                if close {
                    menu.hide();
                }
            }),
            self.listen(EventKind::TocGenerated, |menu, event| {
                if let ViewerEvent::TocGenerated { entries, .. } = event {
                    let mut inner = menu.inner.borrow_mut();
                    inner.toc_items = entries.len();
                    inner.active_section = None;
                }
            }),
            self.listen(EventKind::ActiveSectionChange, |menu, event| {
                if let ViewerEvent::ActiveSectionChange { id, .. } = event {
                    menu.inner.borrow_mut().active_section = Some(id.clone());
                }
            }),
        ];

        *self.subscriptions.borrow_mut() = ids;
        debug!("Overlay menu attached");
    }

    fn listen<F>(self: &Rc<Self>, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&OverlayMenu, &ViewerEvent) + 'static,
    {
        let menu: Weak<OverlayMenu> = Rc::downgrade(self);
        self.bus.subscribe(kind, move |event| {
            if let Some(menu) = menu.upgrade() {
                handler(&menu, event);
            }
        })
    }

    /// Open the menu; returns false if it was already open
    pub fn show(&self) -> bool {
        let toc_items = {
            let mut inner = self.inner.borrow_mut();
            if inner.visible {
                return false;
            }
            inner.visible = true;
            inner.scroll_locked = true;
            inner.toc_items
        };
        self.bus.publish(ViewerEvent::MenuShow { toc_items });
        debug!("Overlay menu shown");
        true
    }

    /// Close the menu; returns false if it was already closed
    pub fn hide(&self) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.visible {
                return false;
            }
            inner.visible = false;
            inner.scroll_locked = false;
        }
        self.bus.publish(ViewerEvent::MenuHide);
        debug!("Overlay menu hidden");
        true
    }

    pub fn toggle(&self) -> bool {
        if self.is_visible() {
            self.hide();
            false
        } else {
            self.show();
            true
        }
    }

    /// Keyboard shortcut handling; Escape closes an open menu
    pub fn handle_key(&self, key: &str) -> bool {
        key == "Escape" && self.hide()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    pub fn scroll_locked(&self) -> bool {
        self.inner.borrow().scroll_locked
    }

    /// Length of the open/close transition
    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.config.animation_ms)
    }

    pub fn state(&self) -> MenuState {
        let inner = self.inner.borrow();
        MenuState {
            is_visible: inner.visible,
            toc_items: inner.toc_items,
            active_section: inner.active_section.clone(),
            mode: inner.mode,
        }
    }

    /// Close and stop listening; safe to call repeatedly
    pub fn destroy(&self) {
        self.hide();
        let ids: Vec<SubscriptionId> = self.subscriptions.borrow_mut().drain(..).collect();
        for id in ids {
            self.bus.unsubscribe(id);
        }
        info!("Overlay menu destroyed");
    }
}
