use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::events::types::{EventKind, ViewerEvent};

type Handler = Rc<dyn Fn(&ViewerEvent)>;

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Typed publish/subscribe channel shared by the viewer's components.
///
/// Cloning yields another handle to the same bus. Handlers run synchronously
/// in subscription order and may publish or (un)subscribe re-entrantly; each
/// publish dispatches to the subscribers present when it started.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.subscribers.push(Subscriber { id, kind, handler });
        id
    }

    /// Listen for one kind of event
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&ViewerEvent) + 'static,
    {
        self.add(Some(kind), Rc::new(handler))
    }

    /// Listen for every event
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ViewerEvent) + 'static,
    {
        self.add(None, Rc::new(handler))
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Deliver an event to every matching subscriber
    pub fn publish(&self, event: ViewerEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.kind.map_or(true, |k| k == kind))
            .map(|s| s.handler.clone())
            .collect();

        debug!("Publishing {} to {} subscriber(s)", event.name(), handlers.len());
        for handler in handlers {
            handler(&event);
        }
    }

    /// Record every published event, for inspection by hosts and tests
    pub fn recorder(&self) -> EventRecorder {
        let recorder = EventRecorder::default();
        let sink = recorder.events.clone();
        self.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
        recorder
    }
}

/// Accumulates events published on a bus
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<ViewerEvent>>>,
}

impl EventRecorder {
    pub fn events(&self) -> Vec<ViewerEvent> {
        self.events.borrow().clone()
    }

    /// Recorded events of one kind
    pub fn of_kind(&self, kind: EventKind) -> Vec<ViewerEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
