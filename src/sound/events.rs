//! Playback lifecycle notifications.
//!
//! Events are delivered synchronously, on the context that raised them, to
//! every subscriber registered at that moment.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Playback lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Playback was initiated
    Started,
    /// Playback was halted by `stop`, explicitly or before a new `play`
    Stopped,
    /// A one-shot clip of known duration reached its end
    Completed,
}

impl PlayerEvent {
    /// Returns the string representation of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEvent::Started => "started",
            PlayerEvent::Stopped => "stopped",
            PlayerEvent::Completed => "completed",
        }
    }
}

/// Identifies a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(PlayerEvent)>;

/// Observer list for [`PlayerEvent`]s.
#[derive(Default)]
pub struct EventHub {
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
    next_id: Cell<u64>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for every event.
    pub fn subscribe(&self, handler: impl Fn(PlayerEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Registers a handler for `Started` only.
    pub fn on_started(&self, handler: impl Fn() + 'static) -> SubscriptionId {
        self.subscribe_to(PlayerEvent::Started, handler)
    }

    /// Registers a handler for `Stopped` only.
    pub fn on_stopped(&self, handler: impl Fn() + 'static) -> SubscriptionId {
        self.subscribe_to(PlayerEvent::Stopped, handler)
    }

    /// Registers a handler for `Completed` only.
    pub fn on_completed(&self, handler: impl Fn() + 'static) -> SubscriptionId {
        self.subscribe_to(PlayerEvent::Completed, handler)
    }

    fn subscribe_to(&self, wanted: PlayerEvent, handler: impl Fn() + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if event == wanted {
                handler();
            }
        })
    }

    /// Forwards every event into an unbounded channel.
    ///
    /// Pass the returned id to [`EventHub::unsubscribe`] when done; otherwise
    /// the subscription removes itself on the first event after the receiver
    /// is dropped.
    pub fn channel(self: &Rc<Self>) -> (SubscriptionId, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Rc::downgrade(self);
        let id = Rc::new(Cell::new(None::<SubscriptionId>));
        let own_id = Rc::clone(&id);

        let subscription = self.subscribe(move |event| {
            if tx.send(event).is_err() {
                if let (Some(hub), Some(id)) = (hub.upgrade(), own_id.get()) {
                    hub.unsubscribe(id);
                }
            }
        });
        id.set(Some(subscription));
        (subscription, rx)
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Delivers an event to the current subscribers.
    pub(crate) fn emit(&self, event: PlayerEvent) {
        let snapshot: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
