//! Process-wide typed-topic publish/subscribe.
//!
//! The bus decouples the store from its UI consumers: badge counters,
//! panel renderers, and button states all subscribe to the same topic
//! instead of reaching into each other. Delivery is synchronous, in
//! subscription order, on the calling thread - there is no queue and no
//! deferred delivery, so a publisher returns only after every subscriber
//! has observed the payload.
//!
//! Topics are typed: a [`Topic<T>`] pairs the channel name with its
//! payload type, so publishing the wrong payload shape is a compile
//! error rather than a silently ignored event.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// A named channel with a fixed payload type.
///
/// Declare topics as constants next to the payload they carry:
///
/// ```
/// use flourish_surface::bus::Topic;
///
/// #[derive(Clone)]
/// struct InventoryLow { sku: String }
///
/// const INVENTORY_LOW: Topic<InventoryLow> = Topic::new("inventory.low");
/// ```
pub struct Topic<T> {
    name: &'static str,
    _payload: PhantomData<fn(&T)>,
}

impl<T> Topic<T> {
    /// Define a topic with the given channel name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// The channel name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Topic<T> {}

type ErasedHandler = Rc<dyn Fn(&dyn Any)>;

/// The process-wide event channel.
///
/// A topic springs into existence on first subscribe; publishing to a
/// topic nobody has subscribed to is a silent no-op. Subscribers added
/// during a publish are not invoked for that same publish: the
/// subscriber list is snapshotted when delivery starts.
pub struct EventBus {
    topics: RefCell<HashMap<&'static str, Vec<(u64, ErasedHandler)>>>,
    next_id: Cell<u64>,
    // Handed to subscriptions so dropping one can reach back into the
    // bus without keeping it alive.
    self_handle: Weak<Self>,
}

impl EventBus {
    /// Create a bus with no topics.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|self_handle| Self {
            topics: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            self_handle: self_handle.clone(),
        })
    }

    /// Subscribe `handler` to `topic`.
    ///
    /// The returned [`Subscription`] keeps the handler registered;
    /// dropping it (or calling [`Subscription::cancel`]) unsubscribes.
    pub fn subscribe<T: 'static>(
        &self,
        topic: Topic<T>,
        handler: impl Fn(&T) + 'static,
    ) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let erased: ErasedHandler = Rc::new(move |payload: &dyn Any| {
            if let Some(payload) = payload.downcast_ref::<T>() {
                handler(payload);
            }
        });

        self.topics
            .borrow_mut()
            .entry(topic.name)
            .or_default()
            .push((id, erased));

        Subscription {
            bus: self.self_handle.clone(),
            topic: topic.name,
            id: Some(id),
        }
    }

    /// Publish `payload` on `topic`.
    ///
    /// Invokes all current subscribers synchronously, in subscription
    /// order, before returning. No subscribers means no work.
    pub fn publish<T: 'static>(&self, topic: Topic<T>, payload: &T) {
        let snapshot: Vec<ErasedHandler> = match self.topics.borrow().get(topic.name) {
            Some(handlers) => handlers.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => return,
        };
        for handler in snapshot {
            handler(payload);
        }
    }

    /// Number of live subscriptions on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic_name: &str) -> usize {
        self.topics
            .borrow()
            .get(topic_name)
            .map_or(0, std::vec::Vec::len)
    }

    fn unsubscribe(&self, topic_name: &'static str, id: u64) {
        let mut topics = self.topics.borrow_mut();
        if let Some(handlers) = topics.get_mut(topic_name) {
            handlers.retain(|(handler_id, _)| *handler_id != id);
        }
    }
}

/// A live subscription; unsubscribes on drop.
///
/// A subscription cancelled while a publish is in flight still receives
/// that publish - the subscriber list was snapshotted when delivery
/// started.
pub struct Subscription {
    bus: Weak<EventBus>,
    topic: &'static str,
    id: Option<u64>,
}

impl Subscription {
    /// Unsubscribe now instead of at drop time.
    pub fn cancel(mut self) {
        self.cancel_inner();
    }

    fn cancel_inner(&mut self) {
        if let (Some(id), Some(bus)) = (self.id.take(), self.bus.upgrade()) {
            bus.unsubscribe(self.topic, id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_inner();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PING: Topic<u32> = Topic::new("test.ping");

    #[test]
    fn test_delivers_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let _first = bus.subscribe(PING, move |n| s.borrow_mut().push(("first", *n)));
        let s = Rc::clone(&seen);
        let _second = bus.subscribe(PING, move |n| s.borrow_mut().push(("second", *n)));

        bus.publish(PING, &7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(PING, &1);
        assert_eq!(bus.subscriber_count(PING.name()), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&count);
        let subscription = bus.subscribe(PING, move |_| c.set(c.get() + 1));
        bus.publish(PING, &1);
        drop(subscription);
        bus.publish(PING, &2);

        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(PING.name()), 0);
    }

    #[test]
    fn test_subscriber_added_during_publish_misses_that_publish() {
        let bus = EventBus::new();
        let late_calls = Rc::new(Cell::new(0u32));
        let late_subscription = Rc::new(RefCell::new(None));

        let bus_inner = Rc::clone(&bus);
        let late = Rc::clone(&late_calls);
        let slot = Rc::clone(&late_subscription);
        let _outer = bus.subscribe(PING, move |_| {
            let late = Rc::clone(&late);
            let subscription = bus_inner.subscribe(PING, move |_| late.set(late.get() + 1));
            *slot.borrow_mut() = Some(subscription);
        });

        bus.publish(PING, &1);
        assert_eq!(late_calls.get(), 0);

        bus.publish(PING, &2);
        // The first publish registered one late subscriber; the second
        // registers another and delivers to the first.
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_payload_types_are_isolated_per_topic() {
        const WORDS: Topic<String> = Topic::new("test.words");
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(String::new()));

        let s = Rc::clone(&seen);
        let _subscription = bus.subscribe(WORDS, move |word: &String| {
            s.borrow_mut().push_str(word);
        });

        bus.publish(WORDS, &"peony".to_owned());
        assert_eq!(*seen.borrow(), "peony");
    }
}
