//! Typed completion events
//!
//! A minimal observer: handlers subscribe to an [`Event<T>`] and are invoked
//! in subscription order every time the owner triggers it. Used to signal
//! asynchronous completions (backend bring-up, body binding batches) to the
//! host without callbacks into the tick loop.

use std::fmt;

/// Token returned by [`Event::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Box<dyn FnMut(&T)>;

/// A typed multicast event
pub struct Event<T> {
    handlers: Vec<(SubscriptionId, Handler<T>)>,
    next_id: u64,
    fired: u64,
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
            fired: 0,
        }
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.handlers.len())
            .field("fired", &self.fired)
            .finish()
    }
}

impl<T> Event<T> {
    /// Create an event with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler
    pub fn subscribe(&mut self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Invoke every handler with `payload`
    pub fn trigger(&mut self, payload: &T) {
        self.fired += 1;
        for (_, handler) in &mut self.handlers {
            handler(payload);
        }
    }

    /// Number of subscribed handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// How many times the event has been triggered
    pub const fn fired_count(&self) -> u64 {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut event = Event::<u32>::new();

        let first = Rc::clone(&seen);
        event.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = Rc::clone(&seen);
        event.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        event.trigger(&7);

        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
        assert_eq!(event.fired_count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut event = Event::<()>::new();
        let counter = Rc::clone(&count);
        let id = event.subscribe(move |()| *counter.borrow_mut() += 1);

        event.trigger(&());
        assert!(event.unsubscribe(id));
        assert!(!event.unsubscribe(id));
        event.trigger(&());

        assert_eq!(*count.borrow(), 1);
        assert_eq!(event.handler_count(), 0);
    }
}
