use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of events kept for inspection.
pub const DEFAULT_EVENT_LOG_LEN: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Shared handler type. Handlers are bound once and looked up by id; the bus
/// never rebinds a handler on dispatch.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Typed publish/subscribe bus with a bounded event log.
///
/// Ordering contract:
/// - Handlers run in subscription order.
/// - The log keeps the most recent `max_log_len` events in emission order.
pub struct EventBus<E> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Handler<E>)>,
    log: VecDeque<E>,
    max_log_len: usize,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::with_log_len(DEFAULT_EVENT_LOG_LEN)
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("logged", &self.log.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_len(max_log_len: usize) -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
            log: VecDeque::new(),
            max_log_len,
        }
    }

    pub fn subscribe(&mut self, handler: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, Arc::new(handler)));
        id
    }

    /// Returns `true` if a subscription was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot of the current handlers, in subscription order.
    ///
    /// Lets a caller that keeps the bus behind a lock release it before
    /// dispatching, so handlers may call back into their owner.
    pub fn handlers(&self) -> Vec<Handler<E>> {
        self.subscribers.iter().map(|(_, h)| h.clone()).collect()
    }

    pub fn events(&self) -> impl Iterator<Item = &E> {
        self.log.iter()
    }

    pub fn drain(&mut self) -> Vec<E> {
        self.log.drain(..).collect()
    }
}

impl<E: Clone> EventBus<E> {
    /// Appends `event` to the log without dispatching.
    pub fn record(&mut self, event: E) {
        if self.max_log_len == 0 {
            return;
        }
        while self.log.len() >= self.max_log_len {
            self.log.pop_front();
        }
        self.log.push_back(event);
    }

    pub fn emit(&mut self, event: E) {
        self.record(event.clone());
        for (_, handler) in &self.subscribers {
            handler(&event);
        }
    }
}
