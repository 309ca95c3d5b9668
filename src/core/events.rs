use crate::core::document::NodeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: NodeId,
}

impl ClickEvent {
    pub fn on(target: NodeId) -> Self {
        Self { target }
    }
}

pub type Listener = Arc<dyn Fn(&ClickEvent) + Send + Sync>;

/// Token returned by [`EventDispatcher::subscribe`]. Hand it back to unsubscribe.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a subscription leaves no way to remove the listener"]
pub struct Subscription(u64);

/// Document-wide click stream. Listeners run synchronously in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ClickEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);
        self.lock().push((id, listener));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.0);
        listeners.len() != before
    }

    pub fn dispatch(&self, event: &ClickEvent) {
        // snapshot so a listener may subscribe or unsubscribe while running
        let snapshot: Vec<Listener> = self.lock().iter().map(|(_, l)| l.clone()).collect();
        tracing::trace!("Dispatching click on node {}", event.target.index());
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
