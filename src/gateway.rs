use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::GatewayError;
use crate::models::{
    Counter, NewHistoryRecord, UserProfile, WorkoutHistoryRecord, WorkoutTemplate,
};

/// Document-store operations the app relies on. Writes are independent of
/// each other; nothing here is transactional across calls.
pub trait PersistenceGateway {
    /// Append a history record, stamped with the store's clock. Returns the new id.
    fn create_history_record(
        &self,
        user_id: &str,
        record: NewHistoryRecord,
    ) -> Result<String, GatewayError>;

    fn increment_counter(
        &self,
        user_id: &str,
        counter: Counter,
        delta: u64,
    ) -> Result<(), GatewayError>;

    /// Live view of a member's templates, newest first by creation time.
    fn subscribe_templates(
        &self,
        user_id: &str,
    ) -> Result<Subscription<Vec<WorkoutTemplate>>, GatewayError>;

    /// Live view of a member's history, newest first by completion time.
    fn subscribe_history(
        &self,
        user_id: &str,
    ) -> Result<Subscription<Vec<WorkoutHistoryRecord>>, GatewayError>;

    fn create_template(&self, template: &WorkoutTemplate) -> Result<(), GatewayError>;

    /// Overwrite the template with the same id in place.
    fn update_template(&self, template: &WorkoutTemplate) -> Result<(), GatewayError>;

    fn delete_template(&self, user_id: &str, template_id: &str) -> Result<(), GatewayError>;

    fn list_templates(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>, GatewayError>;

    fn list_history(&self, user_id: &str) -> Result<Vec<WorkoutHistoryRecord>, GatewayError>;

    /// Fetch the member profile, creating a zeroed one on first login.
    fn load_profile(&self, user_id: &str, display_name: &str)
        -> Result<UserProfile, GatewayError>;
}

struct Subscriber<T> {
    id: u64,
    user_id: String,
    tx: Sender<T>,
}

struct Registry<T> {
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
}

/// Fan-out of snapshots to everyone listening on a member's collection.
pub struct SubscriberRegistry<T> {
    inner: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for SubscriberRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SubscriberRegistry<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }
}

fn lock<T>(m: &Mutex<Registry<T>>) -> MutexGuard<'_, Registry<T>> {
    // a poisoned lock still holds a usable subscriber list
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T: Clone> SubscriberRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and hand it `initial` right away.
    pub fn subscribe(&self, user_id: &str, initial: T) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        // receiver is alive, so this cannot fail
        let _ = tx.send(initial);

        let mut reg = lock(&self.inner);
        let id = reg.next_id;
        reg.next_id += 1;
        reg.subscribers.push(Subscriber {
            id,
            user_id: user_id.to_string(),
            tx,
        });

        Subscription {
            id,
            rx,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Deliver `snapshot` to every listener of `user_id`, pruning dead ones.
    pub fn notify(&self, user_id: &str, snapshot: &T) {
        let mut reg = lock(&self.inner);
        reg.subscribers
            .retain(|s| s.user_id != user_id || s.tx.send(snapshot.clone()).is_ok());
    }

    pub fn has_listeners(&self, user_id: &str) -> bool {
        lock(&self.inner)
            .subscribers
            .iter()
            .any(|s| s.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a live query. Dropping it (or calling `unsubscribe`) stops delivery.
pub struct Subscription<T> {
    id: u64,
    rx: Receiver<T>,
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Latest pending snapshot, skipping any older ones still queued.
    pub fn try_next(&self) -> Option<T> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let id = self.id;
        lock(&self.registry).subscribers.retain(|s| s.id != id);
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
