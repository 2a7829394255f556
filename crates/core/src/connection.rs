use crate::{message::DominoMessage, ConnectionConfig};
use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, warn};
use std::{
    collections::hash_map::Entry,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc, Arc, Mutex, MutexGuard, PoisonError,
    },
};
use thiserror::Error;
use validator::Validate;

/// A callback registered for an event. Events carry no data, the id is the
/// whole message.
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("no live event with id {0}")]
    UnknownEvent(u64),
    #[error("an event with id {0} is already registered")]
    DuplicateId(u64),
    #[error("event {0} was destroyed, its id can't be used again")]
    RetiredId(u64),
    #[error("id 0 is reserved to mean \"no id\"")]
    ReservedId,
    #[error("connection is gone")]
    Disconnected,
}

/// Ownership of a registered event. Giving it back to
/// [Connection::destroy_event] unregisters the handler; after that, the id is
/// dead for good.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EventHandle {
    id: u64,
}

impl EventHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Reports triggered event ids back to a [Connection], without needing a
/// reference to it. Cheap to clone; hand one to whatever thread listens for
/// clicks.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<u64>,
}

impl EventSender {
    /// Queue an event id to be run by [Connection::process_triggered]
    pub fn trigger(&self, id: u64) -> Result<(), ConnectionError> {
        self.sender
            .send(id)
            .map_err(|_| ConnectionError::Disconnected)
    }
}

/// The game side's end of the protocol. Allocates ids, buffers outgoing
/// messages until the transport drains them, and holds the handlers for
/// events that the engine side can trigger.
///
/// Everything takes `&self`, so a connection can be shared between threads
/// (e.g. in an `Arc`): producers enqueue while one consumer drains.
pub struct Connection {
    config: ConnectionConfig,
    next_id: AtomicU64,
    queue: Mutex<Vec<DominoMessage>>,
    events: Mutex<EventRegistry>,
    trigger_sender: Mutex<mpsc::Sender<u64>>,
    trigger_receiver: Mutex<mpsc::Receiver<u64>>,
}

/// Live handlers, plus every id that has been destroyed. Retired ids are kept
/// forever (8 bytes each) so that neither [Connection::make_event] nor
/// [Connection::register_event] can bring one back.
#[derive(Default)]
struct EventRegistry {
    live: FnvHashMap<u64, EventHandler>,
    retired: FnvHashSet<u64>,
}

impl EventRegistry {
    fn is_taken(&self, id: u64) -> bool {
        self.live.contains_key(&id) || self.retired.contains(&id)
    }
}

/// Every critical section here is a single push/insert/remove/take, so a
/// poisoned lock never guards half-written data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Connection {
    /// Initialize a new connection with the given options. Returns an error
    /// if the config is invalid.
    pub fn new(config: ConnectionConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            config,
            // 0 is reserved as "no id"
            next_id: AtomicU64::new(1),
            queue: Mutex::new(Vec::new()),
            events: Mutex::new(EventRegistry::default()),
            trigger_sender: Mutex::new(sender),
            trigger_receiver: Mutex::new(receiver),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Allocate a fresh id. Ids start at 1, increase by one each call, and
    /// are never reused.
    ///
    /// # Panics
    ///
    /// Panics once `u64::MAX - 1` ids have been handed out, rather than
    /// wrapping around to the reserved 0.
    pub fn next_id(&self) -> u64 {
        match self.next_id.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |id| id.checked_add(1),
        ) {
            Ok(id) => id,
            Err(_) => panic!("connection ran out of ids"),
        }
    }

    /// Add a message to the end of the outgoing queue
    pub fn enqueue(&self, message: DominoMessage) {
        debug!("Enqueueing {} message", message.kind());
        let mut queue = lock(&self.queue);
        queue.push(message);
        if queue.len() > self.config.warn_queue_len {
            warn!(
                "{} messages are waiting to be sent, is anything taking them?",
                queue.len()
            );
        }
    }

    /// Take every pending message, in the order they were enqueued, leaving
    /// the queue empty
    pub fn take_messages(&self) -> Vec<DominoMessage> {
        std::mem::take(&mut *lock(&self.queue))
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Register a handler under a freshly allocated id. Ids that were
    /// already claimed through [Connection::register_event] are skipped.
    pub fn make_event(
        &self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> EventHandle {
        let mut events = lock(&self.events);
        let id = loop {
            let id = self.next_id();
            if !events.is_taken(id) {
                break id;
            }
            debug!("Skipping id {}, already used by an event", id);
        };
        events.live.insert(id, Arc::new(handler));
        EventHandle { id }
    }

    /// Register a handler under an id that was allocated elsewhere
    pub fn register_event(
        &self,
        id: u64,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> Result<EventHandle, ConnectionError> {
        if id == 0 {
            return Err(ConnectionError::ReservedId);
        }
        let mut events = lock(&self.events);
        if events.retired.contains(&id) {
            return Err(ConnectionError::RetiredId(id));
        }
        match events.live.entry(id) {
            Entry::Occupied(_) => Err(ConnectionError::DuplicateId(id)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(handler));
                Ok(EventHandle { id })
            }
        }
    }

    /// Run the handler for an event. The registry isn't locked while the
    /// handler runs, so handlers are free to enqueue messages or register
    /// and destroy events.
    pub fn trigger_event(&self, id: u64) -> Result<(), ConnectionError> {
        let handler = lock(&self.events)
            .live
            .get(&id)
            .cloned()
            .ok_or(ConnectionError::UnknownEvent(id))?;
        debug!("Triggering event {}", id);
        handler();
        Ok(())
    }

    /// Unregister an event, returning its (now dead) id
    pub fn destroy_event(&self, handle: EventHandle) -> u64 {
        let mut events = lock(&self.events);
        events.live.remove(&handle.id);
        events.retired.insert(handle.id);
        handle.id
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).live.len()
    }

    /// Get a sender that the engine side can use to report triggered events
    pub fn event_channel(&self) -> EventSender {
        EventSender {
            sender: lock(&self.trigger_sender).clone(),
        }
    }

    /// Run the handler for every event id reported through
    /// [Connection::event_channel] since the last call, in the order they
    /// were reported. A bad id doesn't stop the rest from running.
    pub fn process_triggered(
        &self,
    ) -> Vec<(u64, Result<(), ConnectionError>)> {
        // Collect first so the receiver isn't locked while handlers run
        let ids: Vec<u64> = lock(&self.trigger_receiver).try_iter().collect();
        ids.into_iter()
            .map(|id| {
                let result = self.trigger_event(id);
                if let Err(err) = &result {
                    warn!("Couldn't run triggered event: {}", err);
                }
                (id, result)
            })
            .collect()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("next_id", &self.next_id)
            .field("pending", &self.pending_len())
            .field("events", &self.event_count())
            .finish()
    }
}
