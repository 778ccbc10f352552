use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub mod signal;
pub mod telemetry;

pub use signal::{Signal, Subscription};

/// Application events a tour step can wait for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    // Process design
    OperatorAdded {
        operator: String,
        operator_type: String,
    },
    OperatorConfigurationChanged {
        operator: String,
        parameter: String,
        value: String,
    },
    PortsConnected {
        from: String,
        to: String,
    },
    SubprocessEntered {
        operator: String,
    },

    // Process lifecycle
    ProcessOpened {
        location: String,
    },
    ProcessSaved {
        location: String,
    },
    ProcessStarted,
    ProcessFinished {
        success: bool,
    },
    BreakpointReached {
        operator: String,
    },
    BreakpointResumed,

    // Repository
    RepositoryEntryStored {
        location: String,
    },

    // Workbench layout
    PerspectiveChanged {
        perspective: String,
    },
    DockableShown {
        key: String,
    },
    DockableHidden {
        key: String,
    },
}

/// Payload-free discriminant of [`AppEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    OperatorAdded,
    OperatorConfigurationChanged,
    PortsConnected,
    SubprocessEntered,
    ProcessOpened,
    ProcessSaved,
    ProcessStarted,
    ProcessFinished,
    BreakpointReached,
    BreakpointResumed,
    RepositoryEntryStored,
    PerspectiveChanged,
    DockableShown,
    DockableHidden,
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::OperatorAdded { .. } => EventKind::OperatorAdded,
            AppEvent::OperatorConfigurationChanged { .. } => EventKind::OperatorConfigurationChanged,
            AppEvent::PortsConnected { .. } => EventKind::PortsConnected,
            AppEvent::SubprocessEntered { .. } => EventKind::SubprocessEntered,
            AppEvent::ProcessOpened { .. } => EventKind::ProcessOpened,
            AppEvent::ProcessSaved { .. } => EventKind::ProcessSaved,
            AppEvent::ProcessStarted => EventKind::ProcessStarted,
            AppEvent::ProcessFinished { .. } => EventKind::ProcessFinished,
            AppEvent::BreakpointReached { .. } => EventKind::BreakpointReached,
            AppEvent::BreakpointResumed => EventKind::BreakpointResumed,
            AppEvent::RepositoryEntryStored { .. } => EventKind::RepositoryEntryStored,
            AppEvent::PerspectiveChanged { .. } => EventKind::PerspectiveChanged,
            AppEvent::DockableShown { .. } => EventKind::DockableShown,
            AppEvent::DockableHidden { .. } => EventKind::DockableHidden,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

struct Listener {
    id: u64,
    kind: EventKind,
    callback: Rc<dyn Fn(&AppEvent)>,
}

struct BusInner {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<u64>,
}

impl BusInner {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|listener| listener.id == id)
    }
}

/// Publish/subscribe channel for [`AppEvent`]s, owned by the UI thread.
///
/// Publishing only queues the event. Delivery happens when the event loop calls
/// [`EventBus::dispatch_pending`], which keeps handlers from running inside
/// whatever code published the event.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.inner.rx.len())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            inner: Rc::new(BusInner {
                tx,
                rx,
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// A sender usable from worker threads; events still get delivered on the
    /// thread that calls [`EventBus::dispatch_pending`].
    pub fn sender(&self) -> Sender<AppEvent> {
        self.inner.tx.clone()
    }

    pub fn publish(&self, event: AppEvent) {
        let _ = self.inner.tx.send(event);
    }

    /// Number of queued, not yet delivered events.
    pub fn pending(&self) -> usize {
        self.inner.rx.len()
    }

    /// Register `callback` for every event of `kind`.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl Fn(&AppEvent) + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            kind,
            callback: Rc::new(callback),
        });

        let inner: Weak<BusInner> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .listeners
                    .borrow_mut()
                    .retain(|listener| listener.id != id);
            }
        })
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver the events that were queued when this call started.
    ///
    /// Events published by handlers stay queued for the next call. Returns the
    /// number of events delivered.
    pub fn dispatch_pending(&self) -> usize {
        let queued = self.inner.rx.len();
        let mut delivered = 0;
        for _ in 0..queued {
            let Ok(event) = self.inner.rx.try_recv() else {
                break;
            };
            self.dispatch(&event);
            delivered += 1;
        }
        delivered
    }

    fn dispatch(&self, event: &AppEvent) {
        let kind = event.kind();
        let targets: Vec<(u64, Rc<dyn Fn(&AppEvent)>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.kind == kind)
            .map(|listener| (listener.id, listener.callback.clone()))
            .collect();

        tracing::trace!(kind = %kind, listeners = targets.len(), "dispatching app event");
        for (id, callback) in targets {
            if self.inner.is_registered(id) {
                callback(event);
            }
        }
    }
}
