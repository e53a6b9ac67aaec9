//! Aggregated connection status
//!
//! The `StatusHub` is the single place where the two sockets' status changes
//! meet. Both sockets may report from different threads at the same time, so
//! every read-modify-write of the aggregate happens under one mutex:
//!
//! - `connected` is recomputed from both sockets' latest statuses on every
//!   notification; it is never assigned from outside.
//! - `broken` is a latch. A notification can only set it; only the start of
//!   a new connect attempt clears it.
//!
//! Each connect attempt bumps a generation counter. Sockets from earlier
//! attempts still hold observers tagged with the old generation and their
//! notifications are dropped.
//!
//! Watch channels are updated after the mutex is released. The update reads
//! the aggregate under the channel's own lock, so the hub mutex is only ever
//! taken inside a channel lock and never the other way around.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use srt_core::traits::{StatusObserver, StatusSink};
use srt_core::{SocketRole, SocketStatus};

/// Per-role view of a socket as seen by the hub
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    /// The connection currently owns a socket for this role
    installed: bool,
    /// Latest status reported by that socket
    status: SocketStatus,
}

#[derive(Debug, Default)]
struct HubState {
    generation: u64,
    outgoing: Slot,
    incoming: Slot,
    connected: bool,
    broken: bool,
}

impl HubState {
    fn slot_mut(&mut self, role: SocketRole) -> &mut Slot {
        match role {
            SocketRole::Outgoing => &mut self.outgoing,
            SocketRole::Incoming => &mut self.incoming,
        }
    }

    fn both_installed(&self) -> bool {
        self.outgoing.installed && self.incoming.installed
    }

    fn derive_connected(&self) -> bool {
        self.both_installed()
            && self.outgoing.status.is_connected()
            && self.incoming.status.is_connected()
    }
}

/// Fuses the status of the outgoing and incoming socket into one
/// `connected` flag and one sticky `broken` flag
pub struct StatusHub {
    state: Mutex<HubState>,
    connected_tx: watch::Sender<bool>,
    broken_tx: watch::Sender<bool>,
}

impl StatusHub {
    /// Create a hub with no sockets, not connected and not broken
    pub fn new() -> Arc<Self> {
        let (connected_tx, _) = watch::channel(false);
        let (broken_tx, _) = watch::channel(false);
        Arc::new(Self {
            state: Mutex::new(HubState::default()),
            connected_tx,
            broken_tx,
        })
    }

    /// Start a new connect attempt
    ///
    /// Forgets both sockets, clears the broken latch and returns the new
    /// generation. `connected` drops to false because no sockets are owned.
    pub fn begin_attempt(&self) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.outgoing = Slot::default();
        state.incoming = Slot::default();
        state.broken = false;
        state.connected = state.derive_connected();
        let generation = state.generation;
        drop(state);
        self.publish();
        generation
    }

    /// Build the observer handed to a socket created during `generation`
    pub fn observer(self: &Arc<Self>, role: SocketRole, generation: u64) -> StatusObserver {
        let sink: Arc<dyn StatusSink> = Arc::clone(self) as Arc<dyn StatusSink>;
        StatusObserver::new(Arc::downgrade(&sink), role, generation)
    }

    /// Record that the connection now owns a socket for `role`
    pub fn install(&self, generation: u64, role: SocketRole) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        state.slot_mut(role).installed = true;
    }

    /// Record that the connection gave up its socket for `role`
    pub fn uninstall(&self, generation: u64, role: SocketRole) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        *state.slot_mut(role) = Slot::default();
        state.connected = state.derive_connected();
        drop(state);
        self.publish();
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Both owned sockets report connected
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// An owned socket reported broken during the current attempt
    pub fn is_broken(&self) -> bool {
        self.state.lock().broken
    }

    /// Watch the `connected` flag; a new value is published only on change
    ///
    /// Holding a borrow of the receiver while calling back into the hub is
    /// allowed, but it delays socket notifications until it is released.
    pub fn subscribe_connected(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }

    /// Watch the `broken` flag; a new value is published only on change
    ///
    /// Same borrowing rules as [`StatusHub::subscribe_connected`].
    pub fn subscribe_broken(&self) -> watch::Receiver<bool> {
        self.broken_tx.subscribe()
    }

    /// Must be called without holding `state`
    fn publish(&self) {
        self.connected_tx.send_if_modified(|current| {
            let connected = self.state.lock().connected;
            if *current == connected {
                return false;
            }
            *current = connected;
            true
        });

        self.broken_tx.send_if_modified(|current| {
            let broken = self.state.lock().broken;
            if *current == broken {
                return false;
            }
            *current = broken;
            true
        });
    }
}

impl StatusSink for StatusHub {
    fn status_changed(&self, role: SocketRole, generation: u64, status: SocketStatus) {
        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::trace!(
                "Dropping {} socket status {} from attempt {} (current {})",
                role,
                status,
                generation,
                state.generation
            );
            return;
        }

        tracing::debug!("{} socket status: {}", role, status);
        state.slot_mut(role).status = status;

        if !state.both_installed() {
            return;
        }

        state.connected = state.derive_connected();

        if !state.broken && (state.outgoing.status.is_broken() || state.incoming.status.is_broken())
        {
            tracing::warn!(
                "Connection broken (outgoing: {}, incoming: {})",
                state.outgoing.status,
                state.incoming.status
            );
            state.broken = true;
        }

        drop(state);
        self.publish();
    }
}
