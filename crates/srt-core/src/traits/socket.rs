//! Socket collaborator traits

use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddrV4;
use std::sync::Weak;

use crate::error::ConnectionError;
use crate::options::SocketOptions;
use crate::types::{SocketRole, SocketStatus};

/// One SRT socket, either the outgoing or the incoming half of a connection
///
/// Implementations report every status change through the
/// [`StatusObserver`] they were created with. They must not hold an internal
/// lock while calling [`StatusObserver::notify`].
#[async_trait]
pub trait SrtSocket: Send + Sync {
    /// Which half of the connection this socket implements
    fn role(&self) -> SocketRole;

    /// Current status
    fn status(&self) -> SocketStatus;

    /// Connect to `addr`, applying `options`; resolves once the handshake
    /// completes or fails
    async fn connect(
        &self,
        addr: SocketAddrV4,
        options: &SocketOptions,
    ) -> Result<(), ConnectionError>;

    /// Close the socket. Idempotent, never fails.
    async fn close(&self);
}

/// Creates sockets bound to a status observer
pub trait SocketFactory: Send + Sync {
    /// The socket type produced by this factory
    type Socket: SrtSocket;

    /// Create a socket for `role`; `observer` becomes its only status observer
    fn create(&self, role: SocketRole, observer: StatusObserver) -> Self::Socket;
}

/// Receiver side of status notifications
pub trait StatusSink: Send + Sync {
    /// Called whenever a socket created for attempt `generation` changes status
    fn status_changed(&self, role: SocketRole, generation: u64, status: SocketStatus);
}

/// Handle a socket uses to report its status changes
///
/// Holds only a weak reference to the sink, so a socket that outlives its
/// connection reports into nothing.
#[derive(Clone)]
pub struct StatusObserver {
    sink: Weak<dyn StatusSink>,
    role: SocketRole,
    generation: u64,
}

impl StatusObserver {
    /// Create an observer for a socket of `role` created during `generation`
    pub fn new(sink: Weak<dyn StatusSink>, role: SocketRole, generation: u64) -> Self {
        Self {
            sink,
            role,
            generation,
        }
    }

    /// Report a new status; may be called from any thread
    pub fn notify(&self, status: SocketStatus) {
        if let Some(sink) = self.sink.upgrade() {
            sink.status_changed(self.role, self.generation, status);
        }
    }
}

impl fmt::Debug for StatusObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusObserver")
            .field("role", &self.role)
            .field("generation", &self.generation)
            .field("attached", &(self.sink.strong_count() > 0))
            .finish()
    }
}
