//! The connection orchestrator
//!
//! `SrtConnection` brings up an outgoing and an incoming socket against one
//! resolved address and exposes a single `connected`/`broken` view of them.
//!
//! `close` quiesces the transport but does not reset observable state:
//! `is_connected`, `is_broken`, socket ownership and attached streams are
//! left as they were until socket notifications or the next `connect`
//! change them. Callers that need a clean slate must call `connect` again.

use std::sync::Arc;

use tokio::sync::watch;

use srt_core::config::ConnectionConfig;
use srt_core::traits::{SocketFactory, SrtSocket, SrtStream};
use srt_core::{SocketRole, SocketStatus, SrtError};

use crate::address::{resolve_ipv4, SrtAddress};
use crate::sockets::{PairState, SocketPair};
use crate::status::StatusHub;

/// One logical SRT connection backed by an outgoing and an incoming socket
pub struct SrtConnection<F: SocketFactory> {
    /// Creates the sockets for each attempt
    factory: F,
    /// Configuration
    config: ConnectionConfig,
    /// Address of the latest connect attempt that passed validation
    target: Option<SrtAddress>,
    /// Sockets owned by the current attempt
    sockets: SocketPair<F::Socket>,
    /// Streams closed together with the connection, in attach order
    streams: Vec<Arc<dyn SrtStream>>,
    /// Aggregated status, shared with the sockets' observers
    hub: Arc<StatusHub>,
}

impl<F: SocketFactory> SrtConnection<F> {
    /// Create an empty connection with default configuration
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, ConnectionConfig::default())
    }

    /// Create an empty connection
    pub fn with_config(factory: F, config: ConnectionConfig) -> Self {
        Self {
            factory,
            config,
            target: None,
            sockets: SocketPair::NoSockets,
            streams: Vec::new(),
            hub: StatusHub::new(),
        }
    }

    /// Connect both sockets to `address` (`srt://host:port[?options]`)
    ///
    /// Fails with `InvalidArgument` before touching any state when the
    /// address is not a complete `srt://` address. Otherwise the broken latch
    /// is cleared, sockets from a previous attempt are dropped without being
    /// closed, and the outgoing socket is connected before the incoming one.
    ///
    /// If the incoming socket fails after the outgoing one connected, the
    /// error is returned and the connection keeps the live outgoing socket
    /// (`PairState::OutgoingOnly`). Blocks for as long as DNS and the socket
    /// handshakes take; wrap the call in a timeout if that matters.
    pub async fn connect(&mut self, address: &str) -> Result<(), SrtError> {
        let address = SrtAddress::parse(address)?;
        tracing::info!("Connecting to {}", address);

        let options = address.options().merged_over(&self.config.default_options);
        let addr = resolve_ipv4(address.host(), address.port()).await;
        self.target = Some(address);

        let generation = self.hub.begin_attempt();
        self.sockets = SocketPair::NoSockets;

        tracing::debug!("Connecting outgoing socket to {}", addr);
        let outgoing = Arc::new(self.create_socket(SocketRole::Outgoing, generation));
        self.sockets = SocketPair::OutgoingOnly {
            outgoing: Arc::clone(&outgoing),
        };
        outgoing.connect(addr, &options).await.map_err(|e| {
            tracing::warn!("Outgoing socket failed to connect to {}: {}", addr, e);
            e
        })?;

        tracing::debug!("Connecting incoming socket to {}", addr);
        let incoming = Arc::new(self.create_socket(SocketRole::Incoming, generation));
        self.sockets = std::mem::take(&mut self.sockets).with_incoming(Arc::clone(&incoming));

        match incoming.connect(addr, &options).await {
            Ok(()) => {
                self.sockets = std::mem::take(&mut self.sockets).into_connected();
                tracing::info!("Connected to {}", addr);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Incoming socket failed to connect to {}: {}. Keeping outgoing socket",
                    addr,
                    e
                );
                self.hub.uninstall(generation, SocketRole::Incoming);
                self.sockets = std::mem::take(&mut self.sockets).without_incoming();
                Err(e.into())
            }
        }
    }

    /// Close attached streams in attach order, then the outgoing socket,
    /// then the incoming socket
    pub async fn close(&self) {
        tracing::debug!("Closing connection ({} attached streams)", self.streams.len());
        for stream in &self.streams {
            stream.close().await;
        }
        self.close_sockets().await;
    }

    /// Attach a stream to be closed with this connection
    pub fn attach_stream(&mut self, stream: Arc<dyn SrtStream>) {
        self.streams.push(stream);
    }

    /// Both sockets report connected
    pub fn is_connected(&self) -> bool {
        self.hub.is_connected()
    }

    /// A socket reported broken since the last `connect`
    pub fn is_broken(&self) -> bool {
        self.hub.is_broken()
    }

    /// Watch `is_connected`; receivers are notified only when it changes
    pub fn subscribe_connected(&self) -> watch::Receiver<bool> {
        self.hub.subscribe_connected()
    }

    /// Watch `is_broken`; receivers are notified only when it changes
    pub fn subscribe_broken(&self) -> watch::Receiver<bool> {
        self.hub.subscribe_broken()
    }

    /// Address of the latest connect attempt
    pub fn target(&self) -> Option<&SrtAddress> {
        self.target.as_ref()
    }

    /// Which sockets are currently owned
    pub fn pair_state(&self) -> PairState {
        self.sockets.state()
    }

    /// Live status of the outgoing socket, if owned
    pub fn outgoing_status(&self) -> Option<SocketStatus> {
        self.sockets.outgoing().map(|s| s.status())
    }

    /// Live status of the incoming socket, if owned
    pub fn incoming_status(&self) -> Option<SocketStatus> {
        self.sockets.incoming().map(|s| s.status())
    }

    /// Number of attached streams
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub(crate) async fn close_sockets(&self) {
        if let Some(outgoing) = self.sockets.outgoing() {
            outgoing.close().await;
        }
        if let Some(incoming) = self.sockets.incoming() {
            incoming.close().await;
        }
    }

    fn create_socket(&self, role: SocketRole, generation: u64) -> F::Socket {
        let socket = self.factory.create(role, self.hub.observer(role, generation));
        self.hub.install(generation, role);
        socket
    }
}

/// Dropping a connection detaches its streams: the handles are dropped
/// with the `streams` field and `SrtStream::close` is never called.
impl<F: SocketFactory> Drop for SrtConnection<F> {
    fn drop(&mut self) {
        if !self.streams.is_empty() {
            tracing::debug!("Detaching {} streams without closing them", self.streams.len());
        }
    }
}
