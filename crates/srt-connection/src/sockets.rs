//! Ownership of the outgoing/incoming socket pair
//!
//! Connect brings the sockets up strictly in order, outgoing first. Each
//! step is a variant here, so an attempt that stopped halfway (failed or
//! cancelled) leaves a state that can be inspected rather than two
//! unrelated optional handles.

use std::fmt;
use std::sync::Arc;

/// The sockets a connection currently owns
pub enum SocketPair<S> {
    /// Nothing owned yet, or a new attempt just started
    NoSockets,
    /// Only the outgoing socket; it may have failed to connect, or the
    /// incoming socket failed after it
    OutgoingOnly { outgoing: Arc<S> },
    /// Outgoing connected, incoming handshake in progress
    BothConnecting { outgoing: Arc<S>, incoming: Arc<S> },
    /// Both sockets completed their handshake
    BothConnected { outgoing: Arc<S>, incoming: Arc<S> },
}

/// Discriminant of [`SocketPair`], without the sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    NoSockets,
    OutgoingOnly,
    BothConnecting,
    BothConnected,
}

impl<S> SocketPair<S> {
    /// Which ownership state this is
    pub fn state(&self) -> PairState {
        match self {
            SocketPair::NoSockets => PairState::NoSockets,
            SocketPair::OutgoingOnly { .. } => PairState::OutgoingOnly,
            SocketPair::BothConnecting { .. } => PairState::BothConnecting,
            SocketPair::BothConnected { .. } => PairState::BothConnected,
        }
    }

    /// The outgoing socket, if owned
    pub fn outgoing(&self) -> Option<&Arc<S>> {
        match self {
            SocketPair::NoSockets => None,
            SocketPair::OutgoingOnly { outgoing }
            | SocketPair::BothConnecting { outgoing, .. }
            | SocketPair::BothConnected { outgoing, .. } => Some(outgoing),
        }
    }

    /// The incoming socket, if owned
    pub fn incoming(&self) -> Option<&Arc<S>> {
        match self {
            SocketPair::NoSockets | SocketPair::OutgoingOnly { .. } => None,
            SocketPair::BothConnecting { incoming, .. }
            | SocketPair::BothConnected { incoming, .. } => Some(incoming),
        }
    }

    /// Add the incoming socket to an outgoing-only pair
    ///
    /// Any other state is returned unchanged and `incoming` is dropped.
    pub fn with_incoming(self, incoming: Arc<S>) -> Self {
        match self {
            SocketPair::OutgoingOnly { outgoing } => {
                SocketPair::BothConnecting { outgoing, incoming }
            }
            other => other,
        }
    }

    /// Mark a connecting pair as fully connected
    pub fn into_connected(self) -> Self {
        match self {
            SocketPair::BothConnecting { outgoing, incoming } => {
                SocketPair::BothConnected { outgoing, incoming }
            }
            other => other,
        }
    }

    /// Give up the incoming socket, keeping the outgoing one
    pub fn without_incoming(self) -> Self {
        match self {
            SocketPair::BothConnecting { outgoing, .. }
            | SocketPair::BothConnected { outgoing, .. } => SocketPair::OutgoingOnly { outgoing },
            other => other,
        }
    }
}

impl<S> Default for SocketPair<S> {
    fn default() -> Self {
        SocketPair::NoSockets
    }
}

impl<S> fmt::Debug for SocketPair<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SocketPair::{:?}", self.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sock(name: &'static str) -> Arc<&'static str> {
        Arc::new(name)
    }

    #[test]
    fn test_bring_up_sequence() {
        let pair: SocketPair<&str> = SocketPair::default();
        assert_eq!(pair.state(), PairState::NoSockets);
        assert!(pair.outgoing().is_none());

        let pair = SocketPair::OutgoingOnly {
            outgoing: sock("out"),
        };
        assert_eq!(pair.outgoing().map(|s| **s), Some("out"));
        assert!(pair.incoming().is_none());

        let pair = pair.with_incoming(sock("in"));
        assert_eq!(pair.state(), PairState::BothConnecting);
        assert_eq!(pair.incoming().map(|s| **s), Some("in"));

        let pair = pair.into_connected();
        assert_eq!(pair.state(), PairState::BothConnected);
        assert_eq!(format!("{:?}", pair), "SocketPair::BothConnected");
    }

    #[test]
    fn test_incoming_failure_keeps_outgoing() {
        let pair = SocketPair::OutgoingOnly {
            outgoing: sock("out"),
        }
        .with_incoming(sock("in"))
        .without_incoming();

        assert_eq!(pair.state(), PairState::OutgoingOnly);
        assert_eq!(pair.outgoing().map(|s| **s), Some("out"));
        assert!(pair.incoming().is_none());
    }

    #[test]
    fn test_transitions_from_wrong_state_are_noops() {
        let pair: SocketPair<&str> = SocketPair::NoSockets.with_incoming(sock("in"));
        assert_eq!(pair.state(), PairState::NoSockets);

        let pair = SocketPair::OutgoingOnly {
            outgoing: sock("out"),
        }
        .into_connected();
        assert_eq!(pair.state(), PairState::OutgoingOnly);
    }
}
