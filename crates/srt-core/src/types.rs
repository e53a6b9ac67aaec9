//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of the logical connection a socket implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketRole {
    /// The send socket
    Outgoing,
    /// The receive socket, kept as a liveness probe
    Incoming,
}

impl fmt::Display for SocketRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketRole::Outgoing => write!(f, "outgoing"),
            SocketRole::Incoming => write!(f, "incoming"),
        }
    }
}

/// Status of a single SRT socket
///
/// Mirrors libsrt's `SRT_SOCKSTATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketStatus {
    /// Created, nothing done yet
    Init,
    /// Bound or configured
    Opened,
    /// Waiting for callers
    Listening,
    /// Handshake in progress
    Connecting,
    /// Handshake complete, ready for I/O
    Connected,
    /// A connected socket lost its peer
    Broken,
    /// Shutdown in progress
    Closing,
    /// Shut down
    Closed,
    /// The socket no longer exists in the library
    NonExist,
}

impl SocketStatus {
    /// Convert libsrt's raw status code (`SRTS_INIT` = 1 .. `SRTS_NONEXIST` = 9)
    pub fn from_raw(raw: i32) -> Option<Self> {
        let status = match raw {
            1 => SocketStatus::Init,
            2 => SocketStatus::Opened,
            3 => SocketStatus::Listening,
            4 => SocketStatus::Connecting,
            5 => SocketStatus::Connected,
            6 => SocketStatus::Broken,
            7 => SocketStatus::Closing,
            8 => SocketStatus::Closed,
            9 => SocketStatus::NonExist,
            _ => return None,
        };
        Some(status)
    }

    /// Whether the socket is ready for I/O
    pub fn is_connected(&self) -> bool {
        matches!(self, SocketStatus::Connected)
    }

    /// Whether the socket lost an established connection
    pub fn is_broken(&self) -> bool {
        matches!(self, SocketStatus::Broken)
    }
}

impl Default for SocketStatus {
    fn default() -> Self {
        SocketStatus::Init
    }
}

impl fmt::Display for SocketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocketStatus::Init => "init",
            SocketStatus::Opened => "opened",
            SocketStatus::Listening => "listening",
            SocketStatus::Connecting => "connecting",
            SocketStatus::Connected => "connected",
            SocketStatus::Broken => "broken",
            SocketStatus::Closing => "closing",
            SocketStatus::Closed => "closed",
            SocketStatus::NonExist => "nonexist",
        };
        write!(f, "{}", name)
    }
}
