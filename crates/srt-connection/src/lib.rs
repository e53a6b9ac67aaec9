//! srt-connection: One logical SRT connection over two sockets
//!
//! A connection owns an outgoing (send) socket and an incoming (receive)
//! socket against the same resolved address. The incoming socket carries no
//! required application data; it exists so a server-side disconnect that the
//! outgoing socket alone would miss still shows up. Both sockets report
//! status changes into a single hub that derives one `connected` flag and a
//! sticky `broken` latch.

pub mod address;
pub mod connection;
pub mod reconnect;
pub mod sockets;
pub mod status;

pub use address::{resolve_ipv4, SrtAddress, SRT_SCHEME};
pub use connection::SrtConnection;
pub use reconnect::ExponentialBackoff;
pub use sockets::{PairState, SocketPair};
pub use status::StatusHub;
