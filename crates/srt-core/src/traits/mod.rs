//! Collaborator trait definitions

mod socket;
mod stream;

pub use socket::{SocketFactory, SrtSocket, StatusObserver, StatusSink};
pub use stream::SrtStream;
