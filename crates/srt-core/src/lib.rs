//! srt-core: Core abstractions and configuration for dual-socket SRT connections
//!
//! This crate provides the shared types, the socket and stream collaborator
//! traits, the socket option set and the configuration structures used by
//! the connection orchestrator.

pub mod config;
pub mod error;
pub mod options;
pub mod traits;
pub mod types;

pub use error::{ConfigError, ConnectionError, SrtError};
pub use options::SocketOptions;
pub use types::{SocketRole, SocketStatus};
