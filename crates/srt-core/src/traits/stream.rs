//! Attached stream trait

use async_trait::async_trait;

/// A data stream riding on a connection
///
/// The connection only ever closes an attached stream; it never manages the
/// stream's internal state.
#[async_trait]
pub trait SrtStream: Send + Sync {
    /// Close the stream. Idempotent, never fails.
    async fn close(&self);
}
