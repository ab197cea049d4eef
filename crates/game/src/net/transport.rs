use std::sync::Arc;

use bytes::Bytes;

use super::connection::ConnectionStatus;

/// Invoked once per complete inbound message, on a thread owned by the transport.
pub type ReceiveCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// The connection collaborator a `Session` drives.
///
/// Implementations never report `ConnectionStatus::TimedOut`; that outcome
/// belongs to the session.
pub trait Transport {
    /// Starts an asynchronous connection attempt.
    fn connect(&mut self, address: &str);

    fn disconnect(&mut self);

    /// Queues a complete message. Delivery is whatever the underlying link offers.
    fn send(&self, data: Bytes);

    fn status(&self) -> ConnectionStatus;

    /// Replaces the receive callback. Takes effect for the next `connect`.
    fn set_receive_callback(&mut self, callback: ReceiveCallback);
}
