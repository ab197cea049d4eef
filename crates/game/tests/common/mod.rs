#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use cubed::{ConnectionStatus, Packet, ReceiveCallback, Transport};
use parking_lot::Mutex;

#[derive(Default)]
pub struct ScriptState {
    pub status: ConnectionStatus,
    pub callback: Option<ReceiveCallback>,
    pub sent: Vec<Bytes>,
    pub connects: Vec<String>,
    pub disconnects: usize,
}

/// In-memory transport whose link state is driven by the test.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    pub fn set_status(&self, status: ConnectionStatus) {
        self.state.lock().status = status;
    }

    /// Feeds raw bytes to the registered callback, as the network thread would.
    pub fn deliver(&self, data: &[u8]) {
        let callback = self.state.lock().callback.clone();
        if let Some(callback) = callback {
            callback(data);
        }
    }

    pub fn deliver_packet(&self, packet: &Packet) {
        self.deliver(&packet.encode());
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().sent.clone()
    }

    pub fn connects(&self) -> Vec<String> {
        self.state.lock().connects.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.state.lock().disconnects
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self, address: &str) {
        let mut state = self.state.lock();
        state.connects.push(address.to_string());
        state.status = ConnectionStatus::Connecting;
    }

    fn disconnect(&mut self) {
        let mut state = self.state.lock();
        state.disconnects += 1;
        state.status = ConnectionStatus::Disconnected;
    }

    fn send(&self, data: Bytes) {
        self.state.lock().sent.push(data);
    }

    fn status(&self) -> ConnectionStatus {
        self.state.lock().status
    }

    fn set_receive_callback(&mut self, callback: ReceiveCallback) {
        self.state.lock().callback = Some(callback);
    }
}
