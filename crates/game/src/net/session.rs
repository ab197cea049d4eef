use std::sync::{Arc, OnceLock};
use std::time::Instant;

use bytes::Bytes;

use crate::peers::PeerTable;

use super::config::SessionConfig;
use super::connection::{ConnectionError, ConnectionStatus};
use super::protocol::{Packet, PeerId};
use super::stats::{NetworkStats, StatCounters};
use super::transport::{ReceiveCallback, Transport};

/// State owned by one connection attempt and shared with its receive callback.
#[derive(Debug, Default)]
struct Inbound {
    local_id: OnceLock<PeerId>,
    peers: PeerTable,
}

impl Inbound {
    fn handle(&self, data: &[u8], stats: &StatCounters) {
        stats.record_received(data.len());

        let packet = match Packet::decode(data) {
            Ok(packet) => packet,
            Err(e) => {
                stats.record_decode_error();
                log::warn!("Dropping malformed packet ({} bytes): {}", data.len(), e);
                return;
            }
        };

        match packet {
            Packet::ConnectAck { assigned_id } => match self.local_id.set(assigned_id) {
                Ok(()) => log::info!("Server assigned peer ID {}", assigned_id),
                Err(_) => {
                    if let Some(current) = self.local_id.get().filter(|id| **id != assigned_id) {
                        log::warn!(
                            "Ignoring ConnectAck with ID {}, already assigned {}",
                            assigned_id,
                            current
                        );
                    }
                }
            },
            Packet::StateUpdate(update) => {
                let report = self.peers.apply_snapshot(&update, Instant::now());
                if report.stale > 0 {
                    stats.record_stale(report.stale);
                }
                log::trace!(
                    "State update: {} inserted, {} updated, {} stale",
                    report.inserted,
                    report.updated,
                    report.stale
                );
            }
        }
    }
}

fn receive_callback(inbound: Arc<Inbound>, stats: Arc<StatCounters>) -> ReceiveCallback {
    Arc::new(move |data: &[u8]| inbound.handle(data, &stats))
}

/// Client side of one authority connection.
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    inbound: Arc<Inbound>,
    stats: Arc<StatCounters>,
    address: Option<String>,
    connect_started: Option<Instant>,
    timed_out: bool,
    was_connected: bool,
    last_error: Option<ConnectionError>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            inbound: Arc::new(Inbound::default()),
            stats: Arc::new(StatCounters::default()),
            address: None,
            connect_started: None,
            timed_out: false,
            was_connected: false,
            last_error: None,
        }
    }

    /// Starts connecting to `address`.
    ///
    /// Returns `false` without touching the transport while an attempt is
    /// in progress or a connection is up.
    pub fn connect_to(&mut self, address: &str) -> bool {
        let status = self.status();
        if !status.can_connect() {
            log::debug!("Ignoring connect to {}: session is {}", address, status);
            return false;
        }

        log::info!("Connecting to {}", address);

        self.inbound = Arc::new(Inbound::default());
        self.transport.set_receive_callback(receive_callback(
            Arc::clone(&self.inbound),
            Arc::clone(&self.stats),
        ));

        self.address = Some(address.to_string());
        self.connect_started = Some(Instant::now());
        self.timed_out = false;
        self.was_connected = false;
        self.last_error = None;

        self.transport.connect(address);
        true
    }

    pub fn disconnect(&mut self) {
        if self.status() != ConnectionStatus::Disconnected {
            log::info!("Disconnecting from {}", self.address_label());
        }

        self.transport.disconnect();
        self.connect_started = None;
        self.timed_out = false;
        self.was_connected = false;
    }

    /// Observes transport transitions and enforces the connect timeout.
    pub fn poll(&mut self, now: Instant) {
        if self.timed_out {
            return;
        }

        match self.transport.status() {
            ConnectionStatus::Connecting => {
                let expired = self.connect_started.is_some_and(|started| {
                    now.saturating_duration_since(started) > self.config.connect_timeout
                });
                if expired {
                    log::warn!(
                        "Connection to {} timed out after {:?}",
                        self.address_label(),
                        self.config.connect_timeout
                    );
                    self.transport.disconnect();
                    self.connect_started = None;
                    self.timed_out = true;
                    self.last_error = Some(ConnectionError::TimedOut);
                }
            }
            ConnectionStatus::Connected => {
                if !self.was_connected {
                    log::info!("Connected to {}", self.address_label());
                    self.was_connected = true;
                    self.connect_started = None;
                }
            }
            ConnectionStatus::FailedToConnect => {
                if self.connect_started.take().is_some() {
                    log::warn!("Failed to connect to {}", self.address_label());
                    self.last_error = Some(ConnectionError::FailedToConnect);
                }
            }
            ConnectionStatus::Disconnected => {
                if self.was_connected {
                    log::warn!("Lost connection to {}", self.address_label());
                    self.was_connected = false;
                    self.last_error = Some(ConnectionError::Disconnected);
                }
            }
            ConnectionStatus::TimedOut => {}
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.timed_out {
            ConnectionStatus::TimedOut
        } else {
            self.transport.status()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Sends a complete message. Dropped when not connected.
    pub fn send(&self, data: Bytes) {
        if !self.is_connected() {
            self.stats.record_dropped();
            log::trace!("Dropping {} byte send while {}", data.len(), self.status());
            return;
        }

        self.stats.record_sent(data.len());
        self.transport.send(data);
    }

    pub fn send_packet(&self, packet: &Packet) {
        self.send(packet.encode());
    }

    /// Removes peers not heard from within the configured timeout.
    pub fn sweep_peers(&self, now: Instant) -> Vec<PeerId> {
        let evicted = self
            .inbound
            .peers
            .evict_stale(now, self.config.peer_timeout);
        for id in &evicted {
            log::debug!("Evicted silent peer {}", id);
        }
        evicted
    }

    pub fn local_id(&self) -> Option<PeerId> {
        self.inbound.local_id.get().copied()
    }

    pub fn peers(&self) -> &PeerTable {
        &self.inbound.peers
    }

    pub fn last_error(&self) -> Option<ConnectionError> {
        self.last_error
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn address_label(&self) -> &str {
        self.address.as_deref().unwrap_or("<none>")
    }
}
