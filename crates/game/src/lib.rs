pub mod client;
pub mod net;
pub mod peers;
pub mod player;
pub mod render;

pub use client::GameClient;
pub use net::{
    ConnectionError, ConnectionStatus, DEFAULT_PORT, DecodeError, MotionState, NetworkStats,
    Packet, PacketTag, PeerId, PeerUpdate, ReceiveCallback, Session, SessionConfig, StateUpdate,
    TcpTransport, Transport, TransportError,
};
pub use peers::{ApplyReport, PeerEntry, PeerMap, PeerTable};
pub use player::{DirectionKeys, LocalPlayer, MotionConfig};
pub use render::{ConnectUi, DrawSurface, StatusTone};
