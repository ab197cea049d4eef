mod config;
mod connection;
mod protocol;
mod session;
mod stats;
mod tcp;
mod transport;

pub use config::SessionConfig;
pub use connection::{ConnectionError, ConnectionStatus};
pub use protocol::{
    DEFAULT_PORT, DecodeError, MotionState, PEER_ENTRY_LEN, Packet, PacketTag, PeerId, PeerUpdate,
    StateUpdate, sequence_greater_than,
};
pub use session::Session;
pub use stats::NetworkStats;
pub use tcp::{MAX_FRAME_SIZE, TcpTransport, TransportError, read_frame, write_frame};
pub use transport::{ReceiveCallback, Transport};
