use std::collections::BTreeMap;
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::Vec2;

pub const DEFAULT_PORT: u16 = 27015;

const TAG_LEN: usize = 1;
const PEER_ID_LEN: usize = 4;
const COUNT_LEN: usize = 4;
/// id + sequence + position + velocity
pub const PEER_ENTRY_LEN: usize = 4 + 4 + 4 * 4;

const SEQUENCE_WRAP_THRESHOLD: u32 = u32::MAX / 2;

#[inline]
pub fn sequence_greater_than(s1: u32, s2: u32) -> bool {
    ((s1 > s2) && (s1 - s2 <= SEQUENCE_WRAP_THRESHOLD))
        || ((s1 < s2) && (s2 - s1 > SEQUENCE_WRAP_THRESHOLD))
}

/// Identifier the authority hands out to every connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl MotionState {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeerUpdate {
    pub sequence: u32,
    pub motion: MotionState,
}

impl PeerUpdate {
    pub fn new(sequence: u32, motion: MotionState) -> Self {
        Self { sequence, motion }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub peers: BTreeMap<PeerId, PeerUpdate>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: PeerId, update: PeerUpdate) -> Self {
        let mut peers = BTreeMap::new();
        peers.insert(id, update);
        Self { peers }
    }

    pub fn insert(&mut self, id: PeerId, update: PeerUpdate) {
        self.peers.insert(id, update);
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketTag {
    ConnectAck = 0x00,
    StateUpdate = 0x01,
}

impl TryFrom<u8> for PacketTag {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::ConnectAck),
            0x01 => Ok(Self::StateUpdate),
            other => Err(DecodeError::UnknownTag(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    ConnectAck { assigned_id: PeerId },
    StateUpdate(StateUpdate),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown packet tag 0x{0:02x}")]
    UnknownTag(u8),
    #[error("packet truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("non-finite motion value for peer {peer}")]
    NonFinite { peer: PeerId },
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

fn ensure(buf: &[u8], needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

impl Packet {
    pub fn tag(&self) -> PacketTag {
        match self {
            Self::ConnectAck { .. } => PacketTag::ConnectAck,
            Self::StateUpdate(_) => PacketTag::StateUpdate,
        }
    }

    pub fn encoded_len(&self) -> usize {
        TAG_LEN
            + match self {
                Self::ConnectAck { .. } => PEER_ID_LEN,
                Self::StateUpdate(update) => COUNT_LEN + update.len() * PEER_ENTRY_LEN,
            }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u8(self.tag() as u8);

        match self {
            Self::ConnectAck { assigned_id } => buf.put_u32_le(assigned_id.0),
            Self::StateUpdate(update) => {
                buf.put_u32_le(update.len() as u32);
                for (id, entry) in &update.peers {
                    buf.put_u32_le(id.0);
                    buf.put_u32_le(entry.sequence);
                    buf.put_f32_le(entry.motion.position.x);
                    buf.put_f32_le(entry.motion.position.y);
                    buf.put_f32_le(entry.motion.velocity.x);
                    buf.put_f32_le(entry.motion.velocity.y);
                }
            }
        }
    }

    pub fn decode(mut data: &[u8]) -> Result<Self, DecodeError> {
        ensure(data, TAG_LEN)?;
        let tag = PacketTag::try_from(data.get_u8())?;

        let packet = match tag {
            PacketTag::ConnectAck => {
                ensure(data, PEER_ID_LEN)?;
                Self::ConnectAck {
                    assigned_id: PeerId(data.get_u32_le()),
                }
            }
            PacketTag::StateUpdate => Self::StateUpdate(decode_state_update(&mut data)?),
        };

        if data.has_remaining() {
            return Err(DecodeError::TrailingBytes(data.remaining()));
        }

        Ok(packet)
    }
}

fn decode_state_update(data: &mut &[u8]) -> Result<StateUpdate, DecodeError> {
    ensure(data, COUNT_LEN)?;
    let count = data.get_u32_le() as usize;

    // Checked before reading any entry so a bogus count cannot overrun.
    let needed = count.saturating_mul(PEER_ENTRY_LEN);
    ensure(data, needed)?;

    let mut update = StateUpdate::new();
    for _ in 0..count {
        let id = PeerId(data.get_u32_le());
        let sequence = data.get_u32_le();
        let position = Vec2::new(data.get_f32_le(), data.get_f32_le());
        let velocity = Vec2::new(data.get_f32_le(), data.get_f32_le());

        let motion = MotionState::new(position, velocity);
        if !motion.is_finite() {
            return Err(DecodeError::NonFinite { peer: id });
        }

        if update.peers.insert(id, PeerUpdate::new(sequence, motion)).is_some() {
            log::debug!("Duplicate peer {} in state update, keeping last entry", id);
        }
    }

    Ok(update)
}
