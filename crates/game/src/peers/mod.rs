mod table;

pub use table::{ApplyReport, PeerEntry, PeerMap, PeerTable};
