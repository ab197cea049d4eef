use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::net::{MotionState, PeerId, StateUpdate, sequence_greater_than};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerEntry {
    pub motion: MotionState,
    pub sequence: u32,
    pub last_seen: Instant,
}

pub type PeerMap = HashMap<PeerId, PeerEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub inserted: usize,
    pub updated: usize,
    /// Entries discarded because their sequence was not newer than the stored one.
    pub stale: usize,
}

/// Last-known remote states, written by the receive path and read by the
/// render path.
///
/// The map lives behind an `Arc` so a reader only clones a pointer while
/// holding the lock. A writer that finds the previous map still shared
/// copies it before mutating, so a reader never sees a write in progress.
#[derive(Debug, Default)]
pub struct PeerTable {
    entries: Mutex<Arc<PeerMap>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_snapshot(&self, update: &StateUpdate, now: Instant) -> ApplyReport {
        let mut report = ApplyReport::default();
        if update.is_empty() {
            return report;
        }

        let mut guard = self.entries.lock();
        let map = Arc::make_mut(&mut guard);

        for (&id, peer) in &update.peers {
            match map.entry(id) {
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    if !sequence_greater_than(peer.sequence, entry.sequence) {
                        report.stale += 1;
                        continue;
                    }
                    entry.motion = peer.motion;
                    entry.sequence = peer.sequence;
                    entry.last_seen = now;
                    report.updated += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(PeerEntry {
                        motion: peer.motion,
                        sequence: peer.sequence,
                        last_seen: now,
                    });
                    report.inserted += 1;
                }
            }
        }

        report
    }

    /// Point-in-time view of the whole table.
    pub fn read_all(&self) -> Arc<PeerMap> {
        Arc::clone(&self.entries.lock())
    }

    /// Every peer except `local`, ordered by id.
    pub fn remote_peers(&self, local: Option<PeerId>) -> Vec<(PeerId, MotionState)> {
        let snapshot = self.read_all();
        let mut peers: Vec<_> = snapshot
            .iter()
            .filter(|(id, _)| Some(**id) != local)
            .map(|(&id, entry)| (id, entry.motion))
            .collect();
        peers.sort_by_key(|(id, _)| *id);
        peers
    }

    pub fn get(&self, id: PeerId) -> Option<PeerEntry> {
        self.entries.lock().get(&id).copied()
    }

    pub fn evict_stale(&self, now: Instant, max_age: Duration) -> Vec<PeerId> {
        let mut guard = self.entries.lock();

        let expired: Vec<PeerId> = guard
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_seen) > max_age)
            .map(|(&id, _)| id)
            .collect();

        if !expired.is_empty() {
            let map = Arc::make_mut(&mut guard);
            for id in &expired {
                map.remove(id);
            }
        }

        expired
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        *self.entries.lock() = Arc::new(PeerMap::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::PeerUpdate;
    use glam::Vec2;

    fn update(entries: &[(u32, u32, (f32, f32), (f32, f32))]) -> StateUpdate {
        let mut update = StateUpdate::new();
        for &(id, sequence, pos, vel) in entries {
            update.insert(
                PeerId(id),
                PeerUpdate::new(
                    sequence,
                    MotionState::new(Vec2::new(pos.0, pos.1), Vec2::new(vel.0, vel.1)),
                ),
            );
        }
        update
    }

    #[test]
    fn test_successive_snapshots_last_write_wins() {
        let table = PeerTable::new();
        let now = Instant::now();

        table.apply_snapshot(&update(&[(1, 0, (0.0, 0.0), (0.0, 0.0))]), now);
        let report = table.apply_snapshot(&update(&[(1, 1, (5.0, 5.0), (1.0, 1.0))]), now);

        assert_eq!(report.updated, 1);
        assert_eq!(table.len(), 1);
        let entry = table.get(PeerId(1)).unwrap();
        assert_eq!(entry.motion.position, Vec2::new(5.0, 5.0));
        assert_eq!(entry.motion.velocity, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_stale_sequence_discarded() {
        let table = PeerTable::new();
        let now = Instant::now();

        table.apply_snapshot(&update(&[(3, 10, (1.0, 1.0), (0.0, 0.0))]), now);
        let report = table.apply_snapshot(&update(&[(3, 9, (9.0, 9.0), (0.0, 0.0))]), now);
        let replay = table.apply_snapshot(&update(&[(3, 10, (9.0, 9.0), (0.0, 0.0))]), now);

        assert_eq!(report.stale, 1);
        assert_eq!(replay.stale, 1);
        assert_eq!(table.get(PeerId(3)).unwrap().motion.position, Vec2::ONE);
    }

    #[test]
    fn test_sequence_wraps() {
        let table = PeerTable::new();
        let now = Instant::now();

        table.apply_snapshot(&update(&[(3, u32::MAX, (1.0, 1.0), (0.0, 0.0))]), now);
        let report = table.apply_snapshot(&update(&[(3, 0, (2.0, 2.0), (0.0, 0.0))]), now);

        assert_eq!(report.updated, 1);
        assert_eq!(table.get(PeerId(3)).unwrap().sequence, 0);
    }

    #[test]
    fn test_read_all_is_isolated_from_later_writes() {
        let table = PeerTable::new();
        let now = Instant::now();

        table.apply_snapshot(&update(&[(1, 0, (1.0, 1.0), (0.0, 0.0))]), now);
        let before = table.read_all();
        table.apply_snapshot(
            &update(&[(1, 1, (2.0, 2.0), (0.0, 0.0)), (2, 0, (0.0, 0.0), (0.0, 0.0))]),
            now,
        );

        assert_eq!(before.len(), 1);
        assert_eq!(before[&PeerId(1)].motion.position, Vec2::ONE);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remote_peers_excludes_local() {
        let table = PeerTable::new();
        table.apply_snapshot(
            &update(&[(7, 0, (0.0, 0.0), (0.0, 0.0)), (2, 0, (3.0, 4.0), (0.0, 0.0))]),
            Instant::now(),
        );

        let remotes = table.remote_peers(Some(PeerId(7)));
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].0, PeerId(2));
        assert_eq!(table.remote_peers(None).len(), 2);
    }

    #[test]
    fn test_evict_stale() {
        let table = PeerTable::new();
        let start = Instant::now();
        let later = start + Duration::from_secs(10);

        table.apply_snapshot(&update(&[(1, 0, (0.0, 0.0), (0.0, 0.0))]), start);
        table.apply_snapshot(&update(&[(2, 0, (0.0, 0.0), (0.0, 0.0))]), later);

        let evicted = table.evict_stale(later + Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(evicted, vec![PeerId(1)]);
        assert!(table.get(PeerId(1)).is_none());
        assert!(table.get(PeerId(2)).is_some());
    }

    #[test]
    fn test_clear_leaves_old_snapshots_intact() {
        let table = PeerTable::new();
        table.apply_snapshot(&update(&[(1, 0, (1.0, 2.0), (0.0, 0.0))]), Instant::now());
        let before = table.read_all();

        table.clear();

        assert!(table.is_empty());
        assert_eq!(before.len(), 1);

        // A cleared peer is accepted again from any sequence.
        let report =
            table.apply_snapshot(&update(&[(1, 0, (3.0, 4.0), (0.0, 0.0))]), Instant::now());
        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn test_restarted_sequence_frozen_until_evicted() {
        let table = PeerTable::new();
        let start = Instant::now();

        table.apply_snapshot(&update(&[(4, 500, (1.0, 1.0), (0.0, 0.0))]), start);
        let report = table.apply_snapshot(&update(&[(4, 0, (9.0, 9.0), (0.0, 0.0))]), start);
        assert_eq!(report.stale, 1);
        assert_eq!(table.get(PeerId(4)).unwrap().motion.position, Vec2::ONE);

        let later = start + Duration::from_secs(6);
        assert_eq!(table.evict_stale(later, Duration::from_secs(5)), vec![PeerId(4)]);

        let report = table.apply_snapshot(&update(&[(4, 1, (9.0, 9.0), (0.0, 0.0))]), later);
        assert_eq!(report.inserted, 1);
        assert_eq!(table.get(PeerId(4)).unwrap().motion.position, Vec2::splat(9.0));
    }
}
