use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use cubed::DirectionKeys;

/// Maps a terminal key to the direction it drives.
pub fn direction_for(code: KeyCode) -> Option<DirectionKeys> {
    match code {
        KeyCode::Up => Some(DirectionKeys::UP),
        KeyCode::Down => Some(DirectionKeys::DOWN),
        KeyCode::Left => Some(DirectionKeys::LEFT),
        KeyCode::Right => Some(DirectionKeys::RIGHT),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(DirectionKeys::UP),
            's' => Some(DirectionKeys::DOWN),
            'a' => Some(DirectionKeys::LEFT),
            'd' => Some(DirectionKeys::RIGHT),
            _ => None,
        },
        _ => None,
    }
}

/// Held-key tracking for terminals.
///
/// With release events a key stays held until released. Without them a key
/// is held for `hold` after its last press or repeat.
pub struct KeyTracker {
    hold: Duration,
    release_events: bool,
    keys_held: HashMap<KeyCode, (DirectionKeys, Instant)>,
}

impl KeyTracker {
    pub fn new(hold: Duration, release_events: bool) -> Self {
        Self {
            hold,
            release_events,
            keys_held: HashMap::new(),
        }
    }

    /// Returns `false` for keys that do not move the player.
    pub fn press(&mut self, code: KeyCode, now: Instant) -> bool {
        let code = normalize(code);
        let Some(direction) = direction_for(code) else {
            return false;
        };
        self.keys_held.insert(code, (direction, now));
        true
    }

    pub fn release(&mut self, code: KeyCode) {
        self.keys_held.remove(&normalize(code));
    }

    pub fn clear(&mut self) {
        self.keys_held.clear();
    }

    pub fn keys(&mut self, now: Instant) -> DirectionKeys {
        if !self.release_events {
            let hold = self.hold;
            self.keys_held
                .retain(|_, (_, pressed)| now.saturating_duration_since(*pressed) <= hold);
        }

        self.keys_held
            .values()
            .fold(DirectionKeys::empty(), |keys, (direction, _)| keys | *direction)
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_and_wasd() {
        assert_eq!(direction_for(KeyCode::Up), Some(DirectionKeys::UP));
        assert_eq!(direction_for(KeyCode::Char('W')), Some(DirectionKeys::UP));
        assert_eq!(direction_for(KeyCode::Char('d')), Some(DirectionKeys::RIGHT));
        assert_eq!(direction_for(KeyCode::Char('x')), None);
        assert_eq!(direction_for(KeyCode::Enter), None);
    }

    #[test]
    fn test_release_events() {
        let mut tracker = KeyTracker::new(Duration::from_millis(100), true);
        let now = Instant::now();

        assert!(tracker.press(KeyCode::Left, now));
        assert!(tracker.press(KeyCode::Char('S'), now));
        assert_eq!(
            tracker.keys(now + Duration::from_secs(5)),
            DirectionKeys::LEFT | DirectionKeys::DOWN
        );

        tracker.release(KeyCode::Char('s'));
        assert_eq!(tracker.keys(now), DirectionKeys::LEFT);
    }

    #[test]
    fn test_hold_window_without_release_events() {
        let mut tracker = KeyTracker::new(Duration::from_millis(100), false);
        let now = Instant::now();

        tracker.press(KeyCode::Up, now);
        assert_eq!(
            tracker.keys(now + Duration::from_millis(50)),
            DirectionKeys::UP
        );

        // A repeat event extends the hold.
        tracker.press(KeyCode::Up, now + Duration::from_millis(90));
        assert_eq!(
            tracker.keys(now + Duration::from_millis(150)),
            DirectionKeys::UP
        );

        assert_eq!(
            tracker.keys(now + Duration::from_millis(300)),
            DirectionKeys::empty()
        );
    }

    #[test]
    fn test_non_movement_key_ignored() {
        let mut tracker = KeyTracker::new(Duration::from_millis(100), true);
        assert!(!tracker.press(KeyCode::Enter, Instant::now()));
        assert_eq!(tracker.keys(Instant::now()), DirectionKeys::empty());
    }
}
