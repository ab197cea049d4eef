use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Directional keys held during a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirectionKeys: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl DirectionKeys {
    /// Requested direction in screen space (y grows downward).
    ///
    /// Opposing keys on the same axis cancel out.
    pub fn direction(self) -> Vec2 {
        Vec2::new(
            axis(self.contains(Self::LEFT), self.contains(Self::RIGHT)),
            axis(self.contains(Self::UP), self.contains(Self::DOWN)),
        )
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keys() {
        assert_eq!(DirectionKeys::UP.direction(), Vec2::new(0.0, -1.0));
        assert_eq!(DirectionKeys::DOWN.direction(), Vec2::new(0.0, 1.0));
        assert_eq!(DirectionKeys::LEFT.direction(), Vec2::new(-1.0, 0.0));
        assert_eq!(DirectionKeys::RIGHT.direction(), Vec2::new(1.0, 0.0));
        assert_eq!(DirectionKeys::empty().direction(), Vec2::ZERO);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let keys = DirectionKeys::UP | DirectionKeys::DOWN | DirectionKeys::RIGHT;
        assert_eq!(keys.direction(), Vec2::new(1.0, 0.0));
        assert_eq!(DirectionKeys::all().direction(), Vec2::ZERO);
    }

    #[test]
    fn test_diagonal() {
        let keys = DirectionKeys::UP | DirectionKeys::LEFT;
        assert_eq!(keys.direction(), Vec2::new(-1.0, -1.0));
    }
}
