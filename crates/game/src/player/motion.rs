use glam::Vec2;

use crate::net::{MotionState, PeerUpdate};

use super::MotionConfig;

/// Locally simulated player.
pub struct LocalPlayer {
    config: MotionConfig,
    state: MotionState,
    sequence: u32,
}

impl Default for LocalPlayer {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl LocalPlayer {
    pub fn new(config: MotionConfig) -> Self {
        let config = config.sanitized();
        Self {
            state: MotionState::new(config.spawn_position, Vec2::ZERO),
            config,
            sequence: 0,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.state.velocity
    }

    /// Advances the player by `dt` seconds with the requested direction.
    ///
    /// A non-zero direction sets velocity to full speed immediately; the
    /// velocity then decays as `exp(-damping_rate * dt)`, the closed form of
    /// repeatedly lerping toward zero, which cannot overshoot for any `dt`.
    pub fn step(&mut self, direction: Vec2, dt: f32) {
        let dt = sanitize_dt(dt);

        if direction.length_squared() > 0.0 && direction.is_finite() {
            self.state.velocity = direction.normalize() * self.config.speed;
        }

        self.state.position += self.state.velocity * dt;

        let decay = (-self.config.damping_rate * dt).exp();
        let mut velocity = self.state.velocity * decay;
        if velocity.x.abs() < self.config.rest_threshold {
            velocity.x = 0.0;
        }
        if velocity.y.abs() < self.config.rest_threshold {
            velocity.y = 0.0;
        }
        self.state.velocity = velocity;
    }

    /// Outgoing state for this tick, tagged with the next sequence number.
    pub fn snapshot(&mut self) -> PeerUpdate {
        let update = PeerUpdate::new(self.sequence, self.state);
        self.sequence = self.sequence.wrapping_add(1);
        update
    }

    pub fn reset(&mut self) {
        self.state = MotionState::new(self.config.spawn_position, Vec2::ZERO);
        self.sequence = 0;
    }
}

fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(rest_threshold: f32) -> LocalPlayer {
        LocalPlayer::new(MotionConfig {
            rest_threshold,
            ..MotionConfig::default()
        })
    }

    #[test]
    fn test_direction_snaps_to_speed() {
        let mut player = player(0.0);
        player.step(Vec2::new(3.0, 4.0), 0.0);

        assert!((player.velocity().length() - 150.0).abs() < 1e-3);
        assert!((player.velocity().x - 90.0).abs() < 1e-3);
        assert_eq!(player.position(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_held_then_released() {
        let mut player = player(0.0);

        player.step(Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(player.position(), Vec2::new(200.0, 50.0));
        let after_hold = 150.0 * (-10.0f32).exp();
        assert!((player.velocity().x - after_hold).abs() < 1e-6);

        player.step(Vec2::ZERO, 1.0);
        let expected = 150.0 * (-20.0f32).exp();
        assert!((player.velocity().length() - expected).abs() < 1e-9);
        assert!(player.velocity().length() < 150.0 * 1e-4);
    }

    #[test]
    fn test_damping_converges() {
        for start in [1.0f32, -250.0, 1e15, -3.0e18] {
            let mut player = player(0.0);
            player.state.velocity = Vec2::new(start, -start);

            let mut previous = player.velocity().length();
            for _ in 0..2_000 {
                player.step(Vec2::ZERO, 1.0 / 60.0);
                let speed = player.velocity().length();
                assert!(speed.is_finite());
                assert!(speed <= previous);
                previous = speed;
            }
            assert!(previous < 1e-6, "velocity did not settle from {}", start);
        }
    }

    #[test]
    fn test_invalid_config_keeps_motion_finite() {
        let mut player = LocalPlayer::new(MotionConfig {
            speed: f32::INFINITY,
            damping_rate: f32::NAN,
            ..MotionConfig::default()
        });

        player.step(Vec2::new(1.0, 0.0), 0.016);
        assert!(player.velocity().is_finite());
        assert!(player.position().is_finite());
        assert!(player.snapshot().motion.is_finite());
    }

    #[test]
    fn test_large_dt_does_not_diverge() {
        let mut player = player(0.0);
        player.step(Vec2::new(0.0, 1.0), 5.0);
        assert!(player.velocity().is_finite());
        assert!(player.velocity().length() < 150.0);
    }

    #[test]
    fn test_invalid_dt_ignored() {
        let mut player = player(0.0);
        player.step(Vec2::new(1.0, 0.0), f32::NAN);
        player.step(Vec2::new(1.0, 0.0), -1.0);
        assert_eq!(player.position(), Vec2::new(50.0, 50.0));
        assert!(player.velocity().is_finite());
    }

    #[test]
    fn test_rest_threshold_snaps_to_zero() {
        let mut player = player(1e-3);
        player.step(Vec2::new(1.0, 0.0), 0.1);
        for _ in 0..200 {
            player.step(Vec2::ZERO, 0.1);
        }
        assert_eq!(player.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_snapshot_sequence_advances() {
        let mut player = player(0.0);
        assert_eq!(player.snapshot().sequence, 0);
        assert_eq!(player.snapshot().sequence, 1);
        player.sequence = u32::MAX;
        assert_eq!(player.snapshot().sequence, u32::MAX);
        assert_eq!(player.snapshot().sequence, 0);
    }
}
