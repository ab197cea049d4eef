use std::time::Duration;

use cubed::{MotionConfig, SessionConfig};
use glam::Vec2;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub frame_rate: u32,
    /// How long a key counts as held after its last press when the terminal
    /// cannot report releases.
    pub key_hold: Duration,
    /// World units covered by one terminal cell.
    pub world_scale: Vec2,
    pub session: SessionConfig,
    pub motion: MotionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            key_hold: Duration::from_millis(120),
            world_scale: Vec2::new(10.0, 20.0),
            session: SessionConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}
