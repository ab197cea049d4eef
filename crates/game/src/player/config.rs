use glam::Vec2;

#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Speed the player snaps to while a direction is held, in units per second.
    pub speed: f32,
    /// Exponential decay rate of velocity, per second.
    pub damping_rate: f32,
    pub spawn_position: Vec2,
    /// Velocity components below this magnitude are treated as rest.
    pub rest_threshold: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 150.0,
            damping_rate: 10.0,
            spawn_position: Vec2::new(50.0, 50.0),
            rest_threshold: 1e-3,
        }
    }
}

impl MotionConfig {
    /// Replaces values that would make the motion non-finite with defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();

        let speed = finite_non_negative("speed", self.speed, defaults.speed);
        let damping_rate =
            finite_non_negative("damping_rate", self.damping_rate, defaults.damping_rate);
        let rest_threshold =
            finite_non_negative("rest_threshold", self.rest_threshold, defaults.rest_threshold);
        let spawn_position = if self.spawn_position.is_finite() {
            self.spawn_position
        } else {
            log::warn!(
                "Invalid spawn position {}, using {}",
                self.spawn_position,
                defaults.spawn_position
            );
            defaults.spawn_position
        };

        Self {
            speed,
            damping_rate,
            spawn_position,
            rest_threshold,
        }
    }
}

fn finite_non_negative(name: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("Invalid motion {} {}, using {}", name, value, default);
        default
    }
}
