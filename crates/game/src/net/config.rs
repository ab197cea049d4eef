use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long `Connecting` may last before the attempt is abandoned.
    pub connect_timeout: Duration,
    /// Peers not heard from for this long are evicted from the table.
    pub peer_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            peer_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(1),
        }
    }
}
