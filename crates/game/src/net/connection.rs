use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    FailedToConnect,
    /// Session-level outcome; a transport never reports it.
    TimedOut,
}

impl ConnectionStatus {
    /// Whether `connect_to` may start a new attempt from this state.
    pub fn can_connect(self) -> bool {
        matches!(
            self,
            Self::Disconnected | Self::FailedToConnect | Self::TimedOut
        )
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    pub fn error(self) -> Option<ConnectionError> {
        match self {
            Self::FailedToConnect => Some(ConnectionError::FailedToConnect),
            Self::TimedOut => Some(ConnectionError::TimedOut),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::FailedToConnect => "Failed to connect",
            Self::TimedOut => "Timed out",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to connect")]
    FailedToConnect,
    #[error("connection attempt timed out")]
    TimedOut,
    #[error("connection lost")]
    Disconnected,
}
