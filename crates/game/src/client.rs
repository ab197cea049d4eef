use std::time::Instant;

use crate::net::{
    ConnectionError, ConnectionStatus, Packet, Session, SessionConfig, StateUpdate, Transport,
};
use crate::player::{DirectionKeys, LocalPlayer, MotionConfig};
use crate::render::{
    ConnectUi, DrawSurface, LOCAL_PLAYER_COLOR, PLAYER_SIZE, REMOTE_PLAYER_COLOR, StatusTone,
};

/// One local player in one session, driven by the host loop.
///
/// The host calls `update` then `render` once per frame.
pub struct GameClient<T: Transport> {
    session: Session<T>,
    player: LocalPlayer,
    server_address: String,
    last_sweep: Instant,
}

impl<T: Transport> GameClient<T> {
    pub fn new(transport: T, session: SessionConfig, motion: MotionConfig) -> Self {
        Self {
            session: Session::new(transport, session),
            player: LocalPlayer::new(motion),
            server_address: String::new(),
            last_sweep: Instant::now(),
        }
    }

    pub fn with_server_address(mut self, address: impl Into<String>) -> Self {
        self.server_address = address.into();
        self
    }

    pub fn update(&mut self, dt: f32, keys: DirectionKeys) {
        let now = Instant::now();
        self.session.poll(now);

        if now.saturating_duration_since(self.last_sweep) >= self.session.config().sweep_interval {
            self.session.sweep_peers(now);
            self.last_sweep = now;
        }

        self.player.step(keys.direction(), dt);

        // Entries are keyed by the authority-assigned id, so nothing goes
        // out before the ConnectAck.
        let Some(local_id) = self.session.local_id() else {
            return;
        };
        if !self.session.is_connected() {
            return;
        }

        let update = StateUpdate::single(local_id, self.player.snapshot());
        self.session.send_packet(&Packet::StateUpdate(update));
    }

    pub fn render<S, U>(&mut self, surface: &mut S, ui: &mut U)
    where
        S: DrawSurface,
        U: ConnectUi,
    {
        if self.session.is_connected() {
            self.draw_world(surface);
        } else {
            self.draw_connect_form(ui);
        }
    }

    pub fn draw_world<S: DrawSurface>(&self, surface: &mut S) {
        surface.draw_filled_rect(self.player.position(), PLAYER_SIZE, LOCAL_PLAYER_COLOR);

        let local_id = self.session.local_id();
        for (_, motion) in self.session.peers().remote_peers(local_id) {
            surface.draw_filled_rect(motion.position, PLAYER_SIZE, REMOTE_PLAYER_COLOR);
        }
    }

    pub fn draw_connect_form<U: ConnectUi>(&mut self, ui: &mut U) {
        ui.input_text("Server address", &mut self.server_address);

        match self.session.status() {
            ConnectionStatus::Connecting => ui.status_text("Connecting...", StatusTone::Muted),
            ConnectionStatus::FailedToConnect => {
                ui.status_text("Failed to connect.", StatusTone::Error)
            }
            ConnectionStatus::TimedOut => ui.status_text("Timed out.", StatusTone::Error),
            ConnectionStatus::Disconnected => {
                if self.session.last_error() == Some(ConnectionError::Disconnected) {
                    ui.status_text("Connection lost.", StatusTone::Error);
                }
            }
            ConnectionStatus::Connected => {}
        }

        if ui.button("Connect") {
            let address = self.server_address.trim().to_string();
            if address.is_empty() {
                log::debug!("Connect pressed with an empty address");
            } else if self.session.connect_to(&address) {
                self.player.reset();
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn server_address_mut(&mut self) -> &mut String {
        &mut self.server_address
    }
}
