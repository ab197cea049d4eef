use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use cubed::{GameClient, TcpTransport};

use crate::config::ClientConfig;
use crate::input::KeyTracker;
use crate::tui::{ConnectForm, FormEdit, Screen, StatusLine, Tui, WorldCanvas};

const MAX_FRAME_DT: f32 = 0.1;

pub struct App {
    client: GameClient<TcpTransport>,
    config: ClientConfig,
    tui: Tui,
    keys: KeyTracker,
    edits: Vec<FormEdit>,
    submit: bool,
    should_quit: bool,
    last_frame_time: Option<Instant>,
}

impl App {
    pub fn new(client: GameClient<TcpTransport>, config: ClientConfig) -> anyhow::Result<Self> {
        let tui = Tui::new()?;
        let keys = KeyTracker::new(config.key_hold, tui.release_events());

        Ok(Self {
            client,
            config,
            tui,
            keys,
            edits: Vec::new(),
            submit: false,
            should_quit: false,
            last_frame_time: None,
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let frame_duration = self.config.frame_duration();
        let mut next_frame = Instant::now();

        while !self.should_quit {
            let timeout = next_frame.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                self.handle_event(event::read()?);
                continue;
            }

            self.frame()?;
            next_frame += frame_duration;
            let now = Instant::now();
            if next_frame < now {
                next_frame = now;
            }
        }

        self.client.disconnect();
        log::info!("Exiting");
        Ok(())
    }

    fn frame(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map(|t| now.duration_since(t).as_secs_f32())
            .unwrap_or(0.0)
            .min(MAX_FRAME_DT);
        self.last_frame_time = Some(now);

        let keys = if self.client.session().is_connected() {
            self.keys.keys(now)
        } else {
            self.keys.clear();
            Default::default()
        };
        self.client.update(dt, keys);

        let mut canvas = WorldCanvas::new(self.config.world_scale);
        let mut form =
            ConnectForm::new(std::mem::take(&mut self.edits), std::mem::take(&mut self.submit));
        self.client.render(&mut canvas, &mut form);

        // `render` drew the world only if the session was connected.
        if form.input.is_some() {
            self.tui.draw(&Screen::Connect(&form))?;
        } else {
            let status = self.status_line();
            self.tui.draw(&Screen::World(&canvas, &status))?;
        }
        Ok(())
    }

    fn status_line(&self) -> StatusLine {
        let session = self.client.session();
        let local_id = session.local_id();
        let stats = session.stats();

        StatusLine {
            address: session.address().unwrap_or_default().to_string(),
            local_id: local_id.map(|id| id.0),
            remote_peers: session.peers().remote_peers(local_id).len(),
            packets_sent: stats.packets_sent,
            packets_received: stats.packets_received,
        }
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };

        if key.kind == KeyEventKind::Release {
            self.keys.release(key.code);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.client.session().is_connected() {
            self.handle_world_key(key);
        } else {
            self.handle_connect_key(key);
        }
    }

    fn handle_world_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.keys.clear();
                self.client.disconnect();
            }
            code => {
                self.keys.press(code, Instant::now());
            }
        }
    }

    fn handle_connect_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit = true,
            KeyCode::Backspace => self.edits.push(FormEdit::Backspace),
            KeyCode::Char(c) if !c.is_control() && !c.is_whitespace() => {
                self.edits.push(FormEdit::Insert(c));
            }
            _ => {}
        }
    }

    pub fn restore_terminal(&mut self) -> anyhow::Result<()> {
        self.tui.restore_terminal()?;
        Ok(())
    }
}
