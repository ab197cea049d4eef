mod screens;
mod surface;

use std::io;

use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub use screens::{Screen, StatusLine};
pub use surface::{ConnectForm, FormEdit, WorldCanvas};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    release_events: bool,
    restored: bool,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!("Terminal key release events: {}", release_events);

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            release_events,
            restored: false,
        })
    }

    /// Whether the terminal reports key releases.
    pub fn release_events(&self) -> bool {
        self.release_events
    }

    pub fn draw(&mut self, screen: &Screen<'_>) -> io::Result<()> {
        self.terminal.draw(|frame| screens::render(frame, screen))?;
        Ok(())
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        if self.release_events {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
