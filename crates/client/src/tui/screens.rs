use cubed::StatusTone;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::surface::{ConnectForm, WorldCanvas};

pub struct StatusLine {
    pub address: String,
    pub local_id: Option<u32>,
    pub remote_peers: usize,
    pub packets_sent: u64,
    pub packets_received: u64,
}

pub enum Screen<'a> {
    Connect(&'a ConnectForm),
    World(&'a WorldCanvas, &'a StatusLine),
}

pub fn render(frame: &mut Frame, screen: &Screen<'_>) {
    let area = frame.area();

    let block = Block::default()
        .title(" Cubed ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match screen {
        Screen::Connect(form) => render_connect(frame, inner, form),
        Screen::World(canvas, status) => render_world(frame, inner, canvas, status),
    }
}

fn render_connect(frame: &mut Frame, area: Rect, form: &ConnectForm) {
    let dialog_area = centered_rect(50, 10, area);
    frame.render_widget(Clear, dialog_area);

    let dialog = Block::default()
        .title(" Connect to Server ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(dialog, dialog_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(dialog_area);

    if let Some(input) = &form.input {
        let label = Paragraph::new(format!("{}:", input.label))
            .style(Style::default().fg(Color::White));
        frame.render_widget(label, inner[0]);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let input_text = Paragraph::new(format!("{}_", input.value))
            .style(Style::default().fg(Color::White))
            .block(input_block);
        frame.render_widget(input_text, inner[1]);
    }

    let statuses: Vec<Line> = form
        .statuses
        .iter()
        .map(|(text, tone)| {
            let color = match tone {
                StatusTone::Muted => Color::DarkGray,
                StatusTone::Error => Color::Red,
            };
            Line::from(Span::styled(text.as_str(), Style::default().fg(color)))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(statuses).alignment(Alignment::Center),
        inner[2],
    );

    let button = form.button.as_deref().unwrap_or("Connect");
    let help = Paragraph::new(format!("Enter {}  Esc Quit", button))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, inner[3]);
}

fn render_world(frame: &mut Frame, area: Rect, canvas: &WorldCanvas, status: &StatusLine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    frame.render_widget(canvas, chunks[0]);

    let local_id = status
        .local_id
        .map(|id| format!("Peer ID: {}", id))
        .unwrap_or_else(|| "Peer ID: -".to_string());
    let line = Line::from(vec![
        Span::styled(
            format!("{} ", status.address),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(local_id, Style::default().fg(Color::White)),
        Span::styled(
            format!(
                "  Peers: {}  Packets: {} sent / {} recv  Esc Disconnect",
                status.remote_peers, status.packets_sent, status.packets_received
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), chunks[1]);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
