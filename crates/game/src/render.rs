use glam::Vec2;

pub const PLAYER_SIZE: Vec2 = Vec2::splat(50.0);
pub const LOCAL_PLAYER_COLOR: u32 = 0xFFFF_00FF;
pub const REMOTE_PLAYER_COLOR: u32 = 0xFF00_FF00;

/// Screen-space drawing, anchored at the window origin.
pub trait DrawSurface {
    /// `color` is packed ARGB.
    fn draw_filled_rect(&mut self, position: Vec2, size: Vec2, color: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Muted,
    Error,
}

/// Widgets for the disconnected-state connect form.
pub trait ConnectUi {
    fn input_text(&mut self, label: &str, value: &mut String);

    fn status_text(&mut self, text: &str, tone: StatusTone);

    /// Returns `true` when the button was pressed this frame.
    fn button(&mut self, label: &str) -> bool;
}
