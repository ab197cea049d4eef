use cubed::{ConnectUi, DrawSurface, StatusTone};
use glam::Vec2;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

#[derive(Debug, Clone, Copy, PartialEq)]
struct FilledRect {
    position: Vec2,
    size: Vec2,
    color: u32,
}

/// Rectangles drawn this frame, painted onto terminal cells.
pub struct WorldCanvas {
    scale: Vec2,
    rects: Vec<FilledRect>,
}

impl WorldCanvas {
    pub fn new(scale: Vec2) -> Self {
        Self {
            scale: scale.max(Vec2::ONE),
            rects: Vec::new(),
        }
    }

    /// Cells covered by a world-space rectangle, clipped to `area`.
    fn cells(&self, position: Vec2, size: Vec2, area: Rect) -> Option<Rect> {
        let min = (position / self.scale).floor();
        let max = ((position + size) / self.scale).ceil();

        let left = min.x.max(0.0);
        let top = min.y.max(0.0);
        let right = max.x.min(f32::from(area.width));
        let bottom = max.y.min(f32::from(area.height));
        if !(left < right && top < bottom) {
            return None;
        }

        Some(Rect::new(
            area.x + left as u16,
            area.y + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }
}

impl DrawSurface for WorldCanvas {
    fn draw_filled_rect(&mut self, position: Vec2, size: Vec2, color: u32) {
        self.rects.push(FilledRect {
            position,
            size,
            color,
        });
    }
}

impl Widget for &WorldCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for rect in &self.rects {
            let Some(cells) = self.cells(rect.position, rect.size, area) else {
                continue;
            };
            let color = argb_color(rect.color);
            for y in cells.top()..cells.bottom() {
                for x in cells.left()..cells.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_char(' ').set_bg(color);
                    }
                }
            }
        }
    }
}

fn argb_color(color: u32) -> Color {
    let [_, r, g, b] = color.to_be_bytes();
    Color::Rgb(r, g, b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEdit {
    Insert(char),
    Backspace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub label: String,
    pub value: String,
}

/// Connect form widgets, fed with the keys typed since the last frame.
#[derive(Default)]
pub struct ConnectForm {
    edits: Vec<FormEdit>,
    submit: bool,
    pub input: Option<FormInput>,
    pub statuses: Vec<(String, StatusTone)>,
    pub button: Option<String>,
}

impl ConnectForm {
    pub fn new(edits: Vec<FormEdit>, submit: bool) -> Self {
        Self {
            edits,
            submit,
            ..Self::default()
        }
    }
}

impl ConnectUi for ConnectForm {
    fn input_text(&mut self, label: &str, value: &mut String) {
        for edit in self.edits.drain(..) {
            match edit {
                FormEdit::Insert(c) => value.push(c),
                FormEdit::Backspace => {
                    value.pop();
                }
            }
        }
        self.input = Some(FormInput {
            label: label.to_string(),
            value: value.clone(),
        });
    }

    fn status_text(&mut self, text: &str, tone: StatusTone) {
        self.statuses.push((text.to_string(), tone));
    }

    fn button(&mut self, label: &str) -> bool {
        self.button = Some(label.to_string());
        std::mem::take(&mut self.submit)
    }
}
