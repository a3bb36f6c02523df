use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders, Paragraph};

use tandem::{FieldBounds, Renderable, SpriteKind};

pub struct View {
    pub score: u64,
    pub alive: usize,
    pub role: &'static str,
    pub simulate: bool,
    pub detect: bool,
    pub renderables: Vec<Renderable>,
    pub bounds: FieldBounds,
}

#[derive(Debug, Default)]
pub struct TuiState {
    field_area: Rect,
}

impl TuiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a terminal cell onto field coordinates. Terminal rows grow
    /// downward while the field's y axis grows upward, so y is inverted.
    pub fn field_coords(&self, bounds: FieldBounds, column: u16, row: u16) -> Option<(f32, f32)> {
        let area = self.field_area;
        if area.width == 0
            || area.height == 0
            || !area.contains(ratatui::layout::Position { x: column, y: row })
        {
            return None;
        }

        let fx = (column - area.x) as f32 / area.width as f32 * bounds.width;
        let fy = (1.0 - (row - area.y) as f32 / area.height as f32) * bounds.height;
        Some((fx, fy))
    }
}

pub fn render(frame: &mut Frame, state: &mut TuiState, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], view);
    render_field(frame, chunks[1], state, view);
    render_help(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default()
        .title(format!(" Tandem ({} peer) ", view.role))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = format!(
        "Score: {}  |  Coins: {}  |  Motion: {}  |  Detection: {}",
        view.score,
        view.alive,
        on_off(view.simulate),
        on_off(view.detect),
    );

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_field(frame: &mut Frame, area: Rect, state: &mut TuiState, view: &View) {
    let block = Block::default()
        .title(" Field ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    state.field_area = block.inner(area);

    let coin_points: Vec<(f64, f64)> = view
        .renderables
        .iter()
        .filter(|r| r.sprite == SpriteKind::Coin && r.alive)
        .map(|r| (r.position.x as f64, r.position.y as f64))
        .collect();
    let player = view
        .renderables
        .iter()
        .find(|r| r.sprite == SpriteKind::Player)
        .map(|r| (r.position.x as f64, r.position.y as f64));

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Dot)
        .x_bounds([0.0, view.bounds.width as f64])
        .y_bounds([0.0, view.bounds.height as f64])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &coin_points,
                color: Color::Yellow,
            });
            if let Some((x, y)) = player {
                ctx.print(x, y, "@");
            }
        });

    frame.render_widget(canvas, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new(
        "Left click: start coins  |  Right click: arm collision detection  |  q / ESC: quit",
    )
    .block(block)
    .style(Style::default().fg(Color::Gray));

    frame.render_widget(text, area);
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_area(x: u16, y: u16, width: u16, height: u16) -> TuiState {
        TuiState {
            field_area: Rect {
                x,
                y,
                width,
                height,
            },
        }
    }

    #[test]
    fn outside_the_field_maps_to_nothing() {
        let state = state_with_area(1, 1, 80, 20);
        assert!(state.field_coords(FieldBounds::default(), 0, 0).is_none());
        assert!(state.field_coords(FieldBounds::default(), 100, 5).is_none());
    }

    #[test]
    fn origin_cell_maps_to_top_left_of_the_field() {
        let state = state_with_area(0, 0, 80, 20);

        let (x, y) = state.field_coords(FieldBounds::default(), 0, 0).unwrap();
        assert_eq!(x, 0.0);
        assert_eq!(y, 600.0);
    }

    #[test]
    fn rows_invert_onto_the_field_y_axis() {
        let state = state_with_area(0, 0, 80, 20);

        let (_, y_top) = state.field_coords(FieldBounds::default(), 10, 0).unwrap();
        let (_, y_low) = state.field_coords(FieldBounds::default(), 10, 19).unwrap();
        assert!(y_top > y_low);
        assert!(y_low > 0.0);
    }
}
