use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub const TITLE: &str = "DevOps Path";
pub const SUBTITLE: &str = "Items Dashboard";

/// Draw the static header bar: app title on the left, subtitle on the right
pub fn draw_header(frame: &mut Frame, area: Rect) {
  let title = Line::from(vec![
    Span::raw(" "),
    Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
  ]);
  let subtitle = Line::from(vec![
    Span::styled(SUBTITLE, Style::default().fg(Color::DarkGray)),
    Span::raw(" "),
  ]);

  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Min(0),
      Constraint::Length(subtitle.width() as u16),
    ])
    .split(area);

  let style = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(title).style(style), chunks[0]);
  frame.render_widget(Paragraph::new(subtitle).style(style), chunks[1]);
}
