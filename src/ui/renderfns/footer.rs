use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with view breadcrumb and key hints
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], shortcuts: &[ShortcutInfo]) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);

  for shortcut in sorted {
    spans.push(Span::raw("   "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::renderfns::buffer_text;
  use ratatui::backend::TestBackend;

  #[test]
  fn test_footer_orders_shortcuts_by_priority() {
    let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
    let breadcrumb = vec!["Items".to_string(), "Item 1".to_string()];
    let shortcuts = vec![
      ShortcutInfo::new("q", "back").with_priority(30),
      ShortcutInfo::new("r", "refresh").with_priority(10),
    ];
    terminal
      .draw(|frame| draw_footer(frame, frame.area(), &breadcrumb, &shortcuts))
      .unwrap();

    let text = buffer_text(terminal.backend().buffer());
    assert!(text.contains("Items > Item 1"));
    let refresh = text.find("<r> refresh").unwrap();
    let back = text.find("<q> back").unwrap();
    assert!(refresh < back);
  }
}
