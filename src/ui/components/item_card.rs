use crate::api::Item;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Rows a card occupies: border, name, two description lines, date, border
pub const CARD_HEIGHT: u16 = 6;

/// One item rendered as a bordered card
pub struct ItemCard<'a> {
  item: &'a Item,
  selected: bool,
}

impl<'a> ItemCard<'a> {
  pub fn new(item: &'a Item) -> Self {
    Self {
      item,
      selected: false,
    }
  }

  pub fn selected(mut self, selected: bool) -> Self {
    self.selected = selected;
    self
  }
}

impl Widget for ItemCard<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let border = if self.selected {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Name
        Constraint::Min(0),    // Description
        Constraint::Length(1), // Created date
      ])
      .split(inner);

    let mut name_style = Style::default().fg(Color::White).bold();
    if self.selected {
      name_style = name_style.fg(Color::Cyan);
    }
    Paragraph::new(truncate(&self.item.name, inner.width as usize))
      .style(name_style)
      .render(chunks[0], buf);

    // An empty description counts as absent
    if let Some(description) = self.item.description.as_deref().filter(|d| !d.is_empty()) {
      Paragraph::new(description)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray))
        .render(chunks[1], buf);
    }

    Paragraph::new(format!("Created: {}", self.item.created_date()))
      .style(Style::default().fg(Color::DarkGray))
      .render(chunks[2], buf);
  }
}
