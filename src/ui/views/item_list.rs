use crate::api::Item;
use crate::items_query::ItemsSource;
use crate::ui::components::{ItemCard, KeyResult, CARD_HEIGHT};
use crate::ui::renderfns::centered_rows;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events the list hands up to its parent view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemListEvent {
  /// Enter on the selected card
  Open(Item),
}

/// Grid of item cards with loading, error and empty states
pub struct ItemList<S> {
  source: S,
  selected: usize,
  /// Column count from the last render, used for up/down movement
  columns: usize,
  /// First grid row on screen
  first_row: usize,
}

/// 1 column on narrow terminals, 2 on medium, 3 on wide
fn columns_for(width: u16) -> usize {
  match width {
    w if w >= 96 => 3,
    w if w >= 64 => 2,
    _ => 1,
  }
}

impl<S: ItemsSource> ItemList<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      selected: 0,
      columns: 1,
      first_row: 0,
    }
  }

  #[cfg(test)]
  pub fn source(&self) -> &S {
    &self.source
  }

  pub fn selected_item(&self) -> Option<&Item> {
    self.source.items().get(self.selected)
  }

  /// Poll the source; returns `true` when a redraw is due
  pub fn tick(&mut self) -> bool {
    self.source.poll()
  }

  fn has_cards(&self) -> bool {
    !self.source.is_loading() && !self.source.is_error() && !self.source.items().is_empty()
  }

  fn move_selection(&mut self, delta: isize) {
    let len = self.source.items().len();
    if len == 0 {
      return;
    }
    let target = self.selected as isize + delta;
    self.selected = target.clamp(0, len as isize - 1) as usize;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ItemListEvent> {
    if key.code == KeyCode::Char('r') {
      self.source.refresh();
      return KeyResult::Handled;
    }

    if !self.has_cards() {
      return KeyResult::NotHandled;
    }

    let columns = self.columns as isize;
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1),
      KeyCode::Right | KeyCode::Char('l') => self.move_selection(1),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-columns),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(columns),
      KeyCode::Enter => {
        return match self.selected_item() {
          Some(item) => KeyResult::Event(ItemListEvent::Open(item.clone())),
          None => KeyResult::Handled,
        };
      }
      _ => return KeyResult::NotHandled,
    }
    KeyResult::Handled
  }

  pub fn render(&mut self, frame: &mut Frame, area: Rect) {
    if self.source.is_loading() {
      render_message(frame, area, vec![Line::styled(
        "Loading items...",
        Style::default().fg(Color::DarkGray),
      )]);
      return;
    }

    if self.source.is_error() {
      let detail = self.source.error().unwrap_or_default().to_string();
      render_message(frame, area, vec![
        Line::styled("Failed to load items.", Style::default().fg(Color::Red)),
        Line::styled(detail, Style::default().fg(Color::DarkGray)),
        Line::raw(""),
        Line::from(vec![
          Span::styled("[r]", Style::default().fg(Color::Cyan)),
          Span::raw(" Retry"),
        ]),
      ]);
      return;
    }

    if self.source.items().is_empty() {
      render_message(frame, area, vec![Line::styled(
        "No items found.",
        Style::default().fg(Color::DarkGray),
      )]);
      return;
    }

    self.render_grid(frame, area);
  }

  fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Count
        Constraint::Length(1), // Spacer
        Constraint::Min(0),    // Cards
      ])
      .split(area);

    let mut count = vec![Span::raw(format!("{} item(s)", self.source.total()))];
    if self.source.is_validating() {
      count.push(Span::styled("  refreshing...", Style::default().italic()));
    }
    let count = Paragraph::new(Line::from(count)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(count, chunks[0]);

    let grid = chunks[2];
    let items = self.source.items();
    let columns = columns_for(grid.width);
    let visible_rows = (grid.height / CARD_HEIGHT).max(1) as usize;

    self.columns = columns;
    self.selected = self.selected.min(items.len() - 1);

    // Keep the selected row on screen
    let selected_row = self.selected / columns;
    if selected_row < self.first_row {
      self.first_row = selected_row;
    } else if selected_row >= self.first_row + visible_rows {
      self.first_row = selected_row + 1 - visible_rows;
    }

    for offset in 0..visible_rows {
      let row = self.first_row + offset;
      let y = grid.y + offset as u16 * CARD_HEIGHT;
      if row * columns >= items.len() || y >= grid.bottom() {
        break;
      }
      let row_area = Rect {
        x: grid.x,
        y,
        width: grid.width,
        height: CARD_HEIGHT.min(grid.bottom() - y),
      };
      let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
        .split(row_area);

      for (col, cell) in cells.iter().enumerate() {
        let index = row * columns + col;
        if let Some(item) = items.get(index) {
          frame.render_widget(ItemCard::new(item).selected(index == self.selected), *cell);
        }
      }
    }
  }
}

fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
  let height = lines.len() as u16;
  let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
  frame.render_widget(paragraph, centered_rows(area, height));
}
