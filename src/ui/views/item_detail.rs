use crate::api::types::format_date;
use crate::api::{Item, ItemsService};
use crate::query::{Query, QueryClient, QueryState};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// View for displaying a single item fetched by id
pub struct ItemDetailView {
  name: String,
  key: String,
  queries: QueryClient,
  query: Query<Item>,
}

impl ItemDetailView {
  pub fn new(queries: &QueryClient, service: ItemsService, item: &Item) -> Self {
    let id = item.id.clone();
    let key = format!("/items/{}", item.id);
    let mut query = queries.query(key.as_str(), move || {
      let service = service.clone();
      let id = id.clone();
      async move { service.get_by_id(&id).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.mount();

    Self {
      name: item.name.clone(),
      key,
      queries: queries.clone(),
      query,
    }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", self.name),
      _ => format!(" {} ", self.name),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if self.query.is_loading() {
      let paragraph =
        Paragraph::new("Loading item...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    }

    if let Some(error) = self.query.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
      frame.render_widget(paragraph, inner);
      return;
    }

    let item = match self.query.data() {
      Some(item) => item,
      None => return,
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(4), // Fields
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    let label = Style::default().fg(Color::DarkGray);
    let fields = vec![
      Line::from(vec![Span::styled("ID:      ", label), Span::raw(&item.id)]),
      Line::from(vec![
        Span::styled("Name:    ", label),
        Span::styled(&item.name, Style::default().bold()),
      ]),
      Line::from(vec![
        Span::styled("Created: ", label),
        Span::raw(format_date(&item.created_at)),
      ]),
      Line::from(vec![
        Span::styled("Updated: ", label),
        Span::raw(format_date(&item.updated_at)),
      ]),
    ];
    frame.render_widget(Paragraph::new(fields), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize)).style(label);
    frame.render_widget(sep, chunks[1]);

    let description = item
      .description
      .as_deref()
      .filter(|d| !d.is_empty())
      .unwrap_or("No description");
    let description = Paragraph::new(description).wrap(Wrap { trim: true });
    frame.render_widget(description, chunks[2]);
  }
}

impl Drop for ItemDetailView {
  // One entry per visited id would otherwise pile up in the client
  fn drop(&mut self) {
    self.queries.remove(&self.key);
  }
}

impl View for ItemDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.name.clone()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{test_server, ApiClient};
  use crate::config::Config;
  use crate::ui::renderfns::buffer_text;
  use ratatui::backend::TestBackend;
  use std::time::Duration;

  async fn settle(view: &mut ItemDetailView) {
    for _ in 0..50 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      view.tick();
      if !view.query.is_loading() {
        return;
      }
    }
  }

  fn render(view: &mut ItemDetailView) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
    terminal.draw(|frame| view.render(frame, frame.area())).unwrap();
    buffer_text(terminal.backend().buffer())
  }

  fn service_for(server: &test_server::TestServer) -> ItemsService {
    let config = Config::default().with_api_url(Some(server.base_url.clone()));
    ItemsService::new(ApiClient::new(&config).unwrap())
  }

  #[tokio::test]
  async fn test_shows_fetched_item() {
    let server = test_server::spawn().await;
    let item = server.seed("Fetch Me", Some("Loaded by id")).await;

    let mut view = ItemDetailView::new(&QueryClient::new(), service_for(&server), &item);
    assert!(render(&mut view).contains("Fetch Me (loading...)"));

    settle(&mut view).await;
    let text = render(&mut view);
    assert!(text.contains("Fetch Me"));
    assert!(text.contains(&format!("ID:      {}", item.id)));
    assert!(text.contains("Loaded by id"));
  }

  #[tokio::test]
  async fn test_empty_description_reads_as_missing() {
    let server = test_server::spawn().await;
    let item = server.seed("Blank", Some("")).await;

    let mut view = ItemDetailView::new(&QueryClient::new(), service_for(&server), &item);
    settle(&mut view).await;

    let text = render(&mut view);
    assert!(text.contains("Name:    Blank"));
    assert!(text.contains("No description"));
  }

  #[tokio::test]
  async fn test_closing_evicts_cache_entry() {
    let server = test_server::spawn().await;
    let item = server.seed("Short lived", None).await;
    let queries = QueryClient::new();

    let mut view = ItemDetailView::new(&queries, service_for(&server), &item);
    settle(&mut view).await;
    let key = format!("/items/{}", item.id);
    assert!(queries.contains_key(&key));

    drop(view);
    assert!(!queries.contains_key(&key));
  }

  #[tokio::test]
  async fn test_shows_error_for_unknown_item() {
    let server = test_server::spawn().await;
    let ghost = Item {
      id: "404".to_string(),
      name: "Ghost".to_string(),
      description: None,
      created_at: String::new(),
      updated_at: String::new(),
    };

    let mut view = ItemDetailView::new(&QueryClient::new(), service_for(&server), &ghost);
    settle(&mut view).await;

    let text = render(&mut view);
    assert!(text.contains("Error:"));
    assert!(text.contains("Press 'r' to retry."));
  }
}
