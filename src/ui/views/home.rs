use super::item_list::{ItemList, ItemListEvent};
use super::{CreateItemView, ItemDetailView};
use crate::api::ItemsService;
use crate::items_query::{use_items, ItemsQuery};
use crate::query::QueryClient;
use crate::ui::components::KeyResult;
use crate::ui::renderfns::draw_header;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

/// Root view: header above the item grid
pub struct HomeView {
  queries: QueryClient,
  service: ItemsService,
  list: ItemList<ItemsQuery>,
}

impl HomeView {
  pub fn new(queries: &QueryClient, service: ItemsService) -> Self {
    let items = use_items(queries, &service);
    Self {
      queries: queries.clone(),
      service,
      list: ItemList::new(items),
    }
  }
}

impl View for HomeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.list.handle_key(key) {
      KeyResult::Event(ItemListEvent::Open(item)) => {
        return ViewAction::Push(Box::new(ItemDetailView::new(
          &self.queries,
          self.service.clone(),
          &item,
        )));
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('n') => {
        ViewAction::Push(Box::new(CreateItemView::new(&self.queries, self.service.clone())))
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Spacer
        Constraint::Min(0),    // Items
      ])
      .split(area);

    draw_header(frame, chunks[0]);

    let main = chunks[2].inner(Margin {
      horizontal: 1,
      vertical: 0,
    });
    self.list.render(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    "Items".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.list.tick();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "open").with_priority(10),
      ShortcutInfo::new("n", "new").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{test_server, ApiClient};
  use crate::config::Config;
  use crate::items_query::ItemsSource;
  use crate::ui::renderfns::buffer_text;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn home_with(names: &[&str]) -> (test_server::TestServer, HomeView) {
    let server = test_server::spawn().await;
    for name in names {
      server.seed(name, None).await;
    }
    let config = Config::default().with_api_url(Some(server.base_url.clone()));
    let service = ItemsService::new(ApiClient::new(&config).unwrap());
    let mut home = HomeView::new(&QueryClient::new(), service);

    for _ in 0..50 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      home.tick();
      if !home.list.source().is_loading() {
        break;
      }
    }
    (server, home)
  }

  fn render(home: &mut HomeView) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|frame| home.render(frame, frame.area())).unwrap();
    buffer_text(terminal.backend().buffer())
  }

  #[tokio::test]
  async fn test_composes_header_and_list() {
    let (_server, mut home) = home_with(&["Item One", "Item Two"]).await;
    let text = render(&mut home);

    assert!(text.contains("DevOps Path"));
    assert!(text.contains("Items Dashboard"));
    assert!(text.contains("2 item(s)"));
    assert!(text.contains("Item One"));
    assert!(text.contains("Item Two"));
  }

  #[tokio::test]
  async fn test_enter_pushes_detail_and_n_pushes_form() {
    let (_server, mut home) = home_with(&["Item One"]).await;
    render(&mut home);

    match home.handle_key(key(KeyCode::Enter)) {
      ViewAction::Push(view) => assert_eq!(view.breadcrumb_label(), "Item One"),
      _ => panic!("expected detail view"),
    }
    match home.handle_key(key(KeyCode::Char('n'))) {
      ViewAction::Push(view) => assert_eq!(view.breadcrumb_label(), "New item"),
      _ => panic!("expected create form"),
    }
    assert!(matches!(home.handle_key(key(KeyCode::Char('q'))), ViewAction::Pop));
  }
}
