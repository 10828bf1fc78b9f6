use crate::api::{CreateItemRequest, Item, ItemsService};
use crate::items_query::{use_items, ItemsSource};
use crate::query::{Query, QueryClient};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Name,
  Description,
}

/// Form for submitting a new item
pub struct CreateItemView {
  queries: QueryClient,
  service: ItemsService,
  name: TextInput,
  description: TextInput,
  focus: Field,
  submission: Option<Query<Item>>,
}

impl CreateItemView {
  pub fn new(queries: &QueryClient, service: ItemsService) -> Self {
    Self {
      queries: queries.clone(),
      service,
      name: TextInput::new(),
      description: TextInput::new(),
      focus: Field::Name,
      submission: None,
    }
  }

  fn is_submitting(&self) -> bool {
    self.submission.as_ref().is_some_and(|q| q.is_loading())
  }

  fn request(&self) -> CreateItemRequest {
    let description = self.description.value().trim();
    CreateItemRequest {
      name: self.name.value().trim().to_string(),
      description: (!description.is_empty()).then(|| description.to_string()),
    }
  }

  fn submit(&mut self) {
    if self.is_submitting() {
      return;
    }
    let request = self.request();
    let service = self.service.clone();
    let mut query = Query::new(move || {
      let service = service.clone();
      let request = request.clone();
      async move { service.create(&request).await.map_err(|e| e.to_string()) }
    });
    query.fetch();
    self.submission = Some(query);
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      Field::Name => Field::Description,
      Field::Description => Field::Name,
    };
  }

  fn render_field(&self, frame: &mut Frame, area: Rect, field: Field, title: &str) {
    let focused = self.focus == field;
    let input = match field {
      Field::Name => &self.name,
      Field::Description => &self.description,
    };
    let border = if focused {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
      .title(format!(" {} ", title))
      .borders(Borders::ALL)
      .border_style(border);
    frame.render_widget(Paragraph::new(input.to_line(focused)).block(block), area);
  }
}

impl View for CreateItemView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.toggle_focus();
        return ViewAction::None;
      }
      KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }

    let input = match self.focus {
      Field::Name => &mut self.name,
      Field::Description => &mut self.description,
    };
    match input.handle_key(key) {
      InputResult::Submitted(_) => self.submit(),
      InputResult::Cancelled => return ViewAction::Pop,
      InputResult::Consumed | InputResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" New item ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3), // Name
        Constraint::Length(3), // Description
        Constraint::Length(1), // Spacer
        Constraint::Min(1),    // Status
      ])
      .split(inner);

    self.render_field(frame, chunks[0], Field::Name, "Name");
    self.render_field(frame, chunks[1], Field::Description, "Description (optional)");

    let status = match &self.submission {
      Some(q) if q.is_loading() => {
        Paragraph::new("Creating item...").style(Style::default().fg(Color::DarkGray))
      }
      Some(q) => match q.error() {
        Some(error) => Paragraph::new(format!("Error: {}", error))
          .style(Style::default().fg(Color::Red))
          .wrap(Wrap { trim: true }),
        None => Paragraph::new(""),
      },
      None => Paragraph::new(""),
    };
    frame.render_widget(status, chunks[3]);
  }

  fn breadcrumb_label(&self) -> String {
    "New item".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    let Some(query) = self.submission.as_mut() else {
      return ViewAction::None;
    };
    query.poll();

    if query.is_success() {
      let mut items = use_items(&self.queries, &self.service);
      items.refresh();
      return ViewAction::Pop;
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "create").with_priority(10),
      ShortcutInfo::new("tab", "next field").with_priority(20),
      ShortcutInfo::new("esc", "cancel").with_priority(90),
    ]
  }
}
