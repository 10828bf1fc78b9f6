use crate::api::{ApiClient, ItemsService};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::query::QueryClient;
use crate::ui::components::{ErrorBoundary, KeyResult};
use crate::ui::renderfns::draw_footer;
use crate::ui::views::HomeView;
use crate::ui::{ShortcutInfo, View, ViewAction};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::panic;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(250);

type PanicHook = Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Raw mode, the alternate screen and a log-only panic hook, all undone on
/// drop, including when a panic unwinds out of the event loop.
struct TerminalSession {
  previous_hook: Option<PanicHook>,
}

impl TerminalSession {
  fn enter() -> Result<Self> {
    let mut session = Self {
      previous_hook: None,
    };
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    // Panics caught by the error boundary would otherwise print over the UI
    session.previous_hook = Some(panic::take_hook());
    panic::set_hook(Box::new(|info| {
      tracing::error!(%info, "Panic in UI thread");
    }));
    Ok(session)
  }
}

impl Drop for TerminalSession {
  fn drop(&mut self) {
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);

    if std::thread::panicking() {
      // The hook cannot be swapped mid-panic; the process is going down anyway
      eprintln!(
        "items-dash crashed; details are in {}",
        crate::logging::log_dir().display()
      );
      return;
    }
    if let Some(hook) = self.previous_hook.take() {
      let _ = panic::take_hook();
      panic::set_hook(hook);
    }
  }
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Wraps everything the views do
  boundary: ErrorBoundary,

  queries: QueryClient,
  service: ItemsService,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let service = ItemsService::new(ApiClient::new(config)?);
    let queries = QueryClient::new().with_refresh_interval(config.refresh_interval());
    let home = HomeView::new(&queries, service.clone());

    Ok(Self {
      view_stack: vec![Box::new(home)],
      boundary: ErrorBoundary::new(),
      queries,
      service,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Restores the terminal on every way out, unwinding included
    let _session = TerminalSession::enter()?;
    self.event_loop().await
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);
    tracing::info!(base_url = %self.service.base_url(), "Dashboard started");

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    tracing::info!("Dashboard stopped");
    Ok(())
  }

  pub fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let breadcrumb: Vec<String> = self.view_stack.iter().map(|v| v.breadcrumb_label()).collect();

    if let Some(view) = self.view_stack.last_mut() {
      self
        .boundary
        .render_guarded(frame, chunks[0], |frame, area| view.render(frame, area));
    }

    // After the content, so a render failure shows the fallback's hints
    let shortcuts = self.shortcuts();
    draw_footer(frame, chunks[1], &breadcrumb, &shortcuts);
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.boundary.has_error() {
      return vec![
        ShortcutInfo::new("enter", "try again").with_priority(10),
        ShortcutInfo::new("q", "quit").with_priority(90),
      ];
    }
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {} // Next draw picks up the new size
      Event::Tick => self.tick(),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.boundary.has_error() {
      match self.boundary.handle_key(key) {
        KeyResult::Event(()) => self.reset_views(),
        _ if key.code == KeyCode::Char('q') => self.should_quit = true,
        _ => {}
      }
      return;
    }

    let Some(view) = self.view_stack.last_mut() else {
      return;
    };
    if let Some(action) = self.boundary.guard(|| view.handle_key(key)) {
      self.apply(action);
    }
  }

  fn tick(&mut self) {
    if self.boundary.has_error() {
      return;
    }
    let Some(view) = self.view_stack.last_mut() else {
      return;
    };
    if let Some(action) = self.boundary.guard(|| view.tick()) {
      self.apply(action);
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        tracing::debug!(view = %view.breadcrumb_label(), "Pushing view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  /// Back to a fresh home view after the error screen
  fn reset_views(&mut self) {
    tracing::info!("Resetting views after error");
    self.view_stack = vec![Box::new(HomeView::new(&self.queries, self.service.clone()))];
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::test_server;
  use crate::ui::renderfns::buffer_text;
  use ratatui::backend::TestBackend;

  struct PanickingView;

  impl View for PanickingView {
    fn handle_key(&mut self, _key: KeyEvent) -> ViewAction {
      ViewAction::None
    }

    fn render(&mut self, _frame: &mut Frame, _area: Rect) {
      panic!("render blew up");
    }

    fn breadcrumb_label(&self) -> String {
      "Broken".to_string()
    }
  }

  struct QuietView;

  impl View for QuietView {
    fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
      match key.code {
        KeyCode::Char('x') => panic!("handler blew up"),
        KeyCode::Char('q') => ViewAction::Pop,
        _ => ViewAction::None,
      }
    }

    fn render(&mut self, _frame: &mut Frame, _area: Rect) {}

    fn breadcrumb_label(&self) -> String {
      "Quiet".to_string()
    }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn app() -> (test_server::TestServer, App) {
    let server = test_server::spawn().await;
    let config = Config::default().with_api_url(Some(server.base_url.clone()));
    (server, App::new(&config).unwrap())
  }

  fn render(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    buffer_text(terminal.backend().buffer())
  }

  #[tokio::test]
  async fn test_starts_on_home() {
    let (_server, mut app) = app().await;
    let text = render(&mut app);
    assert!(text.contains("DevOps Path"));
    assert!(text.contains("Items"));
    assert!(text.contains("<q> quit"));
  }

  #[tokio::test]
  async fn test_render_panic_shows_fallback_and_resets() {
    let (_server, mut app) = app().await;
    app.view_stack.push(Box::new(PanickingView));

    let text = render(&mut app);
    assert!(text.contains("Something went wrong"));
    assert!(text.contains("render blew up"));
    assert!(text.contains("try again"));

    app.handle_key(key(KeyCode::Enter));
    assert!(!app.boundary.has_error());
    assert_eq!(app.view_stack.len(), 1);
    assert_eq!(app.view_stack[0].breadcrumb_label(), "Items");
  }

  #[tokio::test]
  async fn test_key_handler_panic_is_captured() {
    let (_server, mut app) = app().await;
    app.view_stack.push(Box::new(QuietView));

    app.handle_key(key(KeyCode::Char('x')));
    assert_eq!(app.boundary.error(), Some("handler blew up"));
    assert!(render(&mut app).contains("handler blew up"));

    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_pop_returns_then_quits_on_root() {
    let (_server, mut app) = app().await;
    app.view_stack.push(Box::new(QuietView));

    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.view_stack.len(), 1);
    assert!(!app.should_quit);

    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[test]
  fn test_session_teardown_during_panic_does_not_abort() {
    // A second panic inside drop would abort instead of unwinding to here
    let result = panic::catch_unwind(|| {
      let _session = TerminalSession {
        previous_hook: None,
      };
      panic!("loop blew up");
    });
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_ctrl_c_quits_from_anywhere() {
    let (_server, mut app) = app().await;
    app.view_stack.push(Box::new(QuietView));

    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }
}
