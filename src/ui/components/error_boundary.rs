use super::KeyResult;
use crate::ui::renderfns::centered_rows;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph, Wrap};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Catches failures from the views it wraps and shows them instead.
///
/// A panic during render, or an error reported via `capture`, switches the
/// boundary into its fallback screen until the user asks to try again.
#[derive(Debug, Default)]
pub struct ErrorBoundary {
  error: Option<String>,
}

impl ErrorBoundary {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn has_error(&self) -> bool {
    self.error.is_some()
  }

  /// Switch to the fallback screen with `message`
  pub fn capture(&mut self, message: impl Into<String>) {
    let message = message.into();
    tracing::error!(%message, "Error boundary caught a failure");
    self.error = Some(message);
  }

  pub fn reset(&mut self) {
    self.error = None;
  }

  /// Run `f`, capturing a panic instead of unwinding further.
  ///
  /// Returns `None` if `f` panicked.
  pub fn guard<R>(&mut self, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
      Ok(value) => Some(value),
      Err(payload) => {
        self.capture(panic_message(payload.as_ref()));
        None
      }
    }
  }

  /// Run `render`, falling back to the error screen if it panics
  pub fn render_guarded<F>(&mut self, frame: &mut Frame, area: Rect, render: F)
  where
    F: FnOnce(&mut Frame, Rect),
  {
    if self.error.is_none() && self.guard(|| render(frame, area)).is_some() {
      return;
    }
    self.render_fallback(frame, area);
  }

  /// `Enter` or `r` on the fallback screen asks for a reset
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<()> {
    if self.error.is_none() {
      return KeyResult::NotHandled;
    }
    match key.code {
      KeyCode::Enter | KeyCode::Char('r') => {
        self.reset();
        KeyResult::Event(())
      }
      _ => KeyResult::NotHandled,
    }
  }

  fn render_fallback(&self, frame: &mut Frame, area: Rect) {
    let message = self.error().unwrap_or_default();
    frame.render_widget(Clear, area);

    let lines = vec![
      Line::styled(
        "Something went wrong",
        Style::default().fg(Color::Red).bold(),
      ),
      Line::raw(""),
      Line::styled(message, Style::default().fg(Color::DarkGray)),
      Line::raw(""),
      Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Cyan)),
        Span::raw(" Try again"),
      ]),
    ];
    let paragraph = Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_rows(area, 7));
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "Unknown rendering error".to_string()
  }
}
