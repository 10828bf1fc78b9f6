#[cfg(test)]
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// A full-width band of `height` rows centred vertically in `area`
pub fn centered_rows(area: Rect, height: u16) -> Rect {
  let height = height.min(area.height);
  Rect {
    x: area.x,
    y: area.y + (area.height - height) / 2,
    width: area.width,
    height,
  }
}

/// Buffer contents as text, one line per row
#[cfg(test)]
pub fn buffer_text(buffer: &Buffer) -> String {
  let width = buffer.area.width.max(1) as usize;
  buffer
    .content()
    .chunks(width)
    .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
    .collect::<Vec<_>>()
    .join("\n")
}
