use crate::swapi::Homeworld;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde_json::Value;

/// View listing every field of a cached homeworld record
pub struct HomeworldDetailView {
  person: String,
  homeworld: Homeworld,
  scroll: u16,
}

impl HomeworldDetailView {
  pub fn new(person: String, homeworld: Homeworld) -> Self {
    Self {
      person,
      homeworld,
      scroll: 0,
    }
  }

  /// Field lines as `(key, value)`, name first then alphabetical
  fn fields(&self) -> Vec<(&str, String)> {
    let mut fields = vec![("name", self.homeworld.name.clone())];
    // serde_json::Map iterates in key order
    fields.extend(
      self
        .homeworld
        .fields
        .iter()
        .map(|(key, value)| (key.as_str(), display_value(value))),
    );
    fields
  }

  fn scroll_by(&mut self, delta: i32) {
    let max = self.fields().len().saturating_sub(1) as i32;
    self.scroll = (self.scroll as i32 + delta).clamp(0, max) as u16;
  }
}

fn display_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => "-".to_string(),
    Value::Array(items) if items.is_empty() => "-".to_string(),
    Value::Array(items) => items
      .iter()
      .map(display_value)
      .collect::<Vec<_>>()
      .join(", "),
    other => other.to_string(),
  }
}

impl View for HomeworldDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll_by(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll_by(-1);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(
        " {} (homeworld of {}) ",
        self.homeworld.name, self.person
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let fields = self.fields();
    let width = fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let lines: Vec<Line> = fields
      .into_iter()
      .map(|(key, value)| {
        Line::from(vec![
          Span::styled(
            format!("{:<width$}  ", key, width = width),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(value),
        ])
      })
      .collect();

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.homeworld.name.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "scroll").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
