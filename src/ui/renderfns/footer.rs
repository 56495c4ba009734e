use super::truncate;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const CRUMB_MAX: usize = 32;

/// Draw the footer: the view stack as a breadcrumb, and the global quit key
/// pinned to the right.
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String]) {
  let last = breadcrumb.len().saturating_sub(1);
  let separator = Span::styled(" > ", Style::default().fg(Color::DarkGray));

  let mut spans = vec![Span::raw(" ")];
  for (i, label) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(separator.clone());
    }
    let style = if i == last {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(truncate(label, CRUMB_MAX), style));
  }

  let hint = Line::from(vec![
    Span::styled("ctrl-c", Style::default().fg(Color::Yellow)),
    Span::styled(" quit ", Style::default().fg(Color::DarkGray)),
  ]);
  let [crumbs, keys] = Layout::horizontal([
    Constraint::Fill(1),
    Constraint::Length(hint.width() as u16),
  ])
  .areas(area);

  let background = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(background), crumbs);
  frame.render_widget(Paragraph::new(hint).style(background), keys);
}
