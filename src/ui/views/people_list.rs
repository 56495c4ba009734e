use crate::cache::{CacheLayer, CacheResult};
use crate::query::{InfiniteQuery, QueryState};
use crate::swapi::{Homeworld, PeoplePage, Person, SwapiQueryKey, SwapiSource};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::sentinel::{ListViewport, ScrollSentinel};
use crate::ui::toggles::{HomeworldToggles, RowState, ToggleOutcome};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::HomeworldDetailView;
use color_eyre::{Report, Result};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Completion message from a homeworld fetch task
#[derive(Debug)]
struct HomeworldFetched {
  name: String,
  result: Result<(), String>,
}

/// Infinite list of people with on-demand homeworlds
pub struct PeopleListView<S: SwapiSource> {
  swapi: S,
  cache: CacheLayer,

  // Data query
  people: InfiniteQuery<PeoplePage>,
  /// Bumped whenever the query is replaced, so the sentinel re-observes
  generation: u64,

  // UI state, rebuilt on remount
  toggles: HomeworldToggles,
  sentinel: ScrollSentinel,
  list_state: ListState,
  viewport: ListViewport,
  homeworld_tx: mpsc::UnboundedSender<HomeworldFetched>,
  homeworld_rx: mpsc::UnboundedReceiver<HomeworldFetched>,
}

fn people_query<S: SwapiSource>(swapi: &S, stale_time: Duration) -> InfiniteQuery<PeoplePage> {
  let swapi = swapi.clone();
  InfiniteQuery::new(
    1,
    move |page| {
      let swapi = swapi.clone();
      async move { swapi.people_page(page).await.map_err(|e| e.to_string()) }
    },
    |page: &PeoplePage| page.next_cursor(),
  )
  .with_stale_time(stale_time)
}

impl<S: SwapiSource> PeopleListView<S> {
  pub fn new(swapi: S, cache: CacheLayer, people_stale_time: Duration) -> Self {
    let mut people = people_query(&swapi, people_stale_time);

    // Start fetching immediately
    people.fetch();

    let (homeworld_tx, homeworld_rx) = mpsc::unbounded_channel();

    Self {
      swapi,
      cache,
      people,
      generation: 0,
      toggles: HomeworldToggles::new(),
      sentinel: ScrollSentinel::new(),
      list_state: ListState::default(),
      viewport: ListViewport::default(),
      homeworld_tx,
      homeworld_rx,
    }
  }

  fn people(&self) -> impl Iterator<Item = &Person> {
    self.people.items(|page| page.results.as_slice())
  }

  fn row_count(&self) -> usize {
    self.people.pages().iter().map(|page| page.results.len()).sum()
  }

  fn selected_person(&self) -> Option<&Person> {
    let idx = self.list_state.selected()?;
    self.people().nth(idx)
  }

  /// Homeworld for display, whether or not it is still fresh
  fn cached_homeworld(&self, person: &Person) -> Option<Homeworld> {
    let key = SwapiQueryKey::homeworld(&person.homeworld, &person.name);
    self.cache.peek(&key).unwrap_or_else(|e| {
      warn!(error = %e, "unreadable cache entry");
      None
    })
  }

  fn toggle_selected(&mut self) {
    let Some(person) = self.selected_person().cloned() else {
      return;
    };
    let key = SwapiQueryKey::homeworld(&person.homeworld, &person.name);
    let cached = match self.cache.get::<Homeworld>(&key) {
      Ok(value) => value.is_some(),
      Err(e) => {
        warn!(error = %e, "unreadable cache entry");
        false
      }
    };

    let outcome = self.toggles.toggle(&person.name, cached);
    debug!(name = %person.name, ?outcome, "toggled homeworld");
    if outcome == ToggleOutcome::Fetch {
      self.spawn_homeworld_fetch(person, key);
    }
  }

  fn spawn_homeworld_fetch(&self, person: Person, key: SwapiQueryKey) {
    let swapi = self.swapi.clone();
    let cache = self.cache.clone();
    let tx = self.homeworld_tx.clone();

    tokio::spawn(async move {
      let fetched: Result<CacheResult<Homeworld>> = cache
        .fetch_one(&key, || async {
          Ok::<_, Report>(swapi.homeworld(&person.homeworld).await?)
        })
        .await;
      let result = match fetched {
        Ok(done) => {
          debug!(
            name = %person.name,
            homeworld = %done.data.name,
            source = ?done.source,
            "homeworld ready"
          );
          Ok(())
        }
        Err(e) => Err(e.to_string()),
      };
      // Ignore send errors - the view may have been remounted or closed
      let _ = tx.send(HomeworldFetched {
        name: person.name,
        result,
      });
    });
  }

  fn poll_homeworlds(&mut self) {
    while let Ok(fetched) = self.homeworld_rx.try_recv() {
      match fetched.result {
        Ok(()) => {
          self.toggles.finish(&fetched.name, true);
        }
        Err(e) => {
          warn!(name = %fetched.name, error = %e, "failed to load homeworld");
          self.toggles.finish(&fetched.name, false);
        }
      }
    }
  }

  fn poll_people(&mut self) {
    if !self.people.poll() {
      return;
    }
    let state = self.people.state();
    if state.is_success() {
      debug!(
        pages = self.people.pages().len(),
        has_next = self.people.has_next_page(),
        previous = ?self.people.pages().last().and_then(PeoplePage::previous_cursor),
        "people page loaded"
      );
    } else if let QueryState::Error(e) = state {
      warn!(error = %e, "failed to load people");
    }
  }

  /// Rebuild view-local state as if the list were opened anew.
  ///
  /// Pages are refetched only when stale or failed; the homeworld cache is
  /// kept.
  fn remount(&mut self) {
    self.toggles.clear();
    self.sentinel.reset();
    self.list_state = ListState::default();
    self.viewport = ListViewport::default();

    // Results of fetches started before the remount are dropped
    let (tx, rx) = mpsc::unbounded_channel();
    self.homeworld_tx = tx;
    self.homeworld_rx = rx;

    if self.people.is_stale() || self.people.is_error() {
      debug!("refetching people");
      self.people.refetch();
    }
    self.generation += 1;
  }

  fn move_selection(&mut self, delta: i64) {
    let len = self.row_count();
    if len == 0 {
      return;
    }
    let current = self.list_state.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1);
    self.list_state.select(Some(next as usize));
  }

  fn page_step(&self) -> i64 {
    self.viewport.height.max(1) as i64
  }

  fn detail_for_selected(&self) -> Option<HomeworldDetailView> {
    let person = self.selected_person()?;
    if self.toggles.state(&person.name) != RowState::Expanded {
      return None;
    }
    let homeworld = self.cached_homeworld(person)?;
    Some(HomeworldDetailView::new(person.name.clone(), homeworld))
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let rows = self.row_count();
    ensure_valid_selection(&mut self.list_state, rows);

    let title = if self.people.is_loading() {
      " Characters (loading...) ".to_string()
    } else if rows == 0 && self.people.is_error() {
      " Characters (error) ".to_string()
    } else {
      match self.people.pages().first().map(|page| page.count) {
        Some(count) if count > 0 => format!(" Characters ({} of {}) ", rows, count),
        _ => format!(" Characters ({}) ", rows),
      }
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.people.is_loading() {
      self.viewport = ListViewport::default();
      let inner = block.inner(area);
      frame.render_widget(block, area);
      let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
      ])
      .areas(inner);
      let paragraph = Paragraph::new("Loading Characters...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Blue));
      frame.render_widget(paragraph, middle);
      return;
    }

    if rows == 0 {
      self.viewport = ListViewport::default();
      let content = match self.people.error() {
        Some(e) => format!("Failed to load characters: {}\n\nPress 'r' to retry.", e),
        None => "No characters found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let mut item_heights = Vec::with_capacity(rows + 1);
    let mut items: Vec<ListItem> = Vec::with_capacity(rows + 1);
    for person in self.people() {
      let state = self.toggles.state(&person.name);
      let glyph = match state {
        RowState::Collapsed => "[+]",
        RowState::LoadingHomeworld => "[…]",
        RowState::Expanded => "[-]",
      };

      let mut lines = vec![Line::from(vec![
        Span::styled(glyph, Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(
          truncate(&person.name, 60),
          Style::default().add_modifier(Modifier::BOLD),
        ),
      ])];
      if state == RowState::Expanded {
        if let Some(homeworld) = self.cached_homeworld(person) {
          lines.push(Line::styled(
            format!("    Homeworld: {}", homeworld.name),
            Style::default().fg(Color::Gray),
          ));
        }
      }

      item_heights.push(lines.len());
      items.push(ListItem::new(lines));
    }

    // Sentinel row
    let marker = if self.people.is_fetching_next_page() {
      Line::styled("Loading more...", Style::default().fg(Color::Yellow))
    } else if self.people.has_next_page() {
      Line::styled("···", Style::default().fg(Color::DarkGray))
    } else if let Some(e) = self.people.error() {
      Line::styled(
        format!("Failed to load more: {}", e),
        Style::default().fg(Color::Red),
      )
    } else {
      Line::styled("End of list", Style::default().fg(Color::DarkGray))
    };
    item_heights.push(1);
    items.push(ListItem::new(marker));

    let height = block.inner(area).height as usize;
    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ")
      .scroll_padding(1);

    frame.render_stateful_widget(list, area, &mut self.list_state);

    self.viewport = ListViewport {
      offset: self.list_state.offset(),
      item_heights,
      height,
    };
  }
}

impl<S: SwapiSource> View for PeopleListView<S> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::PageDown => self.move_selection(self.page_step()),
      KeyCode::PageUp => self.move_selection(-self.page_step()),
      KeyCode::Char('g') | KeyCode::Home => self.move_selection(i64::MIN / 2),
      KeyCode::Char('G') | KeyCode::End => self.move_selection(i64::MAX / 2),
      KeyCode::Char(' ') | KeyCode::Char('o') => self.toggle_selected(),
      KeyCode::Enter => {
        if let Some(detail) = self.detail_for_selected() {
          return ViewAction::Push(Box::new(detail));
        }
      }
      KeyCode::Char('r') => self.remount(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Characters".to_string()
  }

  fn tick(&mut self) {
    self.poll_people();
    self.poll_homeworlds();

    self.sentinel.sync(
      self.generation,
      self.people.has_next_page(),
      self.people.is_fetching(),
    );
    let marker = self.row_count();
    if self.sentinel.check(&self.viewport, marker) && self.people.fetch_next_page() {
      debug!("fetching next people page");
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("space", "homeworld").with_priority(10),
      ShortcutInfo::new("enter", "details").with_priority(20),
      ShortcutInfo::new("r", "reload").with_priority(30),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
