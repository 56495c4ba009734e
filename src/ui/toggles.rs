use std::collections::HashMap;

/// Display state of one person's homeworld row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
  Collapsed,
  LoadingHomeworld,
  Expanded,
}

/// What the caller has to do after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
  /// Row closed; the cache is left alone
  Collapsed,
  /// Row opened from a cached homeworld
  Expanded,
  /// No cached homeworld: fetch it, then call `finish`
  Fetch,
  /// A fetch for this row is already in flight
  Ignored,
}

/// Per-person homeworld visibility, owned by the list view.
///
/// `loading` names the row whose fetch the UI treats as in flight. It is
/// advisory: opening another row while a fetch is pending moves it.
#[derive(Debug, Default)]
pub struct HomeworldToggles {
  visible: HashMap<String, bool>,
  loading: Option<String>,
}

impl HomeworldToggles {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self, name: &str) -> RowState {
    if self.loading.as_deref() == Some(name) {
      RowState::LoadingHomeworld
    } else if self.is_visible(name) {
      RowState::Expanded
    } else {
      RowState::Collapsed
    }
  }

  pub fn is_visible(&self, name: &str) -> bool {
    self.visible.get(name).copied().unwrap_or(false)
  }

  #[cfg(test)]
  pub fn loading(&self) -> Option<&str> {
    self.loading.as_deref()
  }

  /// Toggle the row for `name`. `cached` tells whether a fresh homeworld is
  /// already in the cache.
  pub fn toggle(&mut self, name: &str, cached: bool) -> ToggleOutcome {
    match self.state(name) {
      RowState::Expanded => {
        self.visible.insert(name.to_string(), false);
        ToggleOutcome::Collapsed
      }
      RowState::LoadingHomeworld => ToggleOutcome::Ignored,
      RowState::Collapsed if cached => {
        self.visible.insert(name.to_string(), true);
        ToggleOutcome::Expanded
      }
      RowState::Collapsed => {
        self.loading = Some(name.to_string());
        ToggleOutcome::Fetch
      }
    }
  }

  /// Record the end of a homeworld fetch for `name`.
  ///
  /// A successful fetch expands the row; a failed one leaves it collapsed.
  pub fn finish(&mut self, name: &str, success: bool) -> RowState {
    if self.loading.as_deref() == Some(name) {
      self.loading = None;
    }
    if success {
      self.visible.insert(name.to_string(), true);
    }
    self.state(name)
  }

  /// Forget all rows.
  pub fn clear(&mut self) {
    self.visible.clear();
    self.loading = None;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const LUKE: &str = "Luke Skywalker";
  const LEIA: &str = "Leia Organa";

  #[test]
  fn test_initial_state_is_collapsed() {
    let toggles = HomeworldToggles::new();
    assert_eq!(toggles.state(LUKE), RowState::Collapsed);
    assert_eq!(toggles.loading(), None);
  }

  #[test]
  fn test_open_without_cache_goes_through_loading() {
    let mut toggles = HomeworldToggles::new();
    assert_eq!(toggles.toggle(LUKE, false), ToggleOutcome::Fetch);
    assert_eq!(toggles.state(LUKE), RowState::LoadingHomeworld);
    assert_eq!(toggles.loading(), Some(LUKE));

    assert_eq!(toggles.finish(LUKE, true), RowState::Expanded);
    assert_eq!(toggles.loading(), None);
  }

  #[test]
  fn test_open_with_cache_expands_directly() {
    let mut toggles = HomeworldToggles::new();
    assert_eq!(toggles.toggle(LUKE, true), ToggleOutcome::Expanded);
    assert_eq!(toggles.state(LUKE), RowState::Expanded);
  }

  #[test]
  fn test_close_is_immediate() {
    let mut toggles = HomeworldToggles::new();
    toggles.toggle(LUKE, true);
    assert_eq!(toggles.toggle(LUKE, true), ToggleOutcome::Collapsed);
    assert_eq!(toggles.state(LUKE), RowState::Collapsed);
    // Closing does not depend on the cache either
    toggles.toggle(LUKE, true);
    assert_eq!(toggles.toggle(LUKE, false), ToggleOutcome::Collapsed);
  }

  #[test]
  fn test_toggle_while_loading_is_ignored() {
    let mut toggles = HomeworldToggles::new();
    toggles.toggle(LUKE, false);
    assert_eq!(toggles.toggle(LUKE, false), ToggleOutcome::Ignored);
    assert_eq!(toggles.state(LUKE), RowState::LoadingHomeworld);
  }

  #[test]
  fn test_failed_fetch_collapses() {
    let mut toggles = HomeworldToggles::new();
    toggles.toggle(LUKE, false);
    assert_eq!(toggles.finish(LUKE, false), RowState::Collapsed);
    assert_eq!(toggles.loading(), None);
  }

  #[test]
  fn test_loading_guard_moves_to_latest_row() {
    let mut toggles = HomeworldToggles::new();
    toggles.toggle(LUKE, false);
    toggles.toggle(LEIA, false);
    assert_eq!(toggles.loading(), Some(LEIA));
    assert_eq!(toggles.state(LUKE), RowState::Collapsed);

    // Luke's fetch finishing must not clear Leia's spinner
    assert_eq!(toggles.finish(LUKE, true), RowState::Expanded);
    assert_eq!(toggles.state(LEIA), RowState::LoadingHomeworld);
    assert_eq!(toggles.finish(LEIA, true), RowState::Expanded);
  }

  #[test]
  fn test_clear() {
    let mut toggles = HomeworldToggles::new();
    toggles.toggle(LUKE, true);
    toggles.toggle(LEIA, false);
    toggles.clear();
    assert_eq!(toggles.state(LUKE), RowState::Collapsed);
    assert_eq!(toggles.state(LEIA), RowState::Collapsed);
  }
}
