//! Scroll sentinel: triggers loading of the next page when the marker row
//! after the last item scrolls into view.

/// Something that can tell whether a row of the list is on screen.
pub trait VisibilityProbe {
  fn is_visible(&self, index: usize) -> bool;
}

impl VisibilityProbe for bool {
  fn is_visible(&self, _index: usize) -> bool {
    *self
  }
}

/// Geometry of a rendered list, captured after drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListViewport {
  /// Index of the first row drawn
  pub offset: usize,
  /// Height in lines of every row, drawn or not
  pub item_heights: Vec<usize>,
  /// Lines available for rows
  pub height: usize,
}

impl VisibilityProbe for ListViewport {
  fn is_visible(&self, index: usize) -> bool {
    if index < self.offset || index >= self.item_heights.len() {
      return false;
    }
    let lines_above: usize = self.item_heights[self.offset..index].iter().sum();
    lines_above < self.height
  }
}

/// What an observation was established for. A change in any of these
/// re-establishes the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deps {
  /// Identity of the trigger; bumped when the owning query is replaced
  generation: u64,
  has_next: bool,
  fetching: bool,
}

#[derive(Debug)]
struct Observation {
  deps: Deps,
  /// Whether the marker was visible at the previous check
  was_visible: bool,
}

#[derive(Debug, Default)]
pub struct ScrollSentinel {
  deps: Option<Deps>,
  observation: Option<Observation>,
}

impl ScrollSentinel {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bring the observation in line with the current query state.
  ///
  /// Observing only happens while a next page exists and nothing is in
  /// flight.
  pub fn sync(&mut self, generation: u64, has_next: bool, fetching: bool) {
    let deps = Deps {
      generation,
      has_next,
      fetching,
    };
    if self.deps == Some(deps) {
      return;
    }
    self.deps = Some(deps);
    self.disconnect();
    if has_next && !fetching {
      self.observation = Some(Observation {
        deps,
        was_visible: false,
      });
    }
  }

  /// Check the marker at `marker` and report whether to load the next page.
  ///
  /// Returns `true` once per transition of the marker into view during the
  /// current observation.
  pub fn check(&mut self, probe: &impl VisibilityProbe, marker: usize) -> bool {
    let Some(observation) = self.observation.as_mut() else {
      return false;
    };
    let visible = probe.is_visible(marker);
    let entered = visible && !observation.was_visible;
    observation.was_visible = visible;
    if entered {
      tracing::debug!(generation = observation.deps.generation, marker, "sentinel visible");
    }
    entered
  }

  #[cfg(test)]
  pub fn is_observing(&self) -> bool {
    self.observation.is_some()
  }

  /// Stop observing until the next `sync` with changed dependencies.
  pub fn disconnect(&mut self) {
    self.observation = None;
  }

  /// Forget everything, as if newly created.
  pub fn reset(&mut self) {
    self.deps = None;
    self.disconnect();
  }
}

impl Drop for ScrollSentinel {
  fn drop(&mut self) {
    self.disconnect();
  }
}
