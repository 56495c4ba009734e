//! Async infinite query for paginated data fetching.
//!
//! Inspired by TanStack Query's `useInfiniteQuery`, this module provides an
//! `InfiniteQuery<P>` that fetches pages one at a time, keyed by a page
//! cursor, and accumulates them in arrival order.
//!
//! # Example
//!
//! ```ignore
//! let swapi = client.clone();
//! let mut query = InfiniteQuery::new(
//!     1,
//!     move |page| {
//!         let swapi = swapi.clone();
//!         async move { swapi.people_page(page).await.map_err(|e| e.to_string()) }
//!     },
//!     |page: &PeoplePage| page.next_cursor(),
//! );
//!
//! // Start fetching the first page
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // When the user reaches the end of the list
//! query.fetch_next_page();
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
  /// Query has not been started
  Idle,
  /// First page is being fetched
  Loading,
  /// Last fetch completed successfully
  Success,
  /// Last fetch failed with an error
  Error(String),
}

impl QueryState {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A factory function that creates a future fetching the page for a cursor
type PageFetcherFn<P> = Box<dyn Fn(u32) -> BoxFuture<'static, Result<P, String>> + Send + Sync>;

/// Derives the next cursor from the most recent page
type NextParamFn<P> = Box<dyn Fn(&P) -> Option<u32> + Send + Sync>;

/// Paginated query with state management.
///
/// InfiniteQuery<P> encapsulates:
/// - The page fetching logic (via a closure taking the cursor)
/// - The next-cursor derivation (via a closure over the last page)
/// - Loading/fetching-next/error states
/// - Async result handling via channels
///
/// Pages are only ever requested one at a time, in increasing cursor order.
pub struct InfiniteQuery<P> {
  state: QueryState,
  pages: Vec<P>,
  initial_param: u32,
  next_param: Option<u32>,
  fetching_next: bool,
  fetcher: PageFetcherFn<P>,
  next_param_fn: NextParamFn<P>,
  receiver: Option<mpsc::UnboundedReceiver<Result<P, String>>>,
  fetched_at: Option<Instant>,
  stale_time: Duration,
}

impl<P: Send + 'static> InfiniteQuery<P> {
  /// Create a new infinite query.
  ///
  /// `fetcher` is called with the cursor of each page to load, starting at
  /// `initial_param`. `next_param` inspects the most recent page and returns
  /// the cursor of the page after it, or `None` when there are no more.
  pub fn new<F, Fut, N>(initial_param: u32, fetcher: F, next_param: N) -> Self
  where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, String>> + Send + 'static,
    N: Fn(&P) -> Option<u32> + Send + Sync + 'static,
  {
    Self {
      state: QueryState::Idle,
      pages: Vec::new(),
      initial_param,
      next_param: None,
      fetching_next: false,
      fetcher: Box::new(move |param| fetcher(param).boxed()),
      next_param_fn: Box::new(next_param),
      receiver: None,
      fetched_at: None,
      stale_time: Duration::from_secs(60), // Default 1 minute
    }
  }

  /// Set the stale time for this query.
  ///
  /// After this duration, the data is considered stale and `is_stale()` returns true.
  pub fn with_stale_time(mut self, duration: Duration) -> Self {
    self.stale_time = duration;
    self
  }

  pub fn state(&self) -> &QueryState {
    &self.state
  }

  /// All pages fetched so far, in arrival order
  pub fn pages(&self) -> &[P] {
    &self.pages
  }

  /// Check if the first page is being fetched.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if a page after the first is being fetched.
  pub fn is_fetching_next_page(&self) -> bool {
    self.fetching_next
  }

  /// Check if any fetch is in flight.
  pub fn is_fetching(&self) -> bool {
    self.receiver.is_some()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Check if there is a page after the last fetched one.
  ///
  /// A failed fetch clears this until the next `refetch()`, so a failing
  /// page is never requested again automatically.
  pub fn has_next_page(&self) -> bool {
    self.next_param.is_some() && !self.state.is_error()
  }

  /// Check if the data is stale (older than stale_time).
  pub fn is_stale(&self) -> bool {
    match &self.state {
      QueryState::Success => self
        .fetched_at
        .map(|t| t.elapsed() > self.stale_time)
        .unwrap_or(true),
      _ => false,
    }
  }

  /// Start fetching the first page if the query has not been started.
  pub fn fetch(&mut self) {
    if self.state != QueryState::Idle {
      return;
    }
    self.start_initial();
  }

  /// Drop all pages and start over from the initial cursor.
  pub fn refetch(&mut self) {
    // Dropping the receiver discards any pending result
    self.receiver = None;
    self.start_initial();
  }

  /// Request the page after the last fetched one.
  ///
  /// Returns `false` without doing anything when there is no next page or a
  /// fetch is already in flight.
  pub fn fetch_next_page(&mut self) -> bool {
    if !self.has_next_page() || self.is_fetching() {
      return false;
    }
    let Some(param) = self.next_param else {
      return false;
    };
    self.fetching_next = true;
    self.start_fetch(param);
    true
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (page arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        Err("Query was cancelled".to_string())
      }
    };

    self.receiver = None;
    self.fetching_next = false;
    match result {
      Ok(page) => {
        self.next_param = (self.next_param_fn)(&page);
        self.pages.push(page);
        self.state = QueryState::Success;
        self.fetched_at = Some(Instant::now());
      }
      Err(error) => {
        self.state = QueryState::Error(error);
      }
    }
    true
  }

  fn start_initial(&mut self) {
    self.pages.clear();
    self.next_param = None;
    self.fetching_next = false;
    self.fetched_at = None;
    self.state = QueryState::Loading;
    self.start_fetch(self.initial_param);
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self, param: u32) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    let future = (self.fetcher)(param);
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<P> InfiniteQuery<P> {
  /// Iterate over the items of all pages in order.
  pub fn items<'a, T: 'a>(&'a self, page_items: impl Fn(&'a P) -> &'a [T]) -> impl Iterator<Item = &'a T> {
    self.pages.iter().flat_map(move |page| page_items(page).iter())
  }
}

// InfiniteQuery is not Clone because the fetcher is boxed and receiver is owned.

impl<P: std::fmt::Debug> std::fmt::Debug for InfiniteQuery<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("InfiniteQuery")
      .field("state", &self.state)
      .field("pages", &self.pages.len())
      .field("next_param", &self.next_param)
      .field("fetching_next", &self.fetching_next)
      .field("fetched_at", &self.fetched_at)
      .field("stale_time", &self.stale_time)
      .finish_non_exhaustive()
  }
}
