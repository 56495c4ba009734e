//! Serde types matching SWAPI responses.
//!
//! Records are displayed as received, so these double as domain types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// A person from the `people` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub name: String,
  /// URL of the person's homeworld record
  pub homeworld: String,
}

/// One page of the `people` listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeoplePage {
  #[serde(default)]
  pub count: u64,
  pub next: Option<String>,
  pub previous: Option<String>,
  #[serde(default)]
  pub results: Vec<Person>,
}

impl PeoplePage {
  /// Page number of the next page, `None` when this is the last page
  pub fn next_cursor(&self) -> Option<u32> {
    self.next.as_deref().and_then(page_cursor)
  }

  /// Page number of the previous page, `None` on the first page
  pub fn previous_cursor(&self) -> Option<u32> {
    self.previous.as_deref().and_then(page_cursor)
  }
}

/// A homeworld record.
///
/// Only `name` is interpreted; every other field is kept verbatim for the
/// detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homeworld {
  pub name: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Extract the `page` query parameter from a pagination link.
///
/// Accepts absolute links as returned by the API as well as bare relative
/// ones such as `?page=2`.
pub fn page_cursor(link: &str) -> Option<u32> {
  let base = Url::parse("http://localhost/").ok()?;
  let url = base.join(link).ok()?;
  url
    .query_pairs()
    .find(|(key, _)| key == "page")
    .and_then(|(_, value)| value.parse().ok())
}
