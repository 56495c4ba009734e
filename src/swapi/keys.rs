//! Cache keys for SWAPI queries.

use serde_json::json;

use crate::cache::QueryKey;

/// Query key types for SWAPI calls.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SwapiQueryKey {
  /// A person's homeworld, keyed by the homeworld URL and the person's name
  Homeworld { url: String, name: String },
}

impl SwapiQueryKey {
  pub fn homeworld(url: &str, name: &str) -> Self {
    Self::Homeworld {
      url: url.to_string(),
      name: name.to_string(),
    }
  }

  /// Kind tag, the first component of the composite key
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Homeworld { .. } => "homeworld",
    }
  }
}

impl QueryKey for SwapiQueryKey {
  fn cache_hash(&self) -> String {
    // JSON array form keeps components unambiguous even when they contain
    // separators
    match self {
      Self::Homeworld { url, name } => json!([self.kind(), url, name]).to_string(),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::Homeworld { url, name } => format!("homeworld of {} ({})", name, url),
    }
  }
}
