use crate::swapi::types::{Homeworld, PeoplePage};
use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

/// Errors from a single SWAPI request
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  /// The server answered with a non-success status
  #[error("GET {url} failed with status {status}")]
  Status { url: String, status: StatusCode },
  /// The request never produced a response
  #[error("GET {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },
  /// The body was not the JSON we expected
  #[error("GET {url} returned an unreadable body: {source}")]
  Decode {
    url: String,
    #[source]
    source: reqwest::Error,
  },
}

/// The two endpoints the list view reads from.
///
/// Implemented by [`SwapiClient`] for the real API and by counting fakes in
/// tests.
pub trait SwapiSource: Clone + Send + Sync + 'static {
  /// Fetch one page of the people listing (pages start at 1)
  fn people_page(&self, page: u32) -> impl Future<Output = Result<PeoplePage, FetchError>> + Send;

  /// Fetch the homeworld record at `url`
  fn homeworld(&self, url: &str) -> impl Future<Output = Result<Homeworld, FetchError>> + Send;
}

/// SWAPI HTTP client
#[derive(Clone)]
pub struct SwapiClient {
  http: reqwest::Client,
  base_url: String,
}

impl SwapiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("holocron/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn people_url(&self, page: u32) -> String {
    format!("{}/people/?page={}", self.base_url, page)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
    debug!(url, "GET");
    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
      })?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status,
      });
    }

    response.json().await.map_err(|source| FetchError::Decode {
      url: url.to_string(),
      source,
    })
  }
}

impl SwapiSource for SwapiClient {
  async fn people_page(&self, page: u32) -> Result<PeoplePage, FetchError> {
    let url = self.people_url(page);
    self.get_json(&url).await
  }

  async fn homeworld(&self, url: &str) -> Result<Homeworld, FetchError> {
    self.get_json(url).await
  }
}
