//! In-process stand-in for SWAPI that records every request.

use super::client::{FetchError, SwapiSource};
use super::types::{Homeworld, PeoplePage, Person};
use reqwest::StatusCode;
use serde_json::Map;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Default)]
struct Inner {
  pages: HashMap<u32, Result<PeoplePage, StatusCode>>,
  homeworlds: HashMap<String, Result<Homeworld, StatusCode>>,
  requests: Vec<String>,
}

/// Fake SWAPI. Unknown pages and homeworlds answer 404.
///
/// With [`FakeSwapi::gated`], each request waits for a permit released by
/// [`FakeSwapi::release`], which lets tests observe in-flight states.
#[derive(Clone, Default)]
pub struct FakeSwapi {
  inner: Arc<Mutex<Inner>>,
  gate: Option<Arc<Semaphore>>,
}

impl FakeSwapi {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn gated() -> Self {
    Self {
      gate: Some(Arc::new(Semaphore::new(0))),
      ..Self::default()
    }
  }

  /// Let `n` pending or future requests complete
  pub fn release(&self, n: usize) {
    if let Some(gate) = &self.gate {
      gate.add_permits(n);
    }
  }

  pub fn with_page(self, page: u32, people: &[(&str, &str)], next: Option<u32>) -> Self {
    let results = people
      .iter()
      .map(|(name, homeworld)| Person {
        name: name.to_string(),
        homeworld: homeworld.to_string(),
      })
      .collect();
    let body = PeoplePage {
      count: 0,
      next: next.map(|n| format!("https://x/people/?page={}", n)),
      previous: (page > 1).then(|| format!("https://x/people/?page={}", page - 1)),
      results,
    };
    self.inner.lock().unwrap().pages.insert(page, Ok(body));
    self
  }

  pub fn with_page_status(self, page: u32, status: StatusCode) -> Self {
    self.inner.lock().unwrap().pages.insert(page, Err(status));
    self
  }

  pub fn with_homeworld(self, url: &str, name: &str) -> Self {
    let body = Homeworld {
      name: name.to_string(),
      fields: Map::new(),
    };
    self
      .inner
      .lock()
      .unwrap()
      .homeworlds
      .insert(url.to_string(), Ok(body));
    self
  }

  pub fn with_homeworld_status(self, url: &str, status: StatusCode) -> Self {
    self
      .inner
      .lock()
      .unwrap()
      .homeworlds
      .insert(url.to_string(), Err(status));
    self
  }

  /// Every request URL seen so far, in order
  pub fn requests(&self) -> Vec<String> {
    self.inner.lock().unwrap().requests.clone()
  }

  pub fn count_requests(&self, url: &str) -> usize {
    self.requests().iter().filter(|r| r.as_str() == url).count()
  }

  async fn wait(&self) {
    if let Some(gate) = &self.gate {
      if let Ok(permit) = gate.acquire().await {
        permit.forget();
      }
    }
  }
}

impl SwapiSource for FakeSwapi {
  async fn people_page(&self, page: u32) -> Result<PeoplePage, FetchError> {
    let url = format!("https://x/people/?page={}", page);
    self.inner.lock().unwrap().requests.push(url.clone());
    self.wait().await;
    let answer = self.inner.lock().unwrap().pages.get(&page).cloned();
    match answer {
      Some(Ok(body)) => Ok(body),
      Some(Err(status)) => Err(FetchError::Status { url, status }),
      None => Err(FetchError::Status {
        url,
        status: StatusCode::NOT_FOUND,
      }),
    }
  }

  async fn homeworld(&self, url: &str) -> Result<Homeworld, FetchError> {
    self.inner.lock().unwrap().requests.push(url.to_string());
    self.wait().await;
    let answer = self.inner.lock().unwrap().homeworlds.get(url).cloned();
    match answer {
      Some(Ok(body)) => Ok(body),
      Some(Err(status)) => Err(FetchError::Status {
        url: url.to_string(),
        status,
      }),
      None => Err(FetchError::Status {
        url: url.to_string(),
        status: StatusCode::NOT_FOUND,
      }),
    }
  }
}
