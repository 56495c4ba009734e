pub mod client;
pub mod keys;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::{SwapiClient, SwapiSource};
pub use keys::SwapiQueryKey;
pub use types::{Homeworld, PeoplePage, Person};
