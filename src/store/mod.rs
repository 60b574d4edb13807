//! # Joke Store
//!
//! The store owns every category → jokes association and answers the five
//! query/mutation operations behind the HTTP layer. Two backends implement
//! the same contract:
//!
//! - [`memory::MemoryStore`]: plain in-memory maps, reseeded on every start
//! - [`sqlite::SqliteStore`]: durable SQLite tables, seeded once
//!
//! The backend is picked at construction time from [`crate::config::Config`];
//! callers only ever see the [`JokeStore`] trait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub mod memory;
pub mod sqlite;

/// A single prompt/punchline pair. `id` is assigned by the durable backend
/// and absent for in-memory records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub joke: String,
    pub response: String,
}

/// One search result, flattened for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub category: String,
    pub joke: String,
    pub response: String,
}

pub trait JokeStore: Send + Sync {
    /// All known category names, in registration order.
    fn categories(&self) -> Result<Vec<String>, AppError>;

    /// One record from `category`, picked uniformly at random. Unknown and
    /// zero-record categories both answer `CategoryNotFound`.
    fn random_joke(&self, category: &str) -> Result<JokeRecord, AppError>;

    /// Appends a record and returns it as stored. Fails with `Validation` on
    /// blank fields and `CategoryNotFound` on unregistered categories,
    /// leaving the store unchanged.
    fn add_joke(
        &self,
        category: &str,
        joke: &str,
        response: &str,
    ) -> Result<JokeRecord, AppError>;

    /// Record counts for every known category, zero-record ones included.
    fn counts(&self) -> Result<BTreeMap<String, u64>, AppError>;

    /// Case-insensitive substring match over both text fields of every
    /// record. A blank term matches nothing.
    fn search(&self, term: &str) -> Result<Vec<SearchHit>, AppError>;
}

pub(crate) fn validate_joke(joke: &str, response: &str) -> Result<(), AppError> {
    if joke.trim().is_empty() {
        return Err(AppError::Validation("missing joke field".into()));
    }

    if response.trim().is_empty() {
        return Err(AppError::Validation("missing response field".into()));
    }

    Ok(())
}

pub(crate) fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// `needle` must already be lowercased.
pub(crate) fn matches_term(record: &JokeRecord, needle: &str) -> bool {
    record.joke.to_lowercase().contains(needle) || record.response.to_lowercase().contains(needle)
}

pub(crate) fn lock_poisoned() -> AppError {
    AppError::Storage("store lock poisoned".into())
}
