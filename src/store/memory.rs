use std::{
    collections::{BTreeMap, HashMap},
    sync::RwLock,
};

use rand::seq::SliceRandom;

use crate::{error::AppError, seed::SeedSet};

use super::{
    JokeRecord, JokeStore, SearchHit, lock_poisoned, matches_term, normalize_term, validate_joke,
};

/// In-memory backend. Registration order lives in its own vec so category
/// listing stays deterministic while lookups go through the map.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

struct Inner {
    order: Vec<String>,
    jokes: HashMap<String, Vec<JokeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_seed(crate::seed::DEFAULT_SEED)
    }

    pub fn with_seed(seed: &SeedSet) -> Self {
        let mut inner = Inner {
            order: Vec::new(),
            jokes: HashMap::new(),
        };

        for (category, jokes) in seed {
            inner.order.push((*category).to_string());
            inner.jokes.insert(
                (*category).to_string(),
                jokes
                    .iter()
                    .map(|(joke, response)| JokeRecord {
                        id: None,
                        joke: (*joke).to_string(),
                        response: (*response).to_string(),
                    })
                    .collect(),
            );
        }

        Self {
            inner: RwLock::new(inner),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JokeStore for MemoryStore {
    fn categories(&self) -> Result<Vec<String>, AppError> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;

        Ok(inner.order.clone())
    }

    fn random_joke(&self, category: &str) -> Result<JokeRecord, AppError> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;

        inner
            .jokes
            .get(category)
            .and_then(|jokes| jokes.choose(&mut rand::thread_rng()))
            .cloned()
            .ok_or_else(|| AppError::CategoryNotFound(category.to_string()))
    }

    fn add_joke(
        &self,
        category: &str,
        joke: &str,
        response: &str,
    ) -> Result<JokeRecord, AppError> {
        validate_joke(joke, response)?;

        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;

        let jokes = inner
            .jokes
            .get_mut(category)
            .ok_or_else(|| AppError::CategoryNotFound(category.to_string()))?;

        let record = JokeRecord {
            id: None,
            joke: joke.to_string(),
            response: response.to_string(),
        };
        jokes.push(record.clone());

        Ok(record)
    }

    fn counts(&self) -> Result<BTreeMap<String, u64>, AppError> {
        let inner = self.inner.read().map_err(|_| lock_poisoned())?;

        Ok(inner
            .order
            .iter()
            .map(|category| {
                let count = inner.jokes.get(category).map_or(0, |jokes| jokes.len());

                (category.clone(), count as u64)
            })
            .collect())
    }

    fn search(&self, term: &str) -> Result<Vec<SearchHit>, AppError> {
        let Some(needle) = normalize_term(term) else {
            return Ok(Vec::new());
        };

        let inner = self.inner.read().map_err(|_| lock_poisoned())?;

        let mut hits = Vec::new();
        for category in &inner.order {
            for record in inner.jokes.get(category).into_iter().flatten() {
                if matches_term(record, &needle) {
                    hits.push(SearchHit {
                        category: category.clone(),
                        joke: record.joke.clone(),
                        response: record.response.clone(),
                    });
                }
            }
        }

        Ok(hits)
    }
}
