use std::{collections::BTreeMap, path::Path, sync::Mutex};

use rusqlite::{Connection, OptionalExtension, params};

use crate::{error::AppError, seed::SeedSet};

use super::{
    JokeRecord, JokeStore, SearchHit, lock_poisoned, matches_term, normalize_term, validate_joke,
};

/// Durable backend. One connection behind a mutex; every operation is a
/// single statement, so there is nothing to coordinate beyond that.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P, seed: &SeedSet) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS categories(
                name TEXT PRIMARY KEY,
                position INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS jokes(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL REFERENCES categories(name),
                joke TEXT NOT NULL,
                response TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_jokes_category ON jokes(category);
            COMMIT;",
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.seed_if_empty(seed)?;

        Ok(store)
    }

    /// Seeding runs only against a joke table that is empty at startup, so
    /// reopening a populated database never duplicates content.
    fn seed_if_empty(&self, seed: &SeedSet) -> Result<(), AppError> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;

        let jokes: i64 = conn.query_row("SELECT COUNT(1) FROM jokes", [], |row| row.get(0))?;
        if jokes > 0 {
            return Ok(());
        }

        for (position, (category, entries)) in seed.iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO categories(name, position) VALUES (?1, ?2)",
                params![category, position as i64],
            )?;

            for (joke, response) in *entries {
                conn.execute(
                    "INSERT INTO jokes(category, joke, response) VALUES (?1, ?2, ?3)",
                    params![category, joke, response],
                )?;
            }
        }

        Ok(())
    }
}

impl JokeStore for SqliteStore {
    fn categories(&self) -> Result<Vec<String>, AppError> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;

        let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY position")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    fn random_joke(&self, category: &str) -> Result<JokeRecord, AppError> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;

        let mut stmt = conn.prepare(
            "SELECT id, joke, response FROM jokes WHERE category = ?1
             ORDER BY RANDOM() LIMIT 1",
        )?;

        stmt.query_row(params![category], |row| {
            Ok(JokeRecord {
                id: Some(row.get(0)?),
                joke: row.get(1)?,
                response: row.get(2)?,
            })
        })
        .optional()?
        .ok_or_else(|| AppError::CategoryNotFound(category.to_string()))
    }

    fn add_joke(
        &self,
        category: &str,
        joke: &str,
        response: &str,
    ) -> Result<JokeRecord, AppError> {
        validate_joke(joke, response)?;

        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;

        let mut stmt = conn.prepare("SELECT 1 FROM categories WHERE name = ?1 LIMIT 1")?;
        if !stmt.exists(params![category])? {
            return Err(AppError::CategoryNotFound(category.to_string()));
        }

        conn.execute(
            "INSERT INTO jokes(category, joke, response) VALUES (?1, ?2, ?3)",
            params![category, joke, response],
        )?;

        Ok(JokeRecord {
            id: Some(conn.last_insert_rowid()),
            joke: joke.to_string(),
            response: response.to_string(),
        })
    }

    fn counts(&self) -> Result<BTreeMap<String, u64>, AppError> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;

        let mut stmt = conn.prepare(
            "SELECT c.name, COUNT(j.id) FROM categories c
             LEFT JOIN jokes j ON j.category = c.name
             GROUP BY c.name",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<BTreeMap<String, u64>, _>>()?;

        Ok(counts)
    }

    fn search(&self, term: &str) -> Result<Vec<SearchHit>, AppError> {
        let Some(needle) = normalize_term(term) else {
            return Ok(Vec::new());
        };

        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;

        // SQLite's lower() only folds ASCII, so matching happens here where
        // the in-memory backend's rules apply unchanged.
        let mut stmt = conn.prepare("SELECT category, joke, response FROM jokes ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                JokeRecord {
                    id: None,
                    joke: row.get(1)?,
                    response: row.get(2)?,
                },
            ))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (category, record) = row?;

            if matches_term(&record, &needle) {
                hits.push(SearchHit {
                    category,
                    joke: record.joke,
                    response: record.response,
                });
            }
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::DEFAULT_SEED;

    fn open_temp(dir: &tempfile::TempDir) -> SqliteStore {
        SqliteStore::open(dir.path().join("jokes.db"), DEFAULT_SEED).unwrap()
    }

    #[test]
    fn seeds_default_content_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_temp(&dir);

        assert_eq!(store.categories().unwrap(), vec!["funnyJoke", "lameJoke"]);

        let counts = store.counts().unwrap();
        assert_eq!(counts["funnyJoke"], 3);
        assert_eq!(counts["lameJoke"], 2);
    }

    #[test]
    fn reopening_does_not_reseed() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = open_temp(&dir);
            store.add_joke("funnyJoke", "Q", "A").unwrap();
        }

        let store = open_temp(&dir);
        let counts = store.counts().unwrap();

        // 3 seeded plus 1 added, not 6 plus 1.
        assert_eq!(counts["funnyJoke"], 4);
        assert_eq!(counts["lameJoke"], 2);
    }

    #[test]
    fn added_records_carry_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_temp(&dir);

        let first = store.add_joke("lameJoke", "Q1", "A1").unwrap();
        let second = store.add_joke("lameJoke", "Q2", "A2").unwrap();

        assert!(first.id.is_some());
        assert!(second.id.unwrap() > first.id.unwrap());
    }

    #[test]
    fn added_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = open_temp(&dir);
            store.add_joke("lameJoke", "A joke about reboots", "It survived one").unwrap();
        }

        let store = open_temp(&dir);
        let hits = store.search("REBOOTS").unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "lameJoke");
    }

    #[test]
    fn random_joke_draws_from_the_requested_category() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_temp(&dir);
        let (_, seeded) = DEFAULT_SEED[1];

        for _ in 0..20 {
            let record = store.random_joke("lameJoke").unwrap();

            assert!(seeded.iter().any(|(joke, _)| *joke == record.joke));
        }
    }

    #[test]
    fn unknown_category_is_reported_not_thrown() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_temp(&dir);

        let err = store.random_joke("unknownCat").unwrap_err();
        assert_eq!(err.to_string(), "no jokes for category unknownCat");

        assert!(matches!(
            store.add_joke("unknownCat", "Q", "A"),
            Err(AppError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn validation_failure_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_temp(&dir);
        let before = store.counts().unwrap();

        assert!(matches!(
            store.add_joke("funnyJoke", "  ", "A"),
            Err(AppError::Validation(_))
        ));

        assert_eq!(store.counts().unwrap(), before);
    }
}
