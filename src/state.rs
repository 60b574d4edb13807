use std::sync::Arc;

use tracing::info;

use crate::{
    config::Config,
    seed::DEFAULT_SEED,
    store::{JokeStore, memory::MemoryStore, sqlite::SqliteStore},
};

pub struct State {
    pub config: Config,
    pub store: Arc<dyn JokeStore>,
}

impl State {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        let store: Arc<dyn JokeStore> = match &config.database_path {
            Some(path) => {
                info!("Opening joke database at {}", path.display());

                Arc::new(SqliteStore::open(path, DEFAULT_SEED).expect("Database misconfigured!"))
            }
            None => {
                info!("Using in-memory jokebook");

                Arc::new(MemoryStore::new())
            }
        };

        Arc::new(Self { config, store })
    }
}
