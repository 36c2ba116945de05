//! Application state management

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;
use crate::repository::{MemoryRepository, PgRepository, Repository};
use crate::resources::{Organization, Todo};

/// One model per resource, sharing a single backing store
#[derive(Clone)]
pub struct Models {
    pub todos: Arc<dyn Repository<Todo>>,
    pub organizations: Arc<dyn Repository<Organization>>,
}

impl Models {
    /// Models backed by PostgreSQL
    #[must_use]
    pub fn postgres(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            todos: Arc::new(PgRepository::<Todo>::new(pool.clone(), query_timeout)),
            organizations: Arc::new(PgRepository::<Organization>::new(pool, query_timeout)),
        }
    }

    /// Models backed by process memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            todos: Arc::new(MemoryRepository::<Todo>::new()),
            organizations: Arc::new(MemoryRepository::<Organization>::new()),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub models: Models,
}

impl AppState {
    pub fn new(config: Config, models: Models) -> Self {
        Self {
            config: Arc::new(config),
            models,
        }
    }

    /// Default configuration over an empty in-process store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Config::default(), Models::in_memory())
    }
}
