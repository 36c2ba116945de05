//! # todo-api
//!
//! JSON REST API over two resources, task items and organization records,
//! backed by PostgreSQL or an in-process store.
//!
//! ## Features
//!
//! - **CRUD**: create, show, partial update, delete and list per resource
//! - **Listing**: pagination metadata, safelisted sorting, full-text and tag filters
//! - **Optimistic locking**: every update is conditional on the stored version
//! - **Validation**: field-keyed error maps returned as `422`
//! - **Operations**: layered configuration, structured logging, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use todo_api::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load(&Cli::default())?;
//!     init_tracing(&config)?;
//!
//!     let app = router(AppState::new(config.clone(), Models::in_memory()));
//!     Server::new(config).serve(app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod repository;
pub mod resources;
pub mod server;
pub mod state;
pub mod validator;

/// Version reported by the healthcheck
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cli::Cli;
    pub use crate::config::{Config, DatabaseConfig, ServiceConfig};
    pub use crate::database::{close_pool, create_pool};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{router, ApiError, ApiErrorKind, Envelope, ListQuery};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Filters, Metadata, Repository, RepositoryError, RepositoryErrorKind,
    };
    pub use crate::resources::{Organization, Resource, Todo};
    pub use crate::server::Server;
    pub use crate::state::{AppState, Models};
    pub use crate::validator::Validator;
}
