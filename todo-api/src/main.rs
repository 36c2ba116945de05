use anyhow::Context;
use clap::Parser;

use todo_api::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli).context("failed to load configuration")?;
    init_tracing(&config).context("failed to initialize tracing")?;

    let pool = match &config.database {
        Some(db) => Some(
            create_pool(db)
                .await
                .context("failed to connect to PostgreSQL")?,
        ),
        None => None,
    };

    let models = match (&pool, &config.database) {
        (Some(pool), Some(db)) => Models::postgres(pool.clone(), db.query_timeout()),
        _ => {
            tracing::warn!("No database configured, records are kept in memory only");
            Models::in_memory()
        }
    };

    let app = router(AppState::new(config.clone(), models));
    let served = Server::new(config).serve(app).await;

    if let Some(pool) = &pool {
        close_pool(pool).await;
    }

    served.context("server error")
}
