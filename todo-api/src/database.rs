//! Database connection pool management
//!
//! The pool is created once at startup, verified with a bounded round-trip,
//! handed to the models, and closed after the server has drained.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::repository::{RepositoryError, RepositoryOperation};

/// Create a PostgreSQL connection pool with retry logic
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    create_pool_with_retries(config, config.max_retries).await
}

/// Create a PostgreSQL connection pool with configurable retries
///
/// Uses exponential backoff strategy for retries
async fn create_pool_with_retries(config: &DatabaseConfig, max_retries: u32) -> Result<PgPool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        url = %sanitize_connection_url(&config.url),
                        max = config.max_connections,
                        min = config.min_connections,
                        "Database connection pool created"
                    );
                }
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    tracing::error!(
                        "Failed to connect to database after {} attempts: {}",
                        max_retries + 1,
                        e
                    );
                    return Err(e.into());
                }

                let delay = backoff_delay(base_delay, attempt);
                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Open the pool and prove it works (single try)
async fn try_create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, RepositoryError> {
    let connect_timeout = Duration::from_secs(config.connection_timeout_secs);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .acquire_timeout(connect_timeout)
        .connect_lazy(&config.url)
        .map_err(|e| connect_error(config, e))?;

    let ping = sqlx::query("SELECT 1").execute(&pool);
    match tokio::time::timeout(connect_timeout, ping).await {
        Ok(Ok(_)) => Ok(pool),
        Ok(Err(e)) => {
            pool.close().await;
            Err(connect_error(config, e))
        }
        Err(_) => {
            pool.close().await;
            Err(RepositoryError::timeout(
                RepositoryOperation::Connect,
                format!(
                    "no response from {} within {:?}",
                    sanitize_connection_url(&config.url),
                    connect_timeout
                ),
            ))
        }
    }
}

fn connect_error(config: &DatabaseConfig, err: sqlx::Error) -> RepositoryError {
    let category = categorize_db_error(&err);
    let mut error = RepositoryError::from_sqlx(RepositoryOperation::Connect, err);
    error.message = format!(
        "{} at '{}': {}",
        category,
        sanitize_connection_url(&config.url),
        error.message
    );
    error
}

/// Close the pool, waiting for checked-out connections to be returned
pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    tracing::info!("Database connection pool closed");
}

/// Sanitize connection URL for safe logging (remove password)
pub fn sanitize_connection_url(url: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (url.rfind('@'), url.find("://")) {
        let credentials_start = scheme_end + 3;
        if at_pos > credentials_start {
            let credentials = &url[credentials_start..at_pos];
            if let Some(colon_pos) = credentials.find(':') {
                let username = &credentials[..colon_pos];
                return format!(
                    "{}{}:***{}",
                    &url[..credentials_start],
                    username,
                    &url[at_pos..]
                );
            }
        }
    }
    url.to_string()
}

/// Categorize database error for better operator guidance
fn categorize_db_error(err: &sqlx::Error) -> &'static str {
    use sqlx::Error;
    match err {
        Error::Configuration(_) => "Configuration error",
        Error::Database(_) => "Database error",
        Error::Io(_) => "Network I/O error - check connectivity",
        Error::Tls(_) => "TLS/SSL error - check certificate configuration",
        Error::PoolTimedOut => "Connection pool timeout - database may be overloaded",
        Error::PoolClosed => "Connection pool closed",
        Error::WorkerCrashed => "Database worker crashed",
        _ => "Connection error",
    }
}
