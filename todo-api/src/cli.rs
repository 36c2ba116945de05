//! Command-line flags
//!
//! Flags override every other configuration source. Durations accept a bare
//! number of seconds or a value with an `s`, `m` or `h` suffix (`15m`).

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

/// todo-api - JSON REST API for task items and organizations
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "todo-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Environment
    #[arg(long = "env", value_name = "ENVIRONMENT", value_parser = ["development", "staging", "production"])]
    pub environment: Option<String>,

    /// PostgreSQL DSN
    #[arg(long, env = "TODO_DB_DSN", hide_env_values = true)]
    pub db_dsn: Option<String>,

    /// PostgreSQL max open connections
    #[arg(long, value_name = "N")]
    pub db_max_open_conns: Option<u32>,

    /// PostgreSQL max idle connections
    #[arg(long, value_name = "N")]
    pub db_max_idle_conns: Option<u32>,

    /// PostgreSQL max connection idle time
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_secs)]
    pub db_max_idle_time: Option<u64>,

    /// Per-statement timeout
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_secs)]
    pub db_query_timeout: Option<u64>,
}

/// The subset of configuration set by flags, shaped like [`crate::config::Config`]
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct Overrides {
    pub service: ServiceOverrides,
    #[serde(skip_serializing_if = "DatabaseOverrides::is_empty")]
    pub database: DatabaseOverrides,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ServiceOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct DatabaseOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_timeout_secs: Option<u64>,
}

impl DatabaseOverrides {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Cli {
    /// Flags that were given, as a configuration layer
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            service: ServiceOverrides {
                port: self.port,
                environment: self.environment.clone(),
            },
            database: DatabaseOverrides {
                url: self.db_dsn.clone().filter(|dsn| !dsn.is_empty()),
                max_connections: self.db_max_open_conns,
                min_connections: self.db_max_idle_conns,
                idle_timeout_secs: self.db_max_idle_time,
                query_timeout_secs: self.db_query_timeout,
            },
        }
    }
}

/// Parse `90`, `90s`, `15m` or `1h` into seconds
pub fn parse_duration_secs(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    let (digits, scale) = match raw.char_indices().last() {
        Some((i, 's')) => (&raw[..i], 1),
        Some((i, 'm')) => (&raw[..i], 60),
        Some((i, 'h')) => (&raw[..i], 3600),
        _ => (raw, 1),
    };
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(|| format!("invalid duration `{raw}`, expected e.g. 30s, 15m or 1h"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("90"), Ok(90));
        assert_eq!(parse_duration_secs("5s"), Ok(5));
        assert_eq!(parse_duration_secs("15m"), Ok(900));
        assert_eq!(parse_duration_secs("1h"), Ok(3600));
        assert!(parse_duration_secs("soon").is_err());
        assert!(parse_duration_secs("m").is_err());
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "todo-api",
            "--port",
            "4001",
            "--env",
            "staging",
            "--db-max-open-conns",
            "10",
            "--db-max-idle-time",
            "5m",
        ])
        .unwrap();
        assert_eq!(cli.port, Some(4001));
        assert_eq!(cli.environment.as_deref(), Some("staging"));
        assert_eq!(cli.db_max_open_conns, Some(10));
        assert_eq!(cli.db_max_idle_time, Some(300));
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        assert!(Cli::try_parse_from(["todo-api", "--env", "qa"]).is_err());
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        let overrides = Cli::default().overrides();
        assert_eq!(overrides, Overrides::default());
        let value = serde_json::to_value(&overrides).unwrap();
        assert_eq!(value, serde_json::json!({"service": {}}));
    }

    #[test]
    fn test_overrides_shape() {
        let cli = Cli {
            port: Some(8000),
            db_dsn: Some("postgres://todo@localhost/todo".to_string()),
            db_query_timeout: Some(2),
            ..Cli::default()
        };
        let value = serde_json::to_value(cli.overrides()).unwrap();
        assert_eq!(value["service"]["port"], 8000);
        assert_eq!(value["database"]["url"], "postgres://todo@localhost/todo");
        assert_eq!(value["database"]["query_timeout_secs"], 2);
        assert!(value["database"].get("max_connections").is_none());
    }
}
