//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_infra::database::DatabaseConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://blog.sqlite?mode=rwc";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    /// Apply pending migrations on startup.
    pub auto_migrate: bool,
    /// Directory holding the Tera templates.
    pub templates_dir: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 1),
            sql_logging: flag_var("DB_SQL_LOGGING", false),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database,
            auto_migrate: flag_var("AUTO_MIGRATE", true),
            templates_dir: env::var("TEMPLATES_DIR")
                .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string()),
        }
    }

    /// Glob Tera loads templates from.
    pub fn templates_glob(&self) -> String {
        format!("{}/**/*.html", self.templates_dir.trim_end_matches('/'))
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag_var(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_glob() {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.into(),
                max_connections: 1,
                min_connections: 1,
                sql_logging: false,
            },
            auto_migrate: false,
            templates_dir: "/srv/blog/templates/".into(),
        };

        assert_eq!(config.templates_glob(), "/srv/blog/templates/**/*.html");
    }
}
