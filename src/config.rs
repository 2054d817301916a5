use std::env;

// ============================================================================
// Configuration - environment variables with in-code defaults
// ============================================================================

const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the service runs on the
    /// volatile in-memory store, which is meant for development only.
    pub database_url: Option<String>,
    pub http_host: String,
    pub http_port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok(),
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_port(env::var("HTTP_PORT").ok()),
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|p| p.parse().ok()).unwrap_or(DEFAULT_HTTP_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(parse_port(None), 8080);
        assert_eq!(parse_port(Some("not-a-port".into())), 8080);
        assert_eq!(parse_port(Some("9000".into())), 9000);
    }
}
