use std::time::Duration;

use crate::configs::{Driver, MetadataBackendConfig};

pub struct Env {
    pub metadata: MetadataBackendConfig,
    pub sweep_interval: Duration,
}

impl Env {
    fn new() -> Self {
        let defaults = MetadataBackendConfig::default();

        let driver = std::env::var("METADATA_DRIVER")
            .unwrap_or_else(|_| defaults.driver.to_string())
            .parse::<Driver>()
            .expect("METADATA_DRIVER must be either mysql or sqlite");
        let host = std::env::var("METADATA_HOST").unwrap_or(defaults.host);
        let port = std::env::var("METADATA_PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse::<u16>()
            .expect("METADATA_PORT must be a valid u16 integer");
        let username = std::env::var("METADATA_USERNAME").unwrap_or(defaults.username);
        let password = std::env::var("METADATA_PASSWORD").unwrap_or(defaults.password);
        let database = std::env::var("METADATA_DATABASE").unwrap_or(defaults.database);
        let path = std::env::var("METADATA_PATH").unwrap_or(defaults.path);
        let max_connections = std::env::var("METADATA_MAX_CONNECTIONS")
            .unwrap_or_else(|_| defaults.max_connections.to_string())
            .parse::<u32>()
            .expect("METADATA_MAX_CONNECTIONS must be a valid u32 integer");
        let debug = std::env::var("METADATA_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let sweep_interval = parse_sweep_interval(
            &std::env::var("SWEEP_INTERVAL").unwrap_or_else(|_| "60".to_string()),
        )
        .expect("SWEEP_INTERVAL must be a positive number of seconds");

        Env {
            metadata: MetadataBackendConfig {
                driver,
                host,
                port,
                username,
                password,
                database,
                path,
                max_connections,
                debug,
            },
            sweep_interval,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds between two expiry sweeps. Zero would make the sweeper spin.
fn parse_sweep_interval(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_interval_must_be_positive() {
        assert_eq!(parse_sweep_interval("60"), Some(Duration::from_secs(60)));
        assert_eq!(parse_sweep_interval(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(parse_sweep_interval("0"), None);
        assert_eq!(parse_sweep_interval("-1"), None);
        assert_eq!(parse_sweep_interval("soon"), None);
    }
}
