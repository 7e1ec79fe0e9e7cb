use crate::presentation::config::{Environment, LoggingSettings};

const DEFAULT_FILTER: &str = "info,transcript_server=debug,tower_http=debug";

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: Environment,
    pub json_format: bool,
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: Environment, logging: &LoggingSettings) -> Self {
        Self {
            environment,
            json_format: logging.json || environment == Environment::Prod,
            default_filter: logging
                .filter
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        }
    }
}
