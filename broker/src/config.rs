use std::{env, time::Duration};

use common::env_or;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BACKLOG_LOG_INTERVAL_SECS: u64 = 3;

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub addr: String,
    pub backlog_log_interval: Duration,
    /// SILENCE_LOGS=true apaga todos los logs
    pub silence_logs: bool,
}

impl BrokerConfig {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("BROKER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
            backlog_log_interval: Duration::from_secs(
                env_or("BACKLOG_LOG_INTERVAL_SECS", DEFAULT_BACKLOG_LOG_INTERVAL_SECS).max(1),
            ),
            silence_logs: env::var("SILENCE_LOGS").map(|v| v == "true").unwrap_or(false),
        }
    }

    /// Filtro de logs: RUST_LOG manda; si no, uno razonable para el broker.
    pub fn log_filter(&self) -> String {
        if self.silence_logs {
            return "off".to_string();
        }
        env::var("RUST_LOG").unwrap_or_else(|_| "broker=info,tower_http=info".to_string())
    }
}
