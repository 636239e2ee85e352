use std::{env, time::Duration};

use common::env_or;

use crate::error::{Result, ScaleError};

pub const DEFAULT_CONSECUTIVE_REDUCTION_THRESHOLD: usize = 3;
pub const DEFAULT_PENDING_COUNT_THRESHOLD: u64 = 100;
pub const DEFAULT_CHECK_FREQUENCY_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct ScalerConfig {
    pub broker_url: String,
    /// Servicio del orquestador que corre los workers
    pub role: String,
    /// K: largo de la ventana de muestras
    pub consecutive_reduction_threshold: usize,
    /// T: por encima de esto el backlog se considera alto
    pub pending_count_threshold: u64,
    pub check_every: Duration,
    pub docker_bin: String,
}

impl ScalerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            broker_url: env::var("BROKER_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            role: env::var("WORKER_SERVICE_NAME").unwrap_or_else(|_| "worker".to_string()),
            consecutive_reduction_threshold: env_or(
                "CONSECUTIVE_REDUCTION_THRESHOLD",
                DEFAULT_CONSECUTIVE_REDUCTION_THRESHOLD,
            ),
            pending_count_threshold: env_or(
                "PENDING_COUNT_THRESHOLD",
                DEFAULT_PENDING_COUNT_THRESHOLD,
            ),
            check_every: Duration::from_secs(env_or(
                "CHECK_FREQUENCY_SECS",
                DEFAULT_CHECK_FREQUENCY_SECS,
            )),
            docker_bin: env::var("DOCKER_BIN").unwrap_or_else(|_| "docker".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.consecutive_reduction_threshold == 0 {
            return Err(ScaleError::InvalidConfig(
                "CONSECUTIVE_REDUCTION_THRESHOLD debe ser positivo".to_string(),
            ));
        }
        if self.check_every.is_zero() {
            return Err(ScaleError::InvalidConfig(
                "CHECK_FREQUENCY_SECS debe ser positivo".to_string(),
            ));
        }
        Ok(())
    }
}
