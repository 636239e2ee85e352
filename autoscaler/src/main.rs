mod backlog;
mod config;
mod decision;
mod error;
mod orchestrator;
mod scaler;
mod window;

use anyhow::Result;
use std::env;
use tracing::info;

use crate::backlog::HttpBacklog;
use crate::config::ScalerConfig;
use crate::orchestrator::DockerCompose;
use crate::scaler::Autoscaler;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "autoscaler=info".to_string()))
        .init();

    let config = ScalerConfig::from_env()?;
    info!(
        "autoscaler iniciado: broker={} rol={} K={} T={} cada {:?}",
        config.broker_url,
        config.role,
        config.consecutive_reduction_threshold,
        config.pending_count_threshold,
        config.check_every
    );

    let scaler = Autoscaler::new(
        &config,
        HttpBacklog::new(&config.broker_url),
        DockerCompose::new(config.docker_bin.clone()),
    )?;

    scaler.run(config.check_every).await;
    Ok(())
}
