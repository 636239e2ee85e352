use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use broker::config::BrokerConfig;
use broker::{handlers, monitor, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = BrokerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .init();

    let state = AppState::new();

    // router HTTP
    let app = handlers::build_router(state.clone());

    // log periódico del backlog en segundo plano
    tokio::spawn(monitor::log_backlog(
        state.clone(),
        config.backlog_log_interval,
    ));

    let listener = TcpListener::bind(&config.addr).await?;
    info!("broker escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
