use std::time::Duration;

use tracing::info;

use crate::state::AppState;

/// Loop en segundo plano que loguea cada tanto cuántas tareas siguen esperando.
pub async fn log_backlog(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // el primer tick de interval es inmediato
    ticker.tick().await;

    loop {
        ticker.tick().await;
        info!(pending_count = state.backlog(), "revisando tareas pendientes");
    }
}
