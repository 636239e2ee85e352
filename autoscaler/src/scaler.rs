use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::backlog::BacklogSource;
use crate::config::ScalerConfig;
use crate::decision::decide;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::window::SampleWindow;

/// Loop de control: muestrea backlog y tamaño del pool, y pide un tamaño nuevo.
pub struct Autoscaler<B, O> {
    backlog: B,
    orchestrator: O,
    window: SampleWindow,
    role: String,
    threshold: u64,
}

impl<B: BacklogSource, O: Orchestrator> Autoscaler<B, O> {
    pub fn new(config: &ScalerConfig, backlog: B, orchestrator: O) -> Result<Self> {
        Ok(Self {
            backlog,
            orchestrator,
            window: SampleWindow::new(config.consecutive_reduction_threshold)?,
            role: config.role.clone(),
            threshold: config.pending_count_threshold,
        })
    }

    /// Una iteración. Devuelve el tamaño pedido al orquestador, si se pidió alguno.
    /// Cualquier error corta sólo esta iteración.
    pub async fn tick(&mut self) -> Result<Option<u32>> {
        let pending = self.backlog.pending_count().await?;
        let n_workers = self.orchestrator.current_replicas(&self.role).await?;

        let decreasing = self.window.push(pending);
        info!(
            pending,
            n_workers,
            decreasing,
            window = ?self.window.samples(),
            "muestra del backlog"
        );
        let target = decide(pending, decreasing, n_workers, self.threshold);

        let Some(n) = target else {
            return Ok(None);
        };

        if pending > self.threshold {
            if decreasing {
                if n != n_workers {
                    info!("backlog bajando, reduzco workers a la mitad: {}", n);
                }
            } else {
                info!("backlog creciendo, duplico workers: {}", n);
            }
        } else {
            info!("poco tráfico, vuelvo a {} worker", n);
        }

        // siempre se manda: "escalar a N" es idempotente
        self.orchestrator.set_desired_replicas(&self.role, n).await?;
        Ok(Some(n))
    }

    pub async fn run(mut self, every: std::time::Duration) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // el primer tick es inmediato; la primera muestra va después de un intervalo
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                warn!("iteración del autoscaler abortada: {}", e);
            }
        }
    }
}
