use anyhow::{anyhow, bail, Context, Result};
use common::{all_substrings, env_or, CompleteRequest, CompleteResponse, FetchResponse, TaskId};
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::{env, time::Duration};
use tokio::time::sleep;
use tracing::{error, info, warn};

const DEFAULT_MIN_COMPUTE_DELAY_MS: u64 = 0;
const DEFAULT_MAX_COMPUTE_DELAY_MS: u64 = 0;
const RETRY_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
struct WorkerConfig {
    broker_url: String,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl WorkerConfig {
    /// - En Docker: BROKER_URL=http://broker:8080
    /// - Local: default http://localhost:8080
    fn from_env() -> Self {
        let min_delay_ms = env_or("MIN_COMPUTE_DELAY_MS", DEFAULT_MIN_COMPUTE_DELAY_MS);
        let max_delay_ms = env_or("MAX_COMPUTE_DELAY_MS", DEFAULT_MAX_COMPUTE_DELAY_MS);
        Self {
            broker_url: env::var("BROKER_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            min_delay_ms,
            max_delay_ms: max_delay_ms.max(min_delay_ms),
        }
    }
}

/// Simula trabajo CPU-bound: espera un tiempo al azar en [min, max] y calcula las subcadenas.
fn compute(input: &str, min_delay_ms: u64, max_delay_ms: u64) -> Vec<String> {
    if max_delay_ms > 0 {
        let ms = rand::thread_rng().gen_range(min_delay_ms..=max_delay_ms);
        std::thread::sleep(Duration::from_millis(ms));
    }
    all_substrings(input)
}

/// Un worker procesa en orden FIFO, así que los ids que recibe sólo pueden crecer.
fn check_monotonic(last: Option<TaskId>, id: TaskId) -> bool {
    last.map_or(true, |prev| id > prev)
}

/// Pide la próxima tarea. El broker deja la request colgada hasta que haya una.
async fn fetch(client: &Client, base_url: &str) -> Result<FetchResponse> {
    let url = format!("{}/api/v1/tasks/next", base_url);
    let resp = client.post(&url).send().await?;
    if !resp.status().is_success() {
        bail!("broker devolvió status {} en fetch", resp.status());
    }
    resp.json::<FetchResponse>()
        .await
        .context("respuesta de fetch inválida")
}

/// Qué hacer con la respuesta del broker a un reporte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportVerdict {
    Accepted,
    /// Falla del broker o respuesta ilegible: se vuelve a mandar
    Retry,
    /// El broker rechazó el reporte; mandarlo de nuevo no cambia nada
    Rejected,
}

fn report_verdict(status: StatusCode, body: Option<&CompleteResponse>) -> ReportVerdict {
    if status.is_server_error() {
        return ReportVerdict::Retry;
    }
    match body {
        Some(b) if status.is_success() && b.id >= 0 && b.error.is_empty() => {
            ReportVerdict::Accepted
        }
        // 200 con cuerpo cortado o ilegible
        None if status.is_success() => ReportVerdict::Retry,
        _ => ReportVerdict::Rejected,
    }
}

#[derive(Debug)]
enum ReportError {
    Transient(anyhow::Error),
    Rejected(String),
}

async fn report(
    client: &Client,
    base_url: &str,
    req: &CompleteRequest,
) -> std::result::Result<(), ReportError> {
    let url = format!("{}/api/v1/tasks/complete", base_url);
    let resp = client
        .post(&url)
        .json(req)
        .send()
        .await
        .map_err(|e| ReportError::Transient(e.into()))?;
    let status = resp.status();
    let body = resp.json::<CompleteResponse>().await.ok();

    match report_verdict(status, body.as_ref()) {
        ReportVerdict::Accepted => Ok(()),
        ReportVerdict::Retry => Err(ReportError::Transient(anyhow!(
            "broker devolvió {} al reporte de {}",
            status,
            req.id
        ))),
        ReportVerdict::Rejected => Err(ReportError::Rejected(format!(
            "{} {}",
            status,
            body.map(|b| b.error).unwrap_or_default()
        ))),
    }
}

/// Manda el reporte hasta que el broker lo acepte o lo rechace.
/// Devuelve el motivo si fue rechazado.
async fn report_until_settled(
    client: &Client,
    base_url: &str,
    req: &CompleteRequest,
    pause: Duration,
) -> std::result::Result<(), String> {
    loop {
        match report(client, base_url, req).await {
            Ok(()) => return Ok(()),
            Err(ReportError::Rejected(reason)) => return Err(reason),
            Err(ReportError::Transient(e)) => {
                warn!("reporte de tarea {} falló, reintento: {:?}", req.id, e);
                sleep(pause).await;
            }
        }
    }
}

/// Loop principal del worker.
/// - Pide una tarea (bloquea en el broker si no hay).
/// - Calcula el resultado en un hilo de bloqueo.
/// - Reporta el output junto con el input original.
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "worker=info".to_string()))
        .init();

    let config = WorkerConfig::from_env();
    let client = Client::new();

    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    info!(
        "worker {} arrancando contra {} (delay {}..={} ms)",
        hostname, config.broker_url, config.min_delay_ms, config.max_delay_ms
    );

    let mut last_id: Option<TaskId> = None;

    loop {
        let task = match fetch(&client, &config.broker_url).await {
            Ok(task) => task,
            Err(e) => {
                warn!("no se pudo pedir tarea: {:?}", e);
                sleep(RETRY_PAUSE).await;
                continue;
            }
        };

        if !check_monotonic(last_id, task.id) {
            error!(
                "ids fuera de orden: recibí {} después de {:?}",
                task.id, last_id
            );
        }
        last_id = Some(task.id);

        info!("tengo tarea {} (input de {} bytes)", task.id, task.input.len());

        let input = task.input.clone();
        let (min, max) = (config.min_delay_ms, config.max_delay_ms);
        let output = match tokio::task::spawn_blocking(move || compute(&input, min, max)).await {
            Ok(output) => output,
            Err(e) => {
                error!("panic o join error en tarea {}: {:?}", task.id, e);
                continue;
            }
        };

        let req = CompleteRequest {
            id: task.id,
            input: task.input,
            output,
        };

        match report_until_settled(&client, &config.broker_url, &req, RETRY_PAUSE).await {
            Ok(()) => info!("terminé tarea {} ({} subcadenas)", req.id, req.output.len()),
            Err(reason) => error!("broker rechazó el reporte de tarea {}: {}", req.id, reason),
        }
    }
}
