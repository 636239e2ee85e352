use anyhow::{bail, Context, Result};
use common::{StatusResponse, SubmitRequest, SubmitResponse, TaskId, TaskStatus};
use futures::future::join_all;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{info, warn};

/// Alfabeto de los inputs al azar: letras, dígitos, espacios y puntuación.
const LETTERS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789\n\t <[({>])}@'=-+!\":<^;$~?/,`";

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub requests_per_second: u32,
    pub max_tasks: usize,
    pub max_string_length: usize,
    pub max_status_backoff: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub submitted: usize,
    pub finished: usize,
}

/// Input al azar de largo 1..=max_len.
pub fn random_input<R: Rng>(rng: &mut R, max_len: usize) -> String {
    let alphabet: Vec<char> = LETTERS.chars().collect();
    let n = rng.gen_range(1..=max_len.max(1));
    (0..n)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Esperas entre consultas de status: la primera inmediata, después 1s, 2s, 4s...
/// mientras no pasen de `max`.
pub fn backoff_schedule(max: Duration) -> Vec<Duration> {
    let mut out = vec![Duration::ZERO];
    let mut delay = Duration::from_secs(1);
    while delay <= max {
        out.push(delay);
        delay *= 2;
    }
    out
}

/// Tiempo entre submits. Nunca cero: `interval` no acepta un período nulo.
pub fn submit_period(requests_per_second: u32) -> Duration {
    (Duration::from_secs(1) / requests_per_second.max(1)).max(Duration::from_nanos(1))
}

pub async fn submit_one(client: &Client, base_url: &str, data: &str) -> Result<TaskId> {
    let url = format!("{}/api/v1/submit", base_url);
    let resp = client
        .post(&url)
        .json(&SubmitRequest {
            data: data.to_string(),
        })
        .send()
        .await?;
    let body: SubmitResponse = resp.json().await.context("respuesta de submit inválida")?;

    if body.id < 0 || !body.error.is_empty() {
        bail!("broker rechazó la tarea: {}", body.error);
    }
    Ok(body.id as TaskId)
}

pub async fn fetch_status(client: &Client, base_url: &str, id: TaskId) -> Result<StatusResponse> {
    let url = format!("{}/api/v1/status/{}", base_url, id);
    let resp = client.get(&url).send().await?;
    Ok(resp.json().await?)
}

/// Consulta el status de una tarea con backoff hasta verla FINISHED.
/// Devuelve false si se agotó el backoff; error si el broker contesta otra tarea.
async fn wait_finished(
    client: &Client,
    base_url: &str,
    id: TaskId,
    input: &str,
    schedule: &[Duration],
) -> Result<bool> {
    for delay in schedule {
        if !delay.is_zero() {
            sleep(*delay).await;
        }

        let status = match fetch_status(client, base_url, id).await {
            Ok(s) => s,
            Err(e) => {
                warn!("status de tarea {} falló: {:?}", id, e);
                continue;
            }
        };

        if status.id != id as i64 || status.input.as_deref() != Some(input) {
            bail!(
                "broker respondió otra tarea para {}: id={} error={:?}",
                id,
                status.id,
                status.error
            );
        }

        info!("tarea #{}: {:?}", id, status.status);
        if status.status == Some(TaskStatus::Finished) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Manda `max_tasks` inputs al azar a `requests_per_second` y después espera que
/// todos terminen.
pub async fn run_load(client: &Client, base_url: &str, config: &LoadConfig) -> Result<LoadSummary> {
    info!(
        "mandando {} tareas a {} req/s",
        config.max_tasks, config.requests_per_second
    );

    let mut ticker = interval(submit_period(config.requests_per_second));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut handles = Vec::with_capacity(config.max_tasks);
    for _ in 0..config.max_tasks {
        ticker.tick().await;

        let input = random_input(&mut rand::thread_rng(), config.max_string_length);
        let client = client.clone();
        let base_url = base_url.to_string();
        handles.push(tokio::spawn(async move {
            submit_one(&client, &base_url, &input)
                .await
                .map(|id| (id, input))
        }));
    }

    let mut tasks = Vec::with_capacity(handles.len());
    for res in join_all(handles).await {
        match res? {
            Ok(task) => tasks.push(task),
            Err(e) => warn!("submit falló: {:?}", e),
        }
    }

    info!("enviadas {} tareas, esperando resultados", tasks.len());

    let schedule = backoff_schedule(config.max_status_backoff);
    let waits = tasks.iter().map(|(id, input)| {
        let schedule = &schedule;
        async move { wait_finished(client, base_url, *id, input, schedule).await }
    });

    let mut finished = 0;
    for res in join_all(waits).await {
        if res? {
            finished += 1;
        }
    }

    Ok(LoadSummary {
        submitted: config.max_tasks,
        finished,
    })
}
