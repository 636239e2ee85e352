use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::time::Duration;

use crate::load::{self, LoadConfig};

#[derive(Parser)]
#[command(name = "workload")]
#[command(about = "CLI para mandar tareas al broker y generar carga")]
struct Cli {
    /// URL base del broker (en Docker: http://broker:8080)
    #[arg(long, env = "BROKER_URL", default_value = "http://localhost:8080")]
    broker_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Envía una tarea con el input dado
    Submit {
        #[arg(value_name = "DATA")]
        data: String,
    },
    /// Consulta el estado de una tarea
    Status {
        #[arg(value_name = "TASK_ID")]
        id: String,
    },
    /// Genera carga: manda tareas a ritmo fijo y después espera sus resultados
    Run {
        #[arg(long, env = "REQUESTS_PER_SECOND", default_value_t = 10)]
        requests_per_second: u32,

        #[arg(long, env = "MAX_TASKS_CREATED", default_value_t = 100)]
        max_tasks: usize,

        #[arg(long, env = "MAX_STRING_LENGTH", default_value_t = 16)]
        max_string_length: usize,

        /// Tope del backoff al consultar status, en segundos
        #[arg(long, env = "MAX_FETCH_STATUS_RETRY_SECS", default_value_t = 32)]
        max_fetch_status_retry_secs: u64,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli.broker_url;

    match cli.command {
        Commands::Submit { data } => {
            let id = load::submit_one(&client, &base_url, &data).await?;
            println!("Tarea creada:");
            println!("  id: {}", id);
        }

        Commands::Status { id } => {
            let url = format!("{}/api/v1/status/{}", base_url, id);
            let resp = client.get(&url).send().await?;
            let code = resp.status();
            let status: common::StatusResponse = resp.json().await?;

            if status.error.is_empty() {
                println!("Tarea:");
                println!("  id: {}", status.id);
                if let Some(s) = status.status {
                    println!("  estado: {}", s);
                }
                if let Some(ref input) = status.input {
                    println!("  input: {:?}", input);
                }
                if let Some(ref submitted) = status.submitted_at {
                    println!("  enviada: {}", submitted);
                }
                if let Some(ref started) = status.started_at {
                    println!("  iniciada: {}", started);
                }
                if let Some(ref done) = status.finished_at {
                    println!("  finalizada: {}", done);
                }
                if let Some(output) = status.output {
                    println!("  output ({} subcadenas):", output.len());
                    for s in output {
                        println!("    - {:?}", s);
                    }
                }
            } else {
                println!("Error: {} (status {})", status.error, code);
            }
        }

        Commands::Run {
            requests_per_second,
            max_tasks,
            max_string_length,
            max_fetch_status_retry_secs,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| "workload=info".to_string()),
                )
                .init();

            let config = LoadConfig {
                requests_per_second: requests_per_second.max(1),
                max_tasks,
                max_string_length: max_string_length.max(1),
                max_status_backoff: Duration::from_secs(max_fetch_status_retry_secs),
            };

            let summary = load::run_load(&client, &base_url, &config).await?;
            println!(
                "terminadas {}/{} tareas",
                summary.finished, summary.submitted
            );
            if summary.finished != summary.submitted {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
