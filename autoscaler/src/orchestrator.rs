use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{Result, ScaleError};

/// Capacidad de consultar y fijar la cantidad de réplicas de un rol.
/// "Escalar a N" es declarativo: repetir el mismo N no cambia nada.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn current_replicas(&self, role: &str) -> Result<u32>;
    async fn set_desired_replicas(&self, role: &str, n: u32) -> Result<()>;
}

/// Orquestador sobre `docker compose`.
pub struct DockerCompose {
    bin: String,
}

impl DockerCompose {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn scale_args(role: &str, n: u32) -> Vec<String> {
        vec![
            "compose".to_string(),
            "up".to_string(),
            "--no-recreate".to_string(),
            "--detach".to_string(),
            format!("--scale={}={}", role, n),
        ]
    }

    async fn exec(&self, args: &[String], capture_stdout: bool) -> Result<String> {
        let out = Command::new(&self.bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(if capture_stdout { Stdio::piped() } else { Stdio::null() })
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !out.status.success() {
            return Err(ScaleError::Orchestrator {
                command: format!("{} {}", self.bin, args.join(" ")),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

/// Una línea por contenedor en la salida de `ps -q`; nunca menos de 1.
pub fn count_containers(ps_output: &str) -> u32 {
    let n = ps_output.lines().filter(|l| !l.trim().is_empty()).count() as u32;
    n.max(1)
}

#[async_trait]
impl Orchestrator for DockerCompose {
    async fn current_replicas(&self, role: &str) -> Result<u32> {
        let args = ["compose", "ps", "-q", role].map(String::from);
        let out = self.exec(&args, true).await?;
        Ok(count_containers(&out))
    }

    async fn set_desired_replicas(&self, role: &str, n: u32) -> Result<()> {
        self.exec(&Self::scale_args(role, n), false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuenta_contenedores() {
        assert_eq!(count_containers("abc123\ndef456\n"), 2);
        assert_eq!(count_containers("abc123"), 1);
        assert_eq!(count_containers(""), 1);
        assert_eq!(count_containers("a\n\nb\nc\n"), 3);
    }

    #[test]
    fn argumentos_de_escalado() {
        assert_eq!(
            DockerCompose::scale_args("worker", 4),
            vec!["compose", "up", "--no-recreate", "--detach", "--scale=worker=4"]
        );
    }

    #[tokio::test]
    async fn binario_inexistente_es_error_io() {
        let o = DockerCompose::new("/no/existe/docker");
        let err = o.current_replicas("worker").await.unwrap_err();
        assert!(matches!(err, ScaleError::Io(_)));
    }
}
