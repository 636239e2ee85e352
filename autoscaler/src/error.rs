use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("configuración inválida: {0}")]
    InvalidConfig(String),

    #[error("error HTTP consultando el broker: {0}")]
    Http(#[from] reqwest::Error),

    #[error("broker devolvió status {0} para el backlog")]
    BadStatus(u16),

    #[error("no se pudo ejecutar el orquestador: {0}")]
    Io(#[from] std::io::Error),

    #[error("orquestador falló ({command}): {stderr}")]
    Orchestrator { command: String, stderr: String },
}

pub type Result<T> = std::result::Result<T, ScaleError>;
