use common::{TaskId, TaskStatus};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("tarea desconocida: {0}")]
    NotFound(TaskId),

    /// El worker reportó un input distinto al guardado: tarea equivocada o reporte viejo.
    #[error("input reportado no coincide con el de la tarea {id}")]
    InputMismatch { id: TaskId },

    #[error("transición inválida para la tarea {id}: {from} -> {to}")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("lock envenenado: {0}")]
    LockPoisoned(&'static str),
}

impl StoreError {
    /// Fallas de consistencia del protocolo worker <-> broker (no son errores del cliente).
    pub fn is_consistency_fault(&self) -> bool {
        matches!(
            self,
            StoreError::InputMismatch { .. } | StoreError::InvalidTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
