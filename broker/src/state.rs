// broker/src/state.rs

use std::sync::Arc;

use common::TaskId;
use tracing::{debug, error};

use crate::error::Result;
use crate::queue::PendingQueue;
use crate::store::{TaskRecord, TaskStore};

/// Estado compartido del broker. Cada estructura tiene su propio lock; sólo
/// `fetch` toma los dos a la vez (cola y luego store).
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    // ids pendientes de asignar
    pub queue: Arc<PendingQueue>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea la tarea (PENDING) y la encola.
    pub fn submit(&self, input: String) -> Result<TaskId> {
        let id = self.store.create(input)?;
        self.queue.enqueue(id)?;
        debug!("tarea {} encolada (pendientes={})", id, self.queue.len());
        Ok(id)
    }

    pub fn status(&self, id: TaskId) -> Result<TaskRecord> {
        self.store.get(id)
    }

    /// Bloquea hasta que haya una tarea; la saca de la cola y la marca PROCESSING
    /// en la misma sección crítica. Devuelve una copia del registro.
    pub async fn fetch(&self) -> Result<TaskRecord> {
        let store = self.store.clone();
        self.queue
            .dequeue_with(move |id| -> Result<TaskRecord> {
                let mut tasks = store.write()?;
                let res = tasks.mark_processing(id).cloned();
                if let Err(ref e) = res {
                    // no debería pasar: todo id en la cola es una tarea PENDING
                    error!("id {} salió de la cola pero no se pudo marcar: {}", id, e);
                }
                res
            })
            .await
    }

    /// PROCESSING -> FINISHED, verificando que el input reportado sea el original.
    pub fn complete(&self, id: TaskId, input: &str, output: Vec<String>) -> Result<()> {
        self.store.complete(id, input, output)
    }

    /// Tamaño del backlog: tareas PENDING todavía no pedidas por ningún worker.
    pub fn backlog(&self) -> usize {
        self.queue.len()
    }
}
