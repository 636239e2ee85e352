use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{DateTime, Utc};
use common::{TaskId, TaskStatus};

use crate::error::{Result, StoreError};

/// Registro de una tarea. Fuera del store sólo circulan copias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub status: TaskStatus,
    pub input: String,
    pub output: Vec<String>,

    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Contenido protegido por el lock del store: el mapa y el generador de ids.
/// Asignar el id e insertar el registro pasa bajo el mismo lock de escritura.
#[derive(Debug, Default)]
pub struct Tasks {
    next_id: TaskId,
    by_id: HashMap<TaskId, TaskRecord>,
}

impl Tasks {
    pub fn create(&mut self, input: String) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;

        self.by_id.insert(
            id,
            TaskRecord {
                id,
                status: TaskStatus::Pending,
                input,
                output: Vec::new(),
                submitted_at: Utc::now(),
                started_at: None,
                finished_at: None,
            },
        );
        id
    }

    pub fn get(&self, id: TaskId) -> Result<TaskRecord> {
        self.by_id.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    /// PENDING -> PROCESSING. Sólo se llama con un id recién sacado de la cola.
    pub fn mark_processing(&mut self, id: TaskId) -> Result<&TaskRecord> {
        let task = self.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if task.status != TaskStatus::Pending {
            return Err(StoreError::InvalidTransition {
                id,
                from: task.status,
                to: TaskStatus::Processing,
            });
        }

        task.status = TaskStatus::Processing;
        task.started_at = Some(Utc::now());
        Ok(task)
    }

    /// PROCESSING -> FINISHED, guardando el output una sola vez.
    /// Si algo no cuadra la tarea queda intacta.
    pub fn complete(&mut self, id: TaskId, reported_input: &str, output: Vec<String>) -> Result<()> {
        let task = self.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if task.input != reported_input {
            return Err(StoreError::InputMismatch { id });
        }
        if task.status != TaskStatus::Processing {
            return Err(StoreError::InvalidTransition {
                id,
                from: task.status,
                to: TaskStatus::Finished,
            });
        }

        task.output = output;
        task.status = TaskStatus::Finished;
        task.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Mapa autoritativo id -> tarea, con un único RwLock para todo el store.
#[derive(Debug, Default)]
pub struct TaskStore {
    inner: RwLock<Tasks>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Tasks>> {
        self.inner
            .read()
            .map_err(|_| StoreError::LockPoisoned("task store"))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Tasks>> {
        self.inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("task store"))
    }

    pub fn create(&self, input: String) -> Result<TaskId> {
        Ok(self.write()?.create(input))
    }

    pub fn get(&self, id: TaskId) -> Result<TaskRecord> {
        self.read()?.get(id)
    }

    pub fn complete(&self, id: TaskId, reported_input: &str, output: Vec<String>) -> Result<()> {
        self.write()?.complete(id, reported_input, output)
    }
}
