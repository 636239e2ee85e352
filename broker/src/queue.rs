use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use common::TaskId;
use tokio::sync::Notify;

use crate::error::{Result, StoreError};

/// Cola FIFO de ids pendientes de asignar a un worker.
///
/// `dequeue` bloquea (async) mientras está vacía; cada `enqueue` despierta a un solo
/// consumidor. Un id se entrega exactamente una vez.
#[derive(Debug, Default)]
pub struct PendingQueue {
    ids: Mutex<VecDeque<TaskId>>,
    has_pending: Notify,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<TaskId>>> {
        self.ids
            .lock()
            .map_err(|_| StoreError::LockPoisoned("pending queue"))
    }

    /// Agrega al final. Nunca bloquea al que llama.
    pub fn enqueue(&self, id: TaskId) -> Result<()> {
        self.lock()?.push_back(id);
        self.has_pending.notify_one();
        Ok(())
    }

    pub async fn dequeue(&self) -> Result<TaskId> {
        self.dequeue_with(Ok).await
    }

    /// Espera a que haya un id, lo saca de la cabeza y ejecuta `f` con el lock de la
    /// cola todavía tomado. Para quien mire la cola, sacar el id y lo que haga `f`
    /// ocurren juntos.
    ///
    /// Si `f` falla por un lock envenenado la tarea sigue PENDING, así que el id
    /// vuelve a la cabeza de la cola.
    pub async fn dequeue_with<T, F>(&self, mut f: F) -> Result<T>
    where
        F: FnMut(TaskId) -> Result<T>,
    {
        loop {
            // registrarse antes de mirar la cola, así no se pierde un notify_one
            let notified = self.has_pending.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut ids = self.lock()?;
                if let Some(id) = ids.pop_front() {
                    let out = f(id);
                    if let Err(StoreError::LockPoisoned(_)) = out {
                        ids.push_front(id);
                    }
                    drop(ids);
                    // si quedó algo, que el siguiente consumidor no se quede dormido
                    self.wake_next_if_pending();
                    return out;
                }
            }

            notified.await;
        }
    }

    fn wake_next_if_pending(&self) {
        if self.len() > 0 {
            self.has_pending.notify_one();
        }
    }

    /// Cantidad de ids esperando. Es la métrica de "backlog": no cuenta tareas en PROCESSING.
    pub fn len(&self) -> usize {
        match self.ids.lock() {
            Ok(ids) => ids.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
