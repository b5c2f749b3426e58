//! # Pool Fijo de Workers
//! src/dispatch/pool.rs
//!
//! N threads de larga vida que sacan elementos de la `WorkQueue` y ejecutan
//! el handler sobre cada uno. Los workers nunca terminan: si el handler
//! falla (incluso con un pánico) el worker lo registra y vuelve a la cola.

use crate::dispatch::queue::WorkQueue;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Función que procesa un elemento de la cola hasta completarlo
pub type Handler<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

struct Worker {
    name: String,
    // Nunca se hace join: los workers viven lo que vive el proceso.
    _handle: JoinHandle<()>,
}

/// Pool de tamaño fijo, creado una vez y nunca redimensionado
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Arranca `size` workers sobre `queue`
    ///
    /// Falla si `size` es 0 o si el sistema operativo no puede crear un thread.
    pub fn spawn<T>(size: usize, queue: WorkQueue<T>, handler: Handler<T>) -> io::Result<Self>
    where
        T: Send + 'static,
    {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "worker pool needs at least one worker",
            ));
        }

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let name = format!("worker-{}", id);
            let queue = queue.clone();
            let handler = Arc::clone(&handler);

            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || Self::worker_loop(queue, handler))?;

            workers.push(Worker {
                name,
                _handle: handle,
            });
        }

        info!(workers = size, "worker pool started");
        Ok(Self { workers })
    }

    /// Loop principal del worker
    fn worker_loop<T>(queue: WorkQueue<T>, handler: Handler<T>) {
        debug!("worker started");

        loop {
            // Esperar por trabajo
            let item = queue.dequeue();

            // Un pánico queda contenido en esta iteración
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler(item))) {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(%reason, "handler panicked, worker keeps running");
            }
        }
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Nombres de los threads (`worker-0`, `worker-1`, ...)
    pub fn names(&self) -> Vec<&str> {
        self.workers.iter().map(|w| w.name.as_str()).collect()
    }
}
