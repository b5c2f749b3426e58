//! # Subsistema de Despacho
//! src/dispatch/mod.rs
//!
//! Une la cola de trabajo con el pool de workers:
//!
//! ```text
//! acceptor --submit--> WorkQueue --dequeue--> worker-i --> handler
//! ```
//!
//! El `Dispatcher` se construye una sola vez antes de aceptar conexiones y
//! se comparte por referencia (no hay estado global).

pub mod pool;
pub mod queue;

pub use pool::{Handler, WorkerPool};
pub use queue::{QueueStats, WorkQueue};

use crate::error::QueueFull;
use std::io;

/// Dueño de la cola y del pool
pub struct Dispatcher<T> {
    queue: WorkQueue<T>,
    pool: WorkerPool,
}

impl<T: Send + 'static> Dispatcher<T> {
    /// Crea la cola (`queue_capacity == 0` = sin límite) y arranca `workers`
    /// workers que ejecutan `handler` sobre cada elemento.
    pub fn new(workers: usize, queue_capacity: usize, handler: Handler<T>) -> io::Result<Self> {
        let queue = WorkQueue::with_capacity(queue_capacity);
        let pool = WorkerPool::spawn(workers, queue.clone(), handler)?;

        Ok(Self { queue, pool })
    }

    /// Entrega un elemento a los workers
    ///
    /// Con cola sin límite siempre tiene éxito. Con límite y cola llena, el
    /// elemento vuelve al llamador.
    pub fn submit(&self, item: T) -> Result<(), QueueFull<T>> {
        self.queue.enqueue(item)
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn workers(&self) -> usize {
        self.pool.size()
    }
}
