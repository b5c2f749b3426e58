//! # Cola de Trabajo
//! src/dispatch/queue.rs
//!
//! Cola FIFO thread-safe entre el acceptor y los workers.
//!
//! Todo cambio de la cola ocurre bajo un único `Mutex`. Los workers que la
//! encuentran vacía se duermen en un `Condvar` en vez de girar.

use crate::error::QueueFull;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Estado protegido por el mutex
struct Inner<T> {
    items: VecDeque<T>,
    enqueued: u64,
    dequeued: u64,
}

/// Cola FIFO thread-safe, sin límite por defecto
pub struct WorkQueue<T> {
    inner: Arc<Mutex<Inner<T>>>,

    /// Condvar para despertar workers cuando llega trabajo
    condvar: Arc<Condvar>,

    /// Capacidad máxima (0 = sin límite)
    max_capacity: usize,
}

impl<T> WorkQueue<T> {
    /// Crea una cola sin límite de profundidad
    pub fn unbounded() -> Self {
        Self::with_capacity(0)
    }

    /// Crea una cola con capacidad máxima (`0` equivale a sin límite)
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items: VecDeque::new(),
                enqueued: 0,
                dequeued: 0,
            })),
            condvar: Arc::new(Condvar::new()),
            max_capacity,
        }
    }

    // Un worker que entra en pánico nunca tiene el lock tomado mientras
    // atiende una conexión, así que el estado nunca queda a medias.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Encola un elemento al final
    ///
    /// Solo falla si la cola tiene capacidad y está llena; en ese caso el
    /// elemento vuelve al llamador dentro del error.
    pub fn enqueue(&self, item: T) -> Result<(), QueueFull<T>> {
        let mut inner = self.lock();

        if self.max_capacity > 0 && inner.items.len() >= self.max_capacity {
            return Err(QueueFull {
                item,
                capacity: self.max_capacity,
            });
        }

        inner.items.push_back(item);
        inner.enqueued += 1;
        drop(inner);

        // Notificar a un worker esperando
        self.condvar.notify_one();

        Ok(())
    }

    /// Desencola el elemento más antiguo
    ///
    /// Bloquea hasta que haya un elemento disponible
    pub fn dequeue(&self) -> T {
        let mut inner = self.lock();

        loop {
            if let Some(item) = inner.items.pop_front() {
                inner.dequeued += 1;
                return item;
            }

            inner = self
                .condvar
                .wait(inner)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Intenta desencolar sin bloquear
    ///
    /// Retorna `None` si la cola está vacía
    pub fn try_dequeue(&self) -> Option<T> {
        let mut inner = self.lock();
        let item = inner.items.pop_front()?;
        inner.dequeued += 1;
        Some(item)
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retorna la capacidad máxima (0 = sin límite)
    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    /// Obtiene estadísticas de la cola
    pub fn stats(&self) -> QueueStats {
        let inner = self.lock();

        QueueStats {
            pending: inner.items.len(),
            capacity: self.max_capacity,
            total_enqueued: inner.enqueued,
            total_dequeued: inner.dequeued,
        }
    }
}

/// Estadísticas de la cola
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: usize,
    pub capacity: usize,
    pub total_enqueued: u64,
    pub total_dequeued: u64,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            condvar: Arc::clone(&self.condvar),
            max_capacity: self.max_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_single_producer() {
        let queue = WorkQueue::unbounded();

        queue.enqueue("A").unwrap();
        queue.enqueue("B").unwrap();
        queue.enqueue("C").unwrap();

        assert_eq!(queue.try_dequeue(), Some("A"));
        assert_eq!(queue.try_dequeue(), Some("B"));
        assert_eq!(queue.try_dequeue(), Some("C"));
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn test_empty_after_drain_and_refill() {
        let queue = WorkQueue::unbounded();
        assert!(queue.is_empty());

        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue.try_dequeue();
        queue.try_dequeue();
        assert!(queue.is_empty());
        assert_eq!(queue.try_dequeue(), None);

        queue.enqueue(3).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_dequeue(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_unbounded_accepts_many() {
        let queue = WorkQueue::unbounded();
        for i in 0..10_000 {
            queue.enqueue(i).unwrap();
        }
        assert_eq!(queue.len(), 10_000);
        assert_eq!(queue.capacity(), 0);
    }

    #[test]
    fn test_queue_capacity() {
        let queue = WorkQueue::with_capacity(2);

        assert!(queue.enqueue(1).is_ok());
        assert!(queue.enqueue(2).is_ok());

        let rejected = queue.enqueue(3).unwrap_err();
        assert_eq!(rejected.capacity, 2);
        assert_eq!(rejected.into_inner(), 3);

        // Hay lugar otra vez tras desencolar
        queue.try_dequeue();
        assert!(queue.enqueue(4).is_ok());
    }

    #[test]
    fn test_stats_counts() {
        let queue = WorkQueue::with_capacity(10);
        queue.enqueue('x').unwrap();
        queue.enqueue('y').unwrap();
        queue.try_dequeue();

        let stats = queue.stats();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.total_enqueued, 2);
        assert_eq!(stats.total_dequeued, 1);
    }

    #[test]
    fn test_dequeue_blocks_until_enqueue() {
        let queue = WorkQueue::unbounded();
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.dequeue())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!consumer.is_finished());

        queue.enqueue(7u32).unwrap();
        assert_eq!(consumer.join().unwrap(), 7);
    }

    // ==================== Concurrency ====================

    #[test]
    fn test_concurrent_producers_preserve_per_producer_order() {
        let queue = WorkQueue::unbounded();
        let producers: Vec<_> = (0..4u32)
            .map(|p| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..500u32 {
                        queue.enqueue((p, i)).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let mut last_seen = [None::<u32>; 4];
        let mut count = 0;
        while let Some((p, i)) = queue.try_dequeue() {
            if let Some(prev) = last_seen[p as usize] {
                assert!(i > prev, "producer {} out of order: {} after {}", p, i, prev);
            }
            last_seen[p as usize] = Some(i);
            count += 1;
        }
        assert_eq!(count, 2000);
    }

    #[test]
    fn test_concurrent_consumers_no_loss_no_duplication() {
        let queue = WorkQueue::unbounded();
        let total = 5_000u32;
        for i in 0..total {
            queue.enqueue(i).unwrap();
        }

        let consumers: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(item) = queue.try_dequeue() {
                        taken.push(item);
                    }
                    taken
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for consumer in consumers {
            for item in consumer.join().unwrap() {
                assert!(seen.insert(item), "item {} returned twice", item);
            }
        }
        assert_eq!(seen.len(), total as usize);
        assert!(queue.is_empty());

        let stats = queue.stats();
        assert_eq!(stats.total_enqueued, stats.total_dequeued);
    }

    #[test]
    fn test_more_consumers_than_items() {
        let queue = WorkQueue::unbounded();
        for item in ["A", "B", "C"] {
            queue.enqueue(item).unwrap();
        }

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.try_dequeue())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let got: HashSet<_> = results.iter().flatten().copied().collect();
        assert_eq!(got, HashSet::from(["A", "B", "C"]));
        assert_eq!(results.iter().filter(|r| r.is_none()).count(), 2);
    }
}
