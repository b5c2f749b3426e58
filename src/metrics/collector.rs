//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real. Los workers
//! registran aquí el resultado de cada conexión; nunca se toma el lock
//! mientras se hace I/O.

use crate::dispatch::QueueStats;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Máximo de latencias a guardar (para calcular percentiles)
const MAX_LATENCIES: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Conexiones aceptadas y entregadas a la cola
    accepted: u64,

    /// Conexiones descartadas porque la cola estaba llena
    rejected: u64,

    /// Conexiones que recibieron el archivo completo
    served: u64,

    /// Fallos por tipo (`ServeError::kind`)
    failures: BTreeMap<&'static str, u64>,

    /// Bytes enviados a clientes
    bytes_sent: u64,

    /// Latencias registradas (en microsegundos)
    latencies: VecDeque<u64>,

    /// Conexiones siendo atendidas ahora mismo
    in_flight: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                latencies: VecDeque::with_capacity(MAX_LATENCIES),
                ..MetricsData::default()
            })),
            start_time: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_accepted(&self) {
        self.lock().accepted += 1;
    }

    pub fn record_rejected(&self) {
        self.lock().rejected += 1;
    }

    /// Marca el inicio de la atención de una conexión
    pub fn connection_started(&self) {
        self.lock().in_flight += 1;
    }

    /// Registra una conexión atendida con éxito
    pub fn record_served(&self, bytes: u64, latency: Duration) {
        let mut data = self.lock();
        data.served += 1;
        data.bytes_sent += bytes;
        Self::finish(&mut data, latency);
    }

    /// Registra una conexión fallida (`kind` viene de `ServeError::kind`)
    pub fn record_failed(&self, kind: &'static str, latency: Duration) {
        let mut data = self.lock();
        *data.failures.entry(kind).or_insert(0) += 1;
        Self::finish(&mut data, latency);
    }

    fn finish(data: &mut MetricsData, latency: Duration) {
        data.in_flight = data.in_flight.saturating_sub(1);

        // Si tenemos demasiadas latencias, eliminar las más antiguas
        if data.latencies.len() >= MAX_LATENCIES {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency.as_micros() as u64);
    }

    /// Conexiones siendo atendidas
    pub fn in_flight(&self) -> u64 {
        self.lock().in_flight
    }

    /// Calcula percentiles de latencia
    fn calculate_percentiles(latencies: &VecDeque<u64>) -> LatencySummary {
        if latencies.is_empty() {
            return LatencySummary::default();
        }

        let mut sorted: Vec<u64> = latencies.iter().copied().collect();
        sorted.sort_unstable();

        let len = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencySummary {
            p50: sorted[len * 50 / 100],
            p95: sorted[len * 95 / 100],
            p99: sorted[len * 99 / 100],
            avg: sum / len as u64,
            samples: len,
        }
    }

    /// Obtiene un snapshot de las métricas
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        let data = self.lock();

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            accepted: data.accepted,
            rejected: data.rejected,
            served: data.served,
            failed: data.failures.values().sum(),
            failures: data
                .failures
                .iter()
                .map(|(kind, count)| (kind.to_string(), *count))
                .collect(),
            bytes_sent: data.bytes_sent,
            in_flight: data.in_flight,
            latency_us: Self::calculate_percentiles(&data.latencies),
        }
    }

    /// Snapshot de métricas junto con el estado de la cola, en JSON
    pub fn snapshot_json(&self, queue: &QueueStats) -> String {
        serde_json::json!({
            "connections": self.get_snapshot(),
            "queue": queue,
        })
        .to_string()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Resumen de latencias en microsegundos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
    pub samples: usize,
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub served: u64,
    pub failed: u64,
    pub failures: BTreeMap<String, u64>,
    pub bytes_sent: u64,
    pub in_flight: u64,
    pub latency_us: LatencySummary,
}
