//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa la recolección y agregación de métricas del servidor:
//! - Contadores de conexiones (aceptadas, rechazadas, atendidas, fallidas)
//! - Bytes enviados
//! - Latencias (p50, p95, p99)
//! - Conexiones en curso

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
