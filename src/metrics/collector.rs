//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real.

use crate::tasks::TaskCounts;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Ventana de latencias usada para los percentiles
const LATENCY_WINDOW: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

#[derive(Default)]
struct MetricsData {
    total_requests: u64,

    /// Requests por código de estado
    status_codes: HashMap<u16, u64>,

    /// Requests por patrón de ruta (no por path, para acotar cardinalidad)
    requests_per_route: HashMap<String, u64>,

    /// Últimas latencias en microsegundos
    latencies: Vec<u64>,

    active_connections: u64,
}

/// Snapshot de métricas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub active_connections: u64,
    pub uptime_secs: u64,
    pub latency_p50_us: u64,
    pub latency_p95_us: u64,
    pub latency_p99_us: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                latencies: Vec::with_capacity(LATENCY_WINDOW),
                ..MetricsData::default()
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra un request atendido
    pub fn record_request(&self, route: &str, status_code: u16, latency: Duration) {
        let mut data = self.lock();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        *data.requests_per_route.entry(route.to_string()).or_insert(0) += 1;

        if data.latencies.len() >= LATENCY_WINDOW {
            data.latencies.remove(0);
        }
        data.latencies.push(latency.as_micros() as u64);
    }

    pub fn connection_opened(&self) {
        self.lock().active_connections += 1;
    }

    pub fn connection_closed(&self) {
        let mut data = self.lock();
        data.active_connections = data.active_connections.saturating_sub(1);
    }

    pub fn active_connections(&self) -> u64 {
        self.lock().active_connections
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.lock();
        let (p50, p95, p99) = percentiles(&data.latencies);

        MetricsSnapshot {
            total_requests: data.total_requests,
            active_connections: data.active_connections,
            uptime_secs: self.start_time.elapsed().as_secs(),
            latency_p50_us: p50,
            latency_p95_us: p95,
            latency_p99_us: p99,
        }
    }

    /// Métricas en JSON, junto con el conteo de tareas
    pub fn to_json(&self, tasks: TaskCounts) -> serde_json::Value {
        let snapshot = self.snapshot();
        let data = self.lock();

        let status_codes: HashMap<String, u64> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), *count))
            .collect();

        json!({
            "server": {
                "uptime_seconds": snapshot.uptime_secs,
            },
            "requests": {
                "total": snapshot.total_requests,
                "active_connections": snapshot.active_connections,
                "status_codes": status_codes,
                "routes": data.requests_per_route,
            },
            "latency_us": {
                "p50": snapshot.latency_p50_us,
                "p95": snapshot.latency_p95_us,
                "p99": snapshot.latency_p99_us,
                "samples": data.latencies.len(),
            },
            "tasks": tasks,
        })
    }

    fn lock(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn percentiles(latencies: &[u64]) -> (u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    (
        sorted[len * 50 / 100],
        sorted[len * 95 / 100],
        sorted[len * 99 / 100],
    )
}
