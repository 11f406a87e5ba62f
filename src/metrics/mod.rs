//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección de métricas del servidor, expuestas en `GET /metrics`:
//! - Contadores de requests (por código y por ruta)
//! - Latencias (p50, p95, p99)
//! - Conexiones activas
//! - Tareas en curso / listas

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};

use crate::error::ApiError;
use crate::http::{Request, Response, StatusCode};
use crate::router::Params;
use crate::state::AppState;

/// Handler para `GET /metrics`
pub fn metrics_handler(
    _req: &Request,
    _params: &Params,
    state: &AppState,
) -> Result<Response, ApiError> {
    let body = state.metrics.to_json(state.tasks.counts());
    Ok(Response::json(StatusCode::Ok, &body))
}
