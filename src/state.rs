//! # Estado Compartido
//! src/state.rs
//!
//! Stores que se inyectan en cada handler. Se construyen explícitamente
//! (no hay singletons globales), así cada test trabaja con su propia copia.

use crate::metrics::MetricsCollector;
use crate::tasks::{DelayPolicy, TaskStore};
use crate::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskStore,
    pub users: UserStore,
    pub metrics: MetricsCollector,
}

impl AppState {
    pub fn new(policy: DelayPolicy) -> Self {
        Self {
            tasks: TaskStore::new(policy),
            users: UserStore::new(),
            metrics: MetricsCollector::new(),
        }
    }
}
