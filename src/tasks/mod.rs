//! # Sistema de Tareas
//!
//! Tareas simuladas que pasan de `in_progress` a `ready` tras un delay
//! aleatorio.
//!
//! ## Endpoints
//!
//! - `POST /task` - Crear tarea
//! - `GET /status/{id}` - Consultar estado
//! - `GET /result/{id}` - Obtener resultado

pub mod handlers;
pub mod scheduler;
pub mod store;
pub mod sweeper;
pub mod task;

pub use scheduler::{CompletionScheduler, DelayPolicy};
pub use store::{TaskCounts, TaskStore};
pub use sweeper::Sweeper;
pub use task::{Task, TaskId, TaskStatus, PLACEHOLDER_RESULT};
