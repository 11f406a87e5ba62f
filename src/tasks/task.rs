//! # Estructura de Task
//! src/tasks/task.rs
//!
//! Una tarea tiene identidad inmutable y dos campos mutables (`status` y
//! `result`) que siempre cambian juntos.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Resultado fijo que recibe toda tarea completada
pub const PLACEHOLDER_RESULT: &str = "Fake result: Hello from sandbox!";

/// Identificador único de una tarea (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Genera un ID nuevo con 122 bits aleatorios
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Estado de una tarea
///
/// La única transición válida es `InProgress -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Ready,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Ready => "ready",
        }
    }
}

/// Snapshot de una tarea
///
/// Invariante: `result.is_some()` si y solo si `status == Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    #[serde(rename = "task_id")]
    id: TaskId,
    status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
}

impl Task {
    /// Crea una tarea en `InProgress` sin resultado
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::InProgress,
            result: None,
        }
    }

    /// Pasa la tarea a `Ready` con el resultado fijo
    ///
    /// Retorna `false` si la tarea ya estaba lista (la transición ocurre
    /// una sola vez).
    pub fn complete(&mut self) -> bool {
        if self.status == TaskStatus::Ready {
            return false;
        }
        self.status = TaskStatus::Ready;
        self.result = Some(PLACEHOLDER_RESULT.to_string());
        true
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.status == TaskStatus::Ready
    }
}
