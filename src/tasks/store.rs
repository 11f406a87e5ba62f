//! # Store de Tareas
//! src/tasks/store.rs
//!
//! Mapa concurrente `TaskId -> Task` protegido por un único `RwLock`:
//! - lectores (status/result) avanzan en paralelo
//! - escritores (creación y completado) son exclusivos
//!
//! La creación toma el lock de escritura solo para insertar; la unidad de
//! completado se programa con el lock ya liberado y vuelve a tomarlo
//! únicamente para aplicar la transición.

use super::scheduler::{CompletionScheduler, DelayPolicy};
use super::task::{Task, TaskId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::info;

/// Entrada interna del store
#[derive(Debug, Clone)]
struct Entry {
    task: Task,
    completed_at: Option<Instant>,
}

type TaskMap = RwLock<HashMap<TaskId, Entry>>;

/// Conteo de tareas por estado
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub in_progress: usize,
    pub ready: usize,
}

/// Store de tareas en memoria
///
/// Clonar el store es barato: todos los clones comparten el mismo mapa y
/// el mismo scheduler.
#[derive(Clone)]
pub struct TaskStore {
    tasks: Arc<TaskMap>,
    scheduler: CompletionScheduler,
}

impl TaskStore {
    pub fn new(policy: DelayPolicy) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            scheduler: CompletionScheduler::new(policy),
        }
    }

    /// Crea una tarea en `InProgress` y programa su completado
    ///
    /// Retorna inmediatamente con el snapshot recién creado.
    pub fn create_task(&self) -> Task {
        let task = {
            let mut tasks = write(&self.tasks);
            let id = loop {
                let candidate = TaskId::new();
                if !tasks.contains_key(&candidate) {
                    break candidate;
                }
            };
            let task = Task::new(id);
            tasks.insert(
                id,
                Entry {
                    task: task.clone(),
                    completed_at: None,
                },
            );
            task
        };

        let id = task.id();
        let tasks = Arc::clone(&self.tasks);
        self.scheduler.schedule(id, move || complete(&tasks, id));

        info!(task_id = %id, "task created");
        task
    }

    /// Snapshot consistente de una tarea, o `None` si el ID no existe
    pub fn get_task(&self, id: &TaskId) -> Option<Task> {
        read(&self.tasks).get(id).map(|entry| entry.task.clone())
    }

    pub fn len(&self) -> usize {
        read(&self.tasks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cuenta tareas por estado
    pub fn counts(&self) -> TaskCounts {
        read(&self.tasks)
            .values()
            .fold(TaskCounts::default(), |mut counts, entry| {
                if entry.task.is_ready() {
                    counts.ready += 1;
                } else {
                    counts.in_progress += 1;
                }
                counts
            })
    }

    /// Elimina las tareas `Ready` completadas hace `ttl` o más
    ///
    /// Las tareas en curso nunca se eliminan.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut tasks = write(&self.tasks);
        let before = tasks.len();

        tasks.retain(|_, entry| match entry.completed_at {
            Some(completed_at) => now.duration_since(completed_at) < ttl,
            None => true,
        });

        before - tasks.len()
    }

    /// Scheduler de completados (para adelantar o esperar tareas)
    pub fn scheduler(&self) -> &CompletionScheduler {
        &self.scheduler
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(DelayPolicy::default())
    }
}

/// Aplica `InProgress -> Ready` bajo el lock de escritura
fn complete(tasks: &TaskMap, id: TaskId) {
    let completed = {
        let mut tasks = write(tasks);
        match tasks.get_mut(&id) {
            Some(entry) => {
                let completed = entry.task.complete();
                if completed {
                    entry.completed_at = Some(Instant::now());
                }
                completed
            }
            None => false,
        }
    };

    if completed {
        info!(task_id = %id, "task ready");
    }
}

// Ningún escritor deja una tarea a medio actualizar (status y result se
// asignan juntos en `Task::complete`), así que un lock envenenado se reutiliza.
fn read(tasks: &TaskMap) -> RwLockReadGuard<'_, HashMap<TaskId, Entry>> {
    tasks.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(tasks: &TaskMap) -> RwLockWriteGuard<'_, HashMap<TaskId, Entry>> {
    tasks.write().unwrap_or_else(PoisonError::into_inner)
}
