//! # Planificador de Completado
//! src/tasks/scheduler.rs
//!
//! Cada tarea creada recibe su propia unidad de completado: un thread que
//! espera un delay aleatorio y luego aplica la transición a `Ready`.
//!
//! La espera se hace con `recv_timeout` sobre un canal propio de la tarea,
//! así el scheduler puede:
//! - adelantar el completado (`fire`)
//! - esperar a que termine (`wait`)
//! - cancelarlo al apagar el servidor (`cancel`, `shutdown`)
//!
//! Ninguna unidad mantiene locks del store mientras duerme.

use super::task::TaskId;
use rand::Rng;
use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Política de delay antes de completar una tarea
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Delay uniforme en `[min, max]` (inclusive), con resolución de ms
    Uniform { min: Duration, max: Duration },

    /// Delay fijo (útil en tests)
    Fixed(Duration),
}

impl DelayPolicy {
    /// Obtiene el delay para una tarea nueva
    pub fn sample(&self) -> Duration {
        match *self {
            DelayPolicy::Fixed(delay) => delay,
            DelayPolicy::Uniform { min, max } => {
                let lo = min.as_millis() as u64;
                let hi = max.as_millis() as u64;
                if lo >= hi {
                    return min;
                }
                Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
            }
        }
    }

    /// Delay máximo que puede producir la política
    pub fn max_delay(&self) -> Duration {
        match *self {
            DelayPolicy::Fixed(delay) => delay,
            DelayPolicy::Uniform { min, max } => min.max(max),
        }
    }
}

impl Default for DelayPolicy {
    /// Entre 2 y 4 segundos
    fn default() -> Self {
        DelayPolicy::Uniform {
            min: Duration::from_secs(2),
            max: Duration::from_secs(4),
        }
    }
}

/// Señal enviada a una unidad pendiente
enum Signal {
    Fire,
    Cancel,
}

/// Unidad de completado todavía registrada
struct Pending {
    signal: Sender<Signal>,
    thread: JoinHandle<()>,
}

type Registry = Mutex<HashMap<TaskId, Pending>>;

/// Planificador de completados, compartible entre threads
///
/// Si se destruye el último clon, las unidades pendientes terminan sin
/// aplicar su completado.
#[derive(Clone)]
pub struct CompletionScheduler {
    policy: DelayPolicy,
    pending: Arc<Registry>,
}

impl CompletionScheduler {
    pub fn new(policy: DelayPolicy) -> Self {
        Self {
            policy,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn policy(&self) -> DelayPolicy {
        self.policy
    }

    /// Programa `commit` para dentro de un delay muestreado de la política
    ///
    /// No bloquea: retorna en cuanto la unidad quedó registrada.
    pub fn schedule<F>(&self, id: TaskId, commit: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_after(id, self.policy.sample(), commit);
    }

    /// Igual que `schedule` pero con un delay explícito
    pub fn schedule_after<F>(&self, id: TaskId, delay: Duration, commit: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let (signal, receiver) = mpsc::channel();
        let registry = Arc::downgrade(&self.pending);
        let commit = Arc::new(Mutex::new(Some(commit)));
        let unit_commit = Arc::clone(&commit);

        // El registro se mantiene tomado mientras se lanza el thread para que
        // una unidad con delay 0 no intente desregistrarse antes de existir.
        let mut pending = lock(&self.pending);

        let spawned = thread::Builder::new()
            .name(format!("complete-{}", id))
            .spawn(move || {
                match receiver.recv_timeout(delay) {
                    Ok(Signal::Fire) | Err(RecvTimeoutError::Timeout) => run_once(&unit_commit),
                    Ok(Signal::Cancel) | Err(RecvTimeoutError::Disconnected) => {
                        debug!(task_id = %id, "completion cancelled");
                    }
                }
                unregister(&registry, id);
            });

        match spawned {
            Ok(thread) => {
                debug!(task_id = %id, delay_ms = delay.as_millis() as u64, "completion scheduled");
                pending.insert(id, Pending { signal, thread });
            }
            Err(e) => {
                // Sin thread no hay quien complete la tarea más tarde
                drop(pending);
                warn!(task_id = %id, error = %e, "could not spawn completion unit, completing inline");
                run_once(&commit);
            }
        }
    }

    /// Adelanta el completado de una tarea pendiente
    ///
    /// Retorna `false` si la tarea no tiene unidad pendiente.
    pub fn fire(&self, id: TaskId) -> bool {
        let pending = lock(&self.pending);
        match pending.get(&id) {
            Some(unit) => unit.signal.send(Signal::Fire).is_ok(),
            None => false,
        }
    }

    /// Bloquea hasta que la unidad de la tarea termine
    ///
    /// Retorna `false` si no había unidad pendiente: o nunca existió o ya
    /// terminó (la unidad se desregistra después de aplicar el completado).
    pub fn wait(&self, id: TaskId) -> bool {
        let unit = lock(&self.pending).remove(&id);
        match unit {
            Some(unit) => {
                // `unit.signal` sigue vivo durante el join: la unidad
                // no ve el canal desconectado y completa normalmente.
                let _ = unit.thread.join();
                true
            }
            None => false,
        }
    }

    /// Cancela una unidad pendiente sin aplicar su completado
    pub fn cancel(&self, id: TaskId) -> bool {
        let unit = lock(&self.pending).remove(&id);
        match unit {
            Some(unit) => {
                let _ = unit.signal.send(Signal::Cancel);
                let _ = unit.thread.join();
                true
            }
            None => false,
        }
    }

    /// Número de unidades todavía pendientes
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Cancela todas las unidades pendientes y espera a que terminen
    pub fn shutdown(&self) {
        let units: Vec<Pending> = lock(&self.pending).drain().map(|(_, unit)| unit).collect();
        let count = units.len();

        for unit in &units {
            let _ = unit.signal.send(Signal::Cancel);
        }
        for unit in units {
            let _ = unit.thread.join();
        }

        debug!(cancelled = count, "completion scheduler shut down");
    }
}

impl Default for CompletionScheduler {
    fn default() -> Self {
        Self::new(DelayPolicy::default())
    }
}

fn run_once<F: FnOnce()>(slot: &Mutex<Option<F>>) {
    let commit = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(commit) = commit {
        commit();
    }
}

fn unregister(registry: &Weak<Registry>, id: TaskId) {
    if let Some(registry) = registry.upgrade() {
        lock(&registry).remove(&id);
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<TaskId, Pending>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
