//! # Limpieza de Tareas Antiguas
//! src/tasks/sweeper.rs
//!
//! Thread de mantenimiento que elimina periódicamente las tareas `Ready`
//! cuyo completado tiene más de `ttl`. Solo se activa si se configuró
//! `--task-ttl-secs`.

use super::store::TaskStore;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Handle del thread de limpieza; al destruirse detiene el thread
pub struct Sweeper {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Lanza el thread de limpieza
    pub fn start(store: TaskStore, ttl: Duration, interval: Duration) -> std::io::Result<Self> {
        let (stop, receiver) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("task-sweeper".to_string())
            .spawn(move || {
                debug!(ttl_secs = ttl.as_secs(), interval_secs = interval.as_secs(), "sweeper started");
                loop {
                    match receiver.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let removed = store.evict_expired(ttl);
                            if removed > 0 {
                                info!(removed, remaining = store.len(), "evicted expired tasks");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("sweeper stopped");
            })?;

        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    /// Detiene el thread y espera a que termine
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
