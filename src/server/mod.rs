//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee y parsea requests HTTP
//! 4. Genera y envía responses HTTP

pub mod tcp;

pub use tcp::{Server, MAX_REQUEST_BYTES};

use crate::http::Method;
use crate::metrics::metrics_handler;
use crate::router::Router;
use crate::tasks::handlers::{create_task_handler, result_handler, status_handler};
use crate::users::handlers::{login_handler, register_handler};

/// Tabla de rutas del servidor
pub fn build_router() -> Router {
    let mut router = Router::new();

    // Tareas
    router.register(Method::POST, "/task", create_task_handler);
    router.register(Method::GET, "/status/{id}", status_handler);
    router.register(Method::GET, "/result/{id}", result_handler);

    // Usuarios
    router.register(Method::POST, "/register", register_handler);
    router.register(Method::POST, "/login", login_handler);

    router.register(Method::GET, "/metrics", metrics_handler);

    router
}
