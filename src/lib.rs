//! # Task Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 concurrente que simula un backend de ejecución de
//! tareas: el cliente crea una tarea, consulta su estado por polling y,
//! cuando está lista, obtiene un resultado fijo. Incluye además un
//! registro/login mínimo de usuarios.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `server`: Servidor TCP, un thread por conexión
//! - `router`: Enrutamiento `(método, path)` → handler
//! - `tasks`: Store de tareas, completado diferido y limpieza por TTL
//! - `users`: Store de usuarios, registro y login
//! - `metrics`: Recolección de métricas y `GET /metrics`
//! - `state`: Estado compartido inyectado en los handlers
//! - `config`: Configuración por CLI y variables de entorno
//! - `error`: Errores tipados de la API, configuración y servidor
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use task_server::config::Config;
//! use task_server::server::Server;
//!
//! let server = Server::new(Config::default()).unwrap();
//! server.run().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod router;
pub mod server;
pub mod state;
pub mod tasks;
pub mod users;
