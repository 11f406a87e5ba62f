//! # Task Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de tareas.

use task_server::config::Config;
use task_server::server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::new();

    // RUST_LOG tiene prioridad sobre --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Task Server HTTP/1.0 v{}", env!("CARGO_PKG_VERSION"));
    config.print_summary();

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to start");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}
