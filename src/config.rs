//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./task_server --port 8000 \
//!   --min-delay-ms 2000 \
//!   --max-delay-ms 4000 \
//!   --task-ttl-secs 3600
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! TASK_SERVER_PORT=9000 LOG_LEVEL=debug ./task_server
//! ```

use crate::error::ConfigError;
use crate::tasks::DelayPolicy;
use clap::Parser;
use std::time::Duration;
use tracing::info;

/// Configuración del servidor de tareas
#[derive(Debug, Clone, Parser)]
#[command(name = "task_server")]
#[command(about = "Servidor HTTP/1.0 de tareas simuladas con polling de estado")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8000", env = "TASK_SERVER_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "TASK_SERVER_HOST")]
    pub host: String,

    // === Completado de tareas ===
    /// Delay mínimo antes de que una tarea quede lista (ms)
    #[arg(long = "min-delay-ms", default_value = "2000", env = "MIN_DELAY_MS")]
    pub min_delay_ms: u64,

    /// Delay máximo antes de que una tarea quede lista (ms)
    #[arg(long = "max-delay-ms", default_value = "4000", env = "MAX_DELAY_MS")]
    pub max_delay_ms: u64,

    // === Mantenimiento ===
    /// Segundos que se conserva una tarea lista (0 = para siempre)
    #[arg(long = "task-ttl-secs", default_value = "0", env = "TASK_TTL_SECS")]
    pub task_ttl_secs: u64,

    /// Cada cuántos segundos se buscan tareas expiradas
    #[arg(long = "sweep-interval-secs", default_value = "60", env = "SWEEP_INTERVAL_SECS")]
    pub sweep_interval_secs: u64,

    // === Logging ===
    /// Nivel de log si no se definió `RUST_LOG` (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use task_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.max_delay_ms == 0 {
            return Err(ConfigError::ZeroMaxDelay);
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvertedDelayRange {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        if self.task_ttl_secs > 0 && self.sweep_interval_secs == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }

    /// Política de delay derivada de `min_delay_ms`/`max_delay_ms`
    pub fn delay_policy(&self) -> DelayPolicy {
        if self.min_delay_ms == self.max_delay_ms {
            DelayPolicy::Fixed(Duration::from_millis(self.min_delay_ms))
        } else {
            DelayPolicy::Uniform {
                min: Duration::from_millis(self.min_delay_ms),
                max: Duration::from_millis(self.max_delay_ms),
            }
        }
    }

    /// TTL de tareas listas, `None` si la limpieza está desactivada
    pub fn task_ttl(&self) -> Option<Duration> {
        (self.task_ttl_secs > 0).then(|| Duration::from_secs(self.task_ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Registra un resumen de la configuración efectiva
    pub fn print_summary(&self) {
        info!(address = %self.address(), "network");
        info!(
            min_delay_ms = self.min_delay_ms,
            max_delay_ms = self.max_delay_ms,
            "task completion delay"
        );
        match self.task_ttl() {
            Some(ttl) => info!(
                ttl_secs = ttl.as_secs(),
                sweep_interval_secs = self.sweep_interval_secs,
                "task eviction enabled"
            ),
            None => info!("task eviction disabled, tasks are kept for the process lifetime"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            min_delay_ms: 2000,
            max_delay_ms: 4000,
            task_ttl_secs: 0,
            sweep_interval_secs: 60,
            log_level: "info".to_string(),
        }
    }
}
