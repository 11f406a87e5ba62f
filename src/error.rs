//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores del servicio:
//! - `ApiError`: errores de un request concreto, siempre terminales y
//!   convertibles a una respuesta HTTP
//! - `ConfigError`: configuración inválida detectada al arrancar
//! - `ServerError`: errores fatales que terminan el proceso

use crate::http::{Response, StatusCode};
use thiserror::Error;

/// Errores a nivel de request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Verbo HTTP incorrecto para una ruta existente
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Tarea o ruta desconocida
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Body JSON malformado o incompleto
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Usuario ya registrado
    #[error("{0}")]
    Conflict(String),

    /// Credenciales inválidas
    #[error("invalid credentials")]
    Unauthorized,
}

impl ApiError {
    /// Código HTTP asociado al error
    ///
    /// `Conflict` se responde con 400: los clientes del servicio esperan
    /// ese código para un username duplicado.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::MethodNotAllowed,
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::BadRequest(_) | ApiError::Conflict(_) => StatusCode::BadRequest,
            ApiError::Unauthorized => StatusCode::Unauthorized,
        }
    }

    /// Convierte el error en una respuesta `{"error": "..."}`
    pub fn into_response(self) -> Response {
        Response::error(self.status(), &self.to_string())
    }
}

/// Errores de configuración
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("max delay must be > 0")]
    ZeroMaxDelay,

    #[error("min delay ({min} ms) must be <= max delay ({max} ms)")]
    InvertedDelayRange { min: u64, max: u64 },

    #[error("sweep interval must be >= 1 second when task TTL is enabled")]
    ZeroSweepInterval,
}

/// Errores fatales del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
