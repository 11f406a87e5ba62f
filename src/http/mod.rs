//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 a mano, sin librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body con `Content-Length`)
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 22\r\n
//! \r\n
//! {"status":"in_progress"}
//! ```

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
