//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes.
//!
//! ```text
//! HTTP/1.0 201 Created\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 52\r\n
//! \r\n
//! {"task_id":"5f0c1d9e-..."}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use task_server::http::{Response, StatusCode};
//! use serde_json::json;
//!
//! let response = Response::json(StatusCode::Created, &json!({"task_id": "abc"}));
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 201 Created"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

/// Respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// HashMap para evitar headers duplicados
    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (versión builder). Si ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el body y calcula `Content-Length`
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self.headers.insert(
            "Content-Length".to_string(),
            self.body.len().to_string(),
        );
        self
    }

    /// Respuesta JSON con el código indicado
    ///
    /// Automáticamente establece `Content-Type: application/json`.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&value.to_string())
    }

    /// Respuesta de error con formato `{"error": "mensaje"}`
    ///
    /// El mensaje se serializa con `serde_json`, así que comillas y
    /// caracteres de control quedan escapados.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    /// Serializa la respuesta completa: status line, headers, línea vacía y body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Valor de un header (comparación exacta del nombre)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Created);
        assert_eq!(response.status(), StatusCode::Created);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_with_body_sets_content_length() {
        let response = Response::new(StatusCode::Ok).with_body("Hello World");

        assert_eq!(response.body(), b"Hello World");
        assert_eq!(response.header("Content-Length"), Some("11"));
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(StatusCode::Ok, &json!({"status": "ready"}));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body(), br#"{"status":"ready"}"#);
    }

    #[test]
    fn test_error_response_escapes_message() {
        let response = Response::error(StatusCode::BadRequest, r#"bad "quote""#);

        let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(parsed["error"], r#"bad "quote""#);
    }

    #[test]
    fn test_to_bytes() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_empty_body_response() {
        let response = Response::new(StatusCode::Created);
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.ends_with("\r\n\r\n"));
    }
}
