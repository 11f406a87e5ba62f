//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser HTTP/1.0 (acepta también HTTP/1.1) implementado a mano.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /login HTTP/1.0\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 39\r\n
//! \r\n
//! {"username":"ana","password":"secreto"}
//! ```
//!
//! 1. **Request Line**: `METHOD /path?query VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: delimitado por `Content-Length` cuando viene declarado

use std::collections::HashMap;
use thiserror::Error;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP reconocidos
///
/// Se reconocen más verbos de los que el servicio atiende para que un
/// verbo incorrecto llegue al router y reciba 405 en vez de 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path sin query string (ej: "/status/5f0c...")
    path: String,

    /// Headers tal como llegaron; la búsqueda ignora mayúsculas
    headers: HashMap<String, String>,

    version: String,

    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// El body es más corto que el `Content-Length` declarado
    #[error("Incomplete HTTP request")]
    IncompleteRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use task_server::http::Request;
    ///
    /// let raw = b"GET /status/abc?verbose=1 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/status/abc");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let (head, rest) = match find_header_end(buffer) {
            Some(end) => (&buffer[..end], &buffer[end + HEADER_TERMINATOR.len()..]),
            None => (buffer, &[][..]),
        };

        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;
        let (method, path, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        let body = match content_length(&headers)? {
            Some(len) if rest.len() < len => return Err(ParseError::IncompleteRequest),
            Some(len) => rest[..len].to_vec(),
            None => rest.to_vec(),
        };

        Ok(Request {
            method,
            path,
            headers,
            version,
            body,
        })
    }

    /// Número total de bytes que ocupa el request, si ya se recibieron
    /// los headers completos
    ///
    /// Lo usa el servidor para saber cuándo dejar de leer del socket. Un
    /// `Content-Length` enorme satura en `usize::MAX` en vez de desbordar.
    pub fn expected_len(buffer: &[u8]) -> Option<usize> {
        let end = find_header_end(buffer)?;
        let head = std::str::from_utf8(&buffer[..end]).ok()?;

        let declared = head
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        Some((end + HEADER_TERMINATOR.len()).saturating_add(declared))
    }

    /// Formato: `METHOD /path?query VERSION`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        // La query string no se usa en ninguna ruta
        let path = match parts[1].split_once('?') {
            Some((path, _query)) => path.to_string(),
            None => parts[1].to_string(),
        };

        if !path.starts_with('/') {
            return Err(ParseError::InvalidRequestLine);
        }

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, version))
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_string(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas/minúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

fn content_length(headers: &HashMap<String, String>) -> Result<Option<usize>, ParseError> {
    let Some((name, value)) = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
    else {
        return Ok(None);
    };

    value
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ParseError::InvalidHeader(format!("{}: {}", name, value)))
}
