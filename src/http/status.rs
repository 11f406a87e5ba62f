//! # Códigos de Estado HTTP
//!
//! Códigos que usa el servicio de tareas:
//!
//! - **2xx**: 200 OK, 201 Created
//! - **4xx**: 400, 401, 404, 405
//! - **5xx**: 500 (solo si el request no pudo atenderse)

/// Códigos de estado HTTP soportados por el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 201 Created - Se creó un recurso (tarea o usuario)
    Created = 201,

    /// 400 Bad Request - Body malformado o username duplicado
    BadRequest = 400,

    /// 401 Unauthorized - Credenciales inválidas
    Unauthorized = 401,

    /// 404 Not Found - Ruta o tarea no encontrada
    NotFound = 404,

    /// 405 Method Not Allowed - Verbo incorrecto para la ruta
    MethodNotAllowed = 405,

    /// 500 Internal Server Error
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use task_server::http::StatusCode;
    /// assert_eq!(StatusCode::Created.as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::Created)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "201 Created"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Created.as_u16(), 201);
        assert_eq!(StatusCode::Unauthorized.as_u16(), 401);
        assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    }

    #[test]
    fn test_success_and_client_error() {
        assert!(StatusCode::Created.is_success());
        assert!(!StatusCode::NotFound.is_success());
        assert!(StatusCode::MethodNotAllowed.is_client_error());
        assert!(!StatusCode::InternalServerError.is_client_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Created.to_string(), "201 Created");
        assert_eq!(StatusCode::MethodNotAllowed.to_string(), "405 Method Not Allowed");
    }
}
