//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, path)` a handlers.
//!
//! ```text
//! Request → Router → Handler(Request, Params, AppState) → Response
//! ```
//!
//! Los patrones admiten segmentos literales y capturas `{nombre}`:
//! `/status/{id}` captura `id` en `/status/5f0c...`. Una captura vacía no
//! hace match.
//!
//! - Ningún patrón coincide con el path → 404 Not Found
//! - El path coincide pero no el método → 405 Method Not Allowed

use crate::error::ApiError;
use crate::http::{Method, Request, Response, StatusCode};
use crate::state::AppState;

/// Tipo de función handler
pub type Handler = fn(&Request, &Params, &AppState) -> Result<Response, ApiError>;

/// Etiqueta usada para métricas cuando ninguna ruta coincide
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Parámetros capturados del path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Params con una sola captura (útil en tests de handlers)
    pub fn single(name: &str, value: &str) -> Self {
        Self(vec![(name.to_string(), value.to_string())])
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

struct Route {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handler: Handler,
}

impl Route {
    fn matches(&self, path: &[&str]) -> Option<Params> {
        if self.segments.len() != path.len() {
            return None;
        }

        let mut params = Params::default();
        for (segment, part) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Capture(name) if !part.is_empty() => {
                    params.0.push((name.clone(), part.to_string()));
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

/// Router que mapea rutas a handlers
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una ruta
    ///
    /// # Ejemplo
    /// ```
    /// use task_server::router::{Params, Router};
    /// use task_server::http::{Method, Request, Response, StatusCode};
    /// use task_server::state::AppState;
    /// use task_server::error::ApiError;
    ///
    /// fn hello(_: &Request, _: &Params, _: &AppState) -> Result<Response, ApiError> {
    ///     Ok(Response::new(StatusCode::Ok).with_body("hello"))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello/{name}", hello);
    /// ```
    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler) {
        let segments = split_path(pattern)
            .into_iter()
            .map(|part| match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => Segment::Capture(name.to_string()),
                None => Segment::Literal(part.to_string()),
            })
            .collect();

        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            segments,
            handler,
        });
    }

    /// Ejecuta el handler correspondiente al request
    ///
    /// Retorna la respuesta y el patrón de la ruta que atendió el request
    /// (para métricas).
    pub fn route(&self, request: &Request, state: &AppState) -> (Response, &str) {
        let path = split_path(request.path());
        let mut allowed: Vec<Method> = Vec::new();
        let mut matched_pattern = UNMATCHED_ROUTE;

        for route in &self.routes {
            let Some(params) = route.matches(&path) else {
                continue;
            };

            if route.method == request.method() {
                let mut response = (route.handler)(request, &params, state)
                    .unwrap_or_else(ApiError::into_response);
                add_common_headers(&mut response);
                return (response, route.pattern.as_str());
            }

            allowed.push(route.method);
            matched_pattern = route.pattern.as_str();
        }

        let mut response = if allowed.is_empty() {
            Response::error(
                StatusCode::NotFound,
                &format!("Route not found: {}", request.path()),
            )
        } else {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            ApiError::MethodNotAllowed
                .into_response()
                .with_header("Allow", &allow)
        };

        add_common_headers(&mut response);
        (response, matched_pattern)
    }
}

/// Headers comunes a todas las respuestas
pub(crate) fn add_common_headers(response: &mut Response) {
    response.add_header("Server", "TaskServer/1.0");
    response.add_header("Connection", "close");
}

/// "/status/abc" → ["status", "abc"]; "/" → [""]
fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::DelayPolicy;

    fn echo_id(_req: &Request, params: &Params, _state: &AppState) -> Result<Response, ApiError> {
        Ok(Response::new(StatusCode::Ok).with_body(params.get("id").unwrap_or("-")))
    }

    fn create(_req: &Request, _params: &Params, _state: &AppState) -> Result<Response, ApiError> {
        Ok(Response::new(StatusCode::Created))
    }

    fn failing(_req: &Request, _params: &Params, _state: &AppState) -> Result<Response, ApiError> {
        Err(ApiError::NotFound("task"))
    }

    fn router() -> Router {
        let mut router = Router::new();
        router.register(Method::POST, "/task", create);
        router.register(Method::GET, "/status/{id}", echo_id);
        router.register(Method::GET, "/missing/{id}", failing);
        router
    }

    fn send(router: &Router, raw: &[u8]) -> (Response, String) {
        let state = AppState::new(DelayPolicy::default());
        let request = Request::parse(raw).unwrap();
        let (response, route) = router.route(&request, &state);
        (response, route.to_string())
    }

    #[test]
    fn test_literal_route() {
        let (response, route) = send(&router(), b"POST /task HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(route, "/task");
        assert_eq!(response.header("Connection"), Some("close"));
    }

    #[test]
    fn test_capture_route() {
        let (response, route) = send(&router(), b"GET /status/abc HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"abc");
        assert_eq!(route, "/status/{id}");
    }

    #[test]
    fn test_empty_capture_is_not_found() {
        let (response, route) = send(&router(), b"GET /status/ HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(route, UNMATCHED_ROUTE);
    }

    #[test]
    fn test_wrong_method_is_405() {
        let (response, route) = send(&router(), b"GET /task HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.header("Allow"), Some("POST"));
        assert_eq!(route, "/task");
    }

    #[test]
    fn test_unknown_route() {
        let (response, _) = send(&router(), b"GET /nonexistent HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);

        let (response, _) = send(&router(), b"POST /task/extra HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_handler_error_becomes_response() {
        let (response, _) = send(&router(), b"GET /missing/abc HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.header("Server"), Some("TaskServer/1.0"));
    }

    #[test]
    fn test_params_get() {
        let params = Params::single("id", "42");
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("other"), None);
    }
}
