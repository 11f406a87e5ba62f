//! # Handlers HTTP para Usuarios
//! src/users/handlers.rs
//!
//! - `POST /register` - body `{"username": "...", "password": "..."}`
//! - `POST /login` - mismo body, retorna `{"token": "fake-token-<username>"}`

use crate::error::ApiError;
use crate::http::{Request, Response, StatusCode};
use crate::router::Params;
use crate::state::AppState;
use crate::users::store::{issue_token, Credentials, UserError};
use serde_json::json;
use tracing::info;

/// Handler para `POST /register`
///
/// Responde 201 sin body si el usuario quedó registrado.
pub fn register_handler(
    req: &Request,
    _params: &Params,
    state: &AppState,
) -> Result<Response, ApiError> {
    let credentials = parse_credentials(req)?;

    state
        .users
        .register(&credentials.username, &credentials.password)
        .map_err(|e| match e {
            UserError::AlreadyExists => ApiError::Conflict(e.to_string()),
        })?;

    info!(username = %credentials.username, "user registered");
    Ok(Response::new(StatusCode::Created).with_body(""))
}

/// Handler para `POST /login`
///
/// # Ejemplo de response
/// ```json
/// {"token": "fake-token-ana"}
/// ```
pub fn login_handler(
    req: &Request,
    _params: &Params,
    state: &AppState,
) -> Result<Response, ApiError> {
    let credentials = parse_credentials(req)?;

    if !state.users.login(&credentials.username, &credentials.password) {
        info!(username = %credentials.username, "login rejected");
        return Err(ApiError::Unauthorized);
    }

    info!(username = %credentials.username, "login accepted");
    Ok(Response::json(
        StatusCode::Ok,
        &json!({ "token": issue_token(&credentials.username) }),
    ))
}

/// Decodifica el primer valor JSON del body
///
/// Los bytes que siguen a ese valor se ignoran y `null` equivale a
/// credenciales vacías. Un body vacío, JSON inválido o tipos incorrectos
/// son `BadRequest`.
fn parse_credentials(req: &Request) -> Result<Credentials, ApiError> {
    let first = serde_json::Deserializer::from_slice(req.body())
        .into_iter::<Option<Credentials>>()
        .next();

    match first {
        Some(Ok(credentials)) => Ok(credentials.unwrap_or_default()),
        Some(Err(e)) => Err(ApiError::BadRequest(e.to_string())),
        None => Err(ApiError::BadRequest("empty body".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::DelayPolicy;

    fn post(path: &str, body: &str) -> Request {
        let raw = format!(
            "POST {} HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}",
            path,
            body.len(),
            body
        );
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn state() -> AppState {
        AppState::new(DelayPolicy::default())
    }

    #[test]
    fn test_register_then_duplicate() {
        let state = state();
        let req = post("/register", r#"{"username":"ana","password":"secreto"}"#);

        let response = register_handler(&req, &Params::default(), &state).unwrap();
        assert_eq!(response.status(), StatusCode::Created);

        let err = register_handler(&req, &Params::default(), &state).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_malformed_bodies() {
        let state = state();

        for body in ["", "  ", "not json", r#"{"username":1,"password":"x"}"#, "[1,2]"] {
            let err = register_handler(&post("/register", body), &Params::default(), &state)
                .unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "body: {}", body);

            let err = login_handler(&post("/login", body), &Params::default(), &state).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "body: {}", body);
        }
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let state = state();

        let response =
            register_handler(&post("/register", r#"{"username":"ana"}"#), &Params::default(), &state)
                .unwrap();
        assert_eq!(response.status(), StatusCode::Created);
        assert!(state.users.login("ana", ""));

        register_handler(&post("/register", "{}"), &Params::default(), &state).unwrap();
        assert!(state.users.login("", ""));
    }

    #[test]
    fn test_null_body_is_empty_credentials() {
        let state = state();

        register_handler(&post("/register", "null"), &Params::default(), &state).unwrap();
        assert!(state.users.login("", ""));

        let err = register_handler(&post("/register", "null"), &Params::default(), &state)
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_trailing_bytes_after_body_are_ignored() {
        let state = state();
        let body = r#"{"username":"ana","password":"pw"} sobra {"#;

        let response = register_handler(&post("/register", body), &Params::default(), &state).unwrap();
        assert_eq!(response.status(), StatusCode::Created);

        let response = login_handler(&post("/login", body), &Params::default(), &state).unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_login_returns_token() {
        let state = state();
        let body = r#"{"username":"ana","password":"secreto"}"#;
        register_handler(&post("/register", body), &Params::default(), &state).unwrap();

        let response = login_handler(&post("/login", body), &Params::default(), &state).unwrap();
        assert_eq!(response.status(), StatusCode::Ok);

        let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(parsed["token"], "fake-token-ana");
    }

    #[test]
    fn test_login_wrong_password() {
        let state = state();
        register_handler(
            &post("/register", r#"{"username":"ana","password":"secreto"}"#),
            &Params::default(),
            &state,
        )
        .unwrap();

        let err = login_handler(
            &post("/login", r#"{"username":"ana","password":"mal"}"#),
            &Params::default(),
            &state,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }
}
