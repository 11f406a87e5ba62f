//! # Handlers HTTP para Tareas
//! src/tasks/handlers.rs
//!
//! - `POST /task`
//! - `GET /status/{id}`
//! - `GET /result/{id}`

use crate::error::ApiError;
use crate::http::{Request, Response, StatusCode};
use crate::router::Params;
use crate::state::AppState;
use crate::tasks::{Task, TaskId};
use serde_json::json;

/// Handler para `POST /task`
///
/// # Ejemplo de response (201)
/// ```json
/// {"task_id": "5f0c1d9e-8c59-4a53-a0d8-3a5b1c2f9e10"}
/// ```
pub fn create_task_handler(
    _req: &Request,
    _params: &Params,
    state: &AppState,
) -> Result<Response, ApiError> {
    let task = state.tasks.create_task();
    Ok(Response::json(
        StatusCode::Created,
        &json!({ "task_id": task.id().to_string() }),
    ))
}

/// Handler para `GET /status/{id}`
///
/// # Ejemplo de response
/// ```json
/// {"status": "in_progress"}
/// ```
pub fn status_handler(
    _req: &Request,
    params: &Params,
    state: &AppState,
) -> Result<Response, ApiError> {
    let task = lookup(params, state)?;
    Ok(Response::json(
        StatusCode::Ok,
        &json!({ "status": task.status().as_str() }),
    ))
}

/// Handler para `GET /result/{id}`
///
/// Mientras la tarea está en curso el resultado es `""`.
pub fn result_handler(
    _req: &Request,
    params: &Params,
    state: &AppState,
) -> Result<Response, ApiError> {
    let task = lookup(params, state)?;
    Ok(Response::json(
        StatusCode::Ok,
        &json!({ "result": task.result().unwrap_or_default() }),
    ))
}

/// Busca la tarea por el ID exacto que se emitió
///
/// Solo la forma canónica (UUID con guiones, en minúsculas) identifica una
/// tarea; cualquier otra escritura, o algo que no es UUID, es 404.
fn lookup(params: &Params, state: &AppState) -> Result<Task, ApiError> {
    params
        .get("id")
        .and_then(|raw| {
            raw.parse::<TaskId>()
                .ok()
                .filter(|id| id.to_string() == raw)
        })
        .and_then(|id| state.tasks.get_task(&id))
        .ok_or(ApiError::NotFound("task"))
}
