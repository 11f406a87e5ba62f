//! # Usuarios
//!
//! Registro y login mínimos con token de mentira.
//!
//! ## Endpoints
//!
//! - `POST /register`
//! - `POST /login`

pub mod handlers;
pub mod store;

pub use store::{issue_token, Credentials, UserError, UserStore};
