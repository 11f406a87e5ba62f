//! # Store de Usuarios
//! src/users/store.rs
//!
//! Base de usuarios en memoria: `username -> password`.
//!
//! Las contraseñas se guardan en texto plano y el token de login no se
//! puede verificar. El servicio nunca pretendió ofrecer seguridad real.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Prefijo del token devuelto por `/login`
pub const TOKEN_PREFIX: &str = "fake-token-";

/// Body JSON de `/register` y `/login`
///
/// Un campo ausente queda como string vacío.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("user already exists")]
    AlreadyExists,
}

/// Store de usuarios compartible entre threads
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<String, String>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un usuario nuevo
    ///
    /// Falla con `AlreadyExists` si el username ya estaba registrado; la
    /// contraseña original no se modifica.
    pub fn register(&self, username: &str, password: &str) -> Result<(), UserError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(UserError::AlreadyExists);
        }
        users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    /// `true` si el usuario existe y la contraseña coincide exactamente
    pub fn login(&self, username: &str, password: &str) -> bool {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.get(username).is_some_and(|stored| stored == password)
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token opaco derivado del username
pub fn issue_token(username: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, username)
}
