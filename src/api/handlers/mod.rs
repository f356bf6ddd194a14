use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::database::{DbConn, DbPool};

pub mod admin;
pub mod clubs;
pub mod players;
pub mod rankings;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

impl AppState {
    pub fn conn(&self) -> Result<DbConn, ApiError> {
        Ok(self.pool.get()?)
    }
}

/// Privilege tiers, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Superadmin,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller's tier from the bearer token and checks it is at
/// least `required`
pub fn require_role(state: &AppState, headers: &HeaderMap, required: Role) -> Result<Role, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    let auth = &state.config.auth;

    let role = if auth.superadmin_token.as_deref() == Some(token) {
        Role::Superadmin
    } else if auth.admin_token.as_deref() == Some(token) {
        Role::Admin
    } else {
        return Err(ApiError::Unauthorized);
    };

    if role < required {
        return Err(ApiError::Forbidden);
    }
    Ok(role)
}
