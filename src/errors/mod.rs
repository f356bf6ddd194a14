use std::fmt::Display;
use std::str::FromStr;

use rusqlite::ErrorCode;
use rusqlite::ffi::{SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_UNIQUE};
use serde::Serialize;

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failures of mutating admin operations, as shown to the operator
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Conflict(String),

    #[error("cannot delete {entity}: {dependents} dependent record(s)")]
    Referential { entity: &'static str, dependents: i64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("database error")]
    Database(#[from] anyhow::Error),
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Collects field errors and fails once at the end
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Parses a closed-vocabulary field, recording the failure
    pub fn parse<T>(&mut self, field: &'static str, raw: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(FieldError::new(field, e.to_string()));
                None
            }
        }
    }

    pub fn finish(self) -> AdminResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AdminError::Validation(self.errors))
        }
    }
}

/// Turns SQLite constraint violations into the operator-facing taxonomy.
///
/// `conflict` is the message used for a UNIQUE violation, `entity` names the
/// record whose deletion a FOREIGN KEY violation blocked.
pub fn classify_store_error(
    err: rusqlite::Error,
    conflict: &str,
    entity: &'static str,
) -> AdminError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                SQLITE_CONSTRAINT_UNIQUE => return AdminError::Conflict(conflict.to_string()),
                SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return AdminError::Referential {
                        entity,
                        dependents: 0,
                    };
                }
                _ => {}
            }
        }
    }

    AdminError::Database(anyhow::Error::new(err).context(format!("Failed to write {entity}")))
}
