use std::fmt;

use girder_query::QueryError;

/// Failure reported by a persistence collaborator. The scaffolding treats
/// the message as opaque and propagates it immediately — no retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError(pub String);

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model error: {}", self.0)
    }
}

impl std::error::Error for ModelError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrudError {
    /// Missing field list or hook — fatal, surfaced immediately.
    Config(String),
    /// Read or write authorization failure, tagged with the action.
    PermissionDenied(&'static str),
    NotFound(String),
    /// Raised by the form collaborator; the scaffolding only records it.
    Validation(String),
    Model(String),
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrudError::Config(msg) => write!(f, "configuration error: {msg}"),
            CrudError::PermissionDenied(action) => write!(f, "permission denied: {action}"),
            CrudError::NotFound(what) => write!(f, "not found: {what}"),
            CrudError::Validation(msg) => write!(f, "validation failed: {msg}"),
            CrudError::Model(msg) => write!(f, "model error: {msg}"),
        }
    }
}

impl std::error::Error for CrudError {}

impl CrudError {
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            CrudError::PermissionDenied(_) => http::StatusCode::FORBIDDEN,
            CrudError::NotFound(_) => http::StatusCode::NOT_FOUND,
            CrudError::Validation(_) => http::StatusCode::UNPROCESSABLE_ENTITY,
            CrudError::Config(_) | CrudError::Model(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<QueryError> for CrudError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Config(msg) => CrudError::Config(msg),
        }
    }
}

impl From<ModelError> for CrudError {
    fn from(e: ModelError) -> Self {
        CrudError::Model(e.0)
    }
}
