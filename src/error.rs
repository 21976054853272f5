//! Error types for scrumboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown project/card/task, rejected input)
//! - 3: Ingestion failed (draft is structurally invalid)
//! - 4: Operation failed (I/O, serialization, lock contention, corrupt snapshot)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the scrumboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const INGESTION_FAILED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for scrumboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Task not found: {task_id} on card {card_id}")]
    TaskNotFound { card_id: String, task_id: String },

    #[error("Rejected: {0}")]
    Rejected(String),

    // Ingestion failures (exit code 3)
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Invalid project snapshot: {0}")]
    InvalidProject(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::ProjectNotFound(_)
            | Error::CardNotFound(_)
            | Error::TaskNotFound { .. }
            | Error::Rejected(_) => exit_codes::USER_ERROR,

            Error::InvalidDraft(_) => exit_codes::INGESTION_FAILED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::InvalidProject(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured context for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::ProjectNotFound(id) => Some(serde_json::json!({ "project_id": id })),
            Error::CardNotFound(id) => Some(serde_json::json!({ "card_id": id })),
            Error::TaskNotFound { card_id, task_id } => Some(serde_json::json!({
                "card_id": card_id,
                "task_id": task_id,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "lock": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for scrumboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
