use thiserror::Error;

use crate::prompt::TaskKind;

/// Errors produced while building, sending, or interpreting an analysis request.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The caller named a chart task outside the closed set.
    #[error("unknown analysis task: {0}")]
    UnknownTask(String),

    /// The metric mapping lacks a name the task's template references.
    #[error("missing parameter '{parameter}' for task '{task}'")]
    MissingParameter { task: TaskKind, parameter: String },

    /// A supplied value cannot satisfy the placeholder's format.
    #[error("invalid parameter '{parameter}' for task '{task}': {reason}")]
    InvalidParameter {
        task: TaskKind,
        parameter: String,
        reason: String,
    },

    /// Network or TLS failure reaching the model backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("model backend returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The backend answered successfully but without any message content.
    #[error("model backend returned no content")]
    EmptyCompletion,

    /// The model's output did not parse as, or validate against, the expected shape.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl InsightError {
    /// Returns `true` for failures originating at or on the way to the backend.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            InsightError::Http(_) | InsightError::Upstream { .. } | InsightError::EmptyCompletion
        )
    }

    /// Returns `true` for malformed caller input on the metric path.
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            InsightError::UnknownTask(_)
                | InsightError::MissingParameter { .. }
                | InsightError::InvalidParameter { .. }
        )
    }
}
