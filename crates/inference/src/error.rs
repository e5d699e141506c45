//! Closed error taxonomy and its HTTP rendering.
//!
//! Components below the orchestrator return `anyhow` errors or
//! [`FetchError`](crate::FetchError); the orchestrator folds them into an
//! [`InferenceError`], which is the only thing the HTTP layer renders.

use crate::registry::Role;
use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Result of one orchestrated operation.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Stable classification of every failure the gateway reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field was absent or empty after every extraction strategy.
    MissingInput,
    /// A provider call, an image fetch, or an image decode failed.
    OperationFailed,
    /// No candidate for a role could be initialized at startup.
    InitializationFatal,
}

/// The user-facing operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Summarization,
    Captioning,
    Speech,
}

impl Operation {
    /// Headline rendered in the `error` field of a failure body.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Summarization => "Summarization failed",
            Self::Captioning => "Captioning failed",
            Self::Speech => "Text-to-speech failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summarization => "summarization",
            Self::Captioning => "captioning",
            Self::Speech => "speech synthesis",
        })
    }
}

/// A failure translated into the gateway taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("{message}")]
    MissingInput { message: &'static str },
    #[error("{operation} failed: {detail}")]
    OperationFailed { operation: Operation, detail: String },
    #[error("no {role} candidate could be initialized: {detail}")]
    InitializationFatal { role: Role, detail: String },
}

impl InferenceError {
    /// No text was found in any accepted input shape.
    pub fn missing_text() -> Self {
        Self::MissingInput {
            message: "No text provided",
        }
    }

    /// Neither an uploaded image nor a URL was supplied.
    pub fn missing_image() -> Self {
        Self::MissingInput {
            message: "No image file or url provided",
        }
    }

    /// Wrap an underlying failure. The detail is kept verbatim, including
    /// the context chain of `anyhow` errors.
    pub fn failed(operation: Operation, detail: impl fmt::Display) -> Self {
        Self::OperationFailed {
            operation,
            detail: format!("{detail:#}"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput { .. } => ErrorKind::MissingInput,
            Self::OperationFailed { .. } => ErrorKind::OperationFailed,
            Self::InitializationFatal { .. } => ErrorKind::InitializationFatal,
        }
    }

    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::MissingInput => StatusCode::BAD_REQUEST,
            ErrorKind::OperationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InitializationFatal => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// JSON body for this failure.
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::MissingInput { message } => ErrorBody {
                error: (*message).to_owned(),
                details: None,
            },
            Self::OperationFailed { operation, detail } => ErrorBody {
                error: operation.failure_message().to_owned(),
                details: Some(detail.clone()),
            },
            Self::InitializationFatal { role, detail } => ErrorBody {
                error: format!("No {role} available"),
                details: Some(detail.clone()),
            },
        }
    }
}

/// Wire shape of every failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
