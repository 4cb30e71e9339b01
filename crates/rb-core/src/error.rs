//! # Errors
//!
//! Centralized error handling for the Rusty-Board client.
//! Every failure a user can see is normalized into a [`Status`] record.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Structured error record, as sent by the backend: `{code, name, description}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: i64,
    pub name: String,
    pub description: String,
}

impl Status {
    pub fn new(code: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code, self.name, self.description)
    }
}

/// Failure of a single backend call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a readable response.
    #[error("network failure: {0}")]
    Transport(String),

    /// The backend answered with a structured error record.
    #[error("{0}")]
    Status(Status),

    /// The backend answered `null`.
    #[error("the server returned no result")]
    Empty,

    /// The body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The failure side of every mutation and session operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Rejected before any request was made.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// A component lost track of the id it was supposed to act on.
    ///
    /// Shown as the fixed `400 BadClient` status, which the browser client
    /// called `BadJavascript`.
    #[error("missing {0}")]
    MissingIdentifier(&'static str),
}

impl AppError {
    /// Normalizes the error into the record handlers display.
    pub fn status(&self) -> Status {
        match self {
            AppError::Api(ApiError::Status(status)) => status.clone(),
            AppError::Api(ApiError::Transport(msg)) => Status::new(0, "NetworkError", msg.clone()),
            AppError::Api(ApiError::Empty) => {
                Status::new(0, "NoResult", "The server returned no result.")
            }
            AppError::Api(ApiError::Decode(msg)) => Status::new(0, "BadResponse", msg.clone()),
            AppError::Validation(errors) => Status::new(400, "ValidationError", errors.to_string()),
            AppError::MissingIdentifier(what) => {
                Status::new(400, "BadClient", format!("The {what} is missing."))
            }
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, AppError>;
