//! Error types for talking to the remote task store.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single round trip failed.
#[derive(Debug, Error)]
pub enum Transport {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One variant per store operation. The view-model only ever shows
/// [`ApiError::user_message`]; the cause goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("listing tasks: {0}")]
    Fetch(#[source] Transport),

    #[error("creating task: {0}")]
    Create(#[source] Transport),

    #[error("updating task: {0}")]
    Update(#[source] Transport),

    #[error("deleting task: {0}")]
    Delete(#[source] Transport),
}

impl ApiError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Fetch(_) => "Failed to load tasks",
            ApiError::Create(_) => "Failed to create task",
            ApiError::Update(_) => "Failed to update task",
            ApiError::Delete(_) => "Failed to delete task",
        }
    }
}
