use crate::error::{ApiError, Transport};
use crate::task::{Draft, Task, TaskPatch};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_API_URL: &str = "https://backendtodo-nk7m.onrender.com/api";

/// The remote task collection. Every call is exactly one round trip.
pub trait TaskStore {
    /// `Ok(None)` means the server answered with something other than a JSON array.
    fn list(&self) -> Result<Option<Vec<Task>>, ApiError>;
    /// `Ok(None)` means the server accepted the draft but sent no `task` back.
    fn create(&self, draft: &Draft) -> Result<Option<Task>, ApiError>;
    /// `Ok(None)` means the server accepted the patch but sent no `task` back.
    fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Option<Task>, ApiError>;
    fn delete(&self, id: &str) -> Result<(), ApiError>;
}

pub struct HttpTaskStore {
    client: Client,
    base_url: String,
}

impl HttpTaskStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }
}

fn send(request: RequestBuilder) -> Result<Response, Transport> {
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Transport::Status(status));
    }
    Ok(response)
}

// Decoded by hand rather than with `Response::json` so that an empty body
// reads as `null` and bad JSON lands in `Transport::Decode`.
fn read_json(response: Response) -> Result<Value, Transport> {
    let bytes = response.bytes()?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Mutating endpoints wrap the task as `{"task": {...}}`; any other shape
/// carries no task.
fn read_envelope(response: Response) -> Result<Option<Task>, Transport> {
    match read_json(response)?.get("task") {
        Some(task) if !task.is_null() => Ok(Some(Task::deserialize(task)?)),
        _ => Ok(None),
    }
}

impl TaskStore for HttpTaskStore {
    fn list(&self) -> Result<Option<Vec<Task>>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET");
        let body = send(self.client.get(&url))
            .and_then(read_json)
            .map_err(ApiError::Fetch)?;

        if !body.is_array() {
            tracing::warn!("task listing is not an array, treating it as empty");
            return Ok(None);
        }
        let tasks: Vec<Task> = serde_json::from_value(body)
            .map_err(|e| ApiError::Fetch(Transport::Decode(e)))?;
        tracing::info!(count = tasks.len(), "loaded tasks");
        Ok(Some(tasks))
    }

    fn create(&self, draft: &Draft) -> Result<Option<Task>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, title = %draft.title, "POST");
        let task = send(self.client.post(&url).json(draft))
            .and_then(read_envelope)
            .map_err(ApiError::Create)?;
        match &task {
            Some(task) => tracing::info!(id = %task.id, "created task"),
            None => tracing::warn!("create reply has no task"),
        }
        Ok(task)
    }

    fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Option<Task>, ApiError> {
        let url = self.task_url(id);
        tracing::debug!(%url, ?patch, "PATCH");
        let task = send(self.client.patch(&url).json(patch))
            .and_then(read_envelope)
            .map_err(ApiError::Update)?;
        match &task {
            Some(task) => tracing::info!(id = %task.id, status = %task.status, "updated task"),
            None => tracing::warn!(%id, "patch reply has no task"),
        }
        Ok(task)
    }

    fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.task_url(id);
        tracing::debug!(%url, "DELETE");
        send(self.client.delete(&url)).map_err(ApiError::Delete)?;
        tracing::info!(%id, "deleted task");
        Ok(())
    }
}
