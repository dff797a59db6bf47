use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionStore, User};
use crate::task::{Task, TaskDraft, TaskPatch, TaskStatus};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Raised locally, before any request is attempted.
    #[error("No session token found")]
    MissingToken,

    /// Non-2xx response; carries the server's message when it sent one,
    /// otherwise a per-operation fallback.
    #[error("{0}")]
    Server(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: User,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// A task as the server sends it: camelCase fields, status in server form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    due_date: String,
    status: String,
    user_id: String,
}

impl TaskRecord {
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            status: TaskStatus::from_server(&self.status),
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskBody<'a> {
    title: &'a str,
    description: &'a str,
    due_date: &'a str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
}

impl<'a> TaskPatchBody<'a> {
    fn new(patch: &'a TaskPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            description: patch.description.as_deref(),
            due_date: patch.due_date.as_deref(),
            status: patch.status.map(TaskStatus::as_server),
        }
    }
}

/// Client for the remote task API. Owns the session context: populated by
/// `login`/`register`, cleared by `logout`, persisted only through the
/// session store. Authenticated operations fail with `MissingToken` before
/// touching the network when no session is present.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Self {
        let session = store.load();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
            session,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn token(&self) -> Result<&str, ApiError> {
        self.session
            .as_ref()
            .map(|s| s.token.as_str())
            .ok_or(ApiError::MissingToken)
    }

    pub async fn login(&mut self, request: LoginRequest) -> Result<Session, ApiError> {
        tracing::debug!(email = %request.email, "logging in");
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&request)
            .send()
            .await?;
        let auth = Self::read_auth(response, "Login failed").await?;
        Ok(self.start_session(auth))
    }

    pub async fn register(&mut self, request: RegisterRequest) -> Result<Session, ApiError> {
        tracing::debug!(email = %request.email, "registering account");
        let response = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .json(&request)
            .send()
            .await?;
        let auth = Self::read_auth(response, "Could not create account").await?;
        Ok(self.start_session(auth))
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let token = self.token()?;
        let response = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response, "Could not load tasks").await);
        }
        let records: Vec<TaskRecord> = response.json().await?;
        Ok(records.into_iter().map(TaskRecord::into_task).collect())
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let token = self.token()?;
        let body = TaskBody {
            title: &draft.title,
            description: &draft.description,
            due_date: &draft.due_date,
            status: draft.status.as_server(),
        };
        let response = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response, "Could not create task").await);
        }
        // The response status comes back in server form and is mapped the
        // same way as the list path.
        let record: TaskRecord = response.json().await?;
        Ok(record.into_task())
    }

    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<(), ApiError> {
        let token = self.token()?;
        tracing::debug!(%id, ?patch, "updating task");
        let response = self
            .http
            .put(format!("{}/tasks/{}", self.base_url, id))
            .bearer_auth(token)
            .json(&TaskPatchBody::new(patch))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response, "Could not update task").await);
        }
        Ok(())
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let token = self.token()?;
        tracing::debug!(%id, "deleting task");
        let response = self
            .http
            .delete(format!("{}/tasks/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response, "Could not delete task").await);
        }
        Ok(())
    }

    /// Drop the session context and wipe the stored copy. The caller owns
    /// the notification and the delayed switch back to the login screen.
    pub fn logout(&mut self) {
        tracing::debug!("logging out");
        self.session = None;
        self.store.clear();
    }

    fn start_session(&mut self, auth: AuthResponse) -> Session {
        let session = Session::new(auth.token, auth.user);
        self.store.save(&session);
        self.session = Some(session.clone());
        session
    }

    async fn read_auth(response: Response, fallback: &str) -> Result<AuthResponse, ApiError> {
        if !response.status().is_success() {
            return Err(Self::server_error(response, fallback).await);
        }
        Ok(response.json().await?)
    }

    async fn server_error(response: Response, fallback: &str) -> ApiError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| fallback.to_string());
        tracing::warn!(%status, %message, "request rejected");
        ApiError::Server(message)
    }
}
