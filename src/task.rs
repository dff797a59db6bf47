use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of a task as the client sees it. The server speaks
/// `PENDING`/`DONE`; the translation happens at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_server(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Completed => "DONE",
        }
    }

    pub fn from_server(status: &str) -> Self {
        if status == "PENDING" {
            TaskStatus::Pending
        } else {
            TaskStatus::Completed
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// A user-owned to-do item. `id` and `user_id` are assigned by the server
/// and never modified client-side. The due date is kept as the raw ISO-8601
/// string it arrived as and parsed on demand, so a malformed value degrades
/// at display time instead of failing the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: TaskStatus,
    pub user_id: String,
}

impl Task {
    /// A task is overdue when it is still pending and its due date has
    /// passed. An unparsable due date is never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status != TaskStatus::Pending {
            return false;
        }
        match DateTime::parse_from_rfc3339(&self.due_date) {
            Ok(due) => due.with_timezone(&Utc) < now,
            Err(err) => {
                tracing::debug!(due_date = %self.due_date, %err, "unparsable due date");
                false
            }
        }
    }

    /// Due date as `dd/mm/yyyy` in local time, or the raw string when it
    /// does not parse.
    pub fn due_date_display(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.due_date) {
            Ok(due) => due.with_timezone(&Local).format("%d/%m/%Y").to_string(),
            Err(_) => self.due_date.clone(),
        }
    }
}

/// Payload for creating a task (or the full field set of an edit). The
/// server fills in `id` and `user_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: TaskStatus,
}

/// Sparse update: only the fields present are sent to the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status_only(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            title: Some(draft.title.clone()),
            description: Some(draft.description.clone()),
            due_date: Some(draft.due_date.clone()),
            status: Some(draft.status),
        }
    }
}

/// Aggregate counts shown on the dashboard, recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count(),
            pending: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .count(),
            overdue: tasks.iter().filter(|t| t.is_overdue(now)).count(),
        }
    }
}
