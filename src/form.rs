use chrono::{Local, NaiveDate, SecondsFormat, TimeZone, Utc};

use crate::api::{LoginRequest, RegisterRequest};
use crate::task::{Task, TaskDraft, TaskStatus};

/// Local form validation failures. No request is issued when one of these
/// is raised; the message is surfaced as a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Due date is required")]
    MissingDueDate,
    #[error("Due date must be a valid YYYY-MM-DD date")]
    InvalidDueDate,
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Name is required")]
    MissingName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    DueDate,
    Status,
}

/// State of the task editor popup. Lives only while the popup is open; the
/// dashboard rebuilds it from the task being edited (or from defaults) each
/// time it opens.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// Date-only input, `YYYY-MM-DD`.
    pub due_date: String,
    pub status: TaskStatus,
    pub focus: TaskField,
    editing: Option<String>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            status: TaskStatus::Pending,
            focus: TaskField::Title,
            editing: None,
        }
    }

    /// Prefill from an existing task. The due date input keeps only the
    /// date part of the stored timestamp.
    pub fn edit(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task
                .due_date
                .split('T')
                .next()
                .unwrap_or_default()
                .to_string(),
            status: task.status,
            focus: TaskField::Title,
            editing: Some(task.id.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Id of the task being edited, if any.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// The status field only exists when editing, matching the dialog.
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            TaskField::Title => TaskField::Description,
            TaskField::Description => TaskField::DueDate,
            TaskField::DueDate if self.is_editing() => TaskField::Status,
            TaskField::DueDate | TaskField::Status => TaskField::Title,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            TaskField::Title if self.is_editing() => TaskField::Status,
            TaskField::Title => TaskField::DueDate,
            TaskField::Description => TaskField::Title,
            TaskField::DueDate => TaskField::Description,
            TaskField::Status => TaskField::DueDate,
        };
    }

    pub fn push(&mut self, c: char) {
        match self.focus {
            TaskField::Title => self.title.push(c),
            TaskField::Description => self.description.push(c),
            TaskField::DueDate => self.due_date.push(c),
            TaskField::Status => {}
        }
    }

    pub fn pop(&mut self) {
        match self.focus {
            TaskField::Title => {
                self.title.pop();
            }
            TaskField::Description => {
                self.description.pop();
            }
            TaskField::DueDate => {
                self.due_date.pop();
            }
            TaskField::Status => {}
        }
    }

    pub fn toggle_status(&mut self) {
        self.status = self.status.toggled();
    }

    /// Build the save payload: the date-only input becomes a full ISO
    /// timestamp at local midnight, an empty description stays the empty
    /// string. Returns the draft plus the edited task's id when editing.
    pub fn submit(&self) -> Result<(TaskDraft, Option<String>), FormError> {
        if self.title.is_empty() {
            return Err(FormError::MissingTitle);
        }
        if self.due_date.is_empty() {
            return Err(FormError::MissingDueDate);
        }
        let draft = TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: due_date_timestamp(&self.due_date)?,
            status: self.status,
        };
        Ok((draft, self.editing.clone()))
    }
}

/// Convert a `YYYY-MM-DD` input into an ISO-8601 timestamp at local
/// midnight, expressed in UTC.
fn due_date_timestamp(input: &str) -> Result<String, FormError> {
    let date =
        NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| FormError::InvalidDueDate)?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or(FormError::InvalidDueDate)?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or(FormError::InvalidDueDate)?;
    Ok(local
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
}

/// Credential input shared by the login and register screens; the name
/// field is only cycled through when registering.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus: AuthField,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: AuthField::Email,
        }
    }
}

impl AuthForm {
    pub fn focus_next(&mut self, with_name: bool) {
        self.focus = match self.focus {
            AuthField::Name => AuthField::Email,
            AuthField::Email => AuthField::Password,
            AuthField::Password if with_name => AuthField::Name,
            AuthField::Password => AuthField::Email,
        };
    }

    pub fn push(&mut self, c: char) {
        match self.focus {
            AuthField::Name => self.name.push(c),
            AuthField::Email => self.email.push(c),
            AuthField::Password => self.password.push(c),
        }
    }

    pub fn pop(&mut self) {
        match self.focus {
            AuthField::Name => {
                self.name.pop();
            }
            AuthField::Email => {
                self.email.pop();
            }
            AuthField::Password => {
                self.password.pop();
            }
        }
    }

    pub fn login_request(&self) -> Result<LoginRequest, FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }

    pub fn register_request(&self) -> Result<RegisterRequest, FormError> {
        if self.name.is_empty() {
            return Err(FormError::MissingName);
        }
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(RegisterRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveTime};

    fn sample_task() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Buy milk".to_string(),
            description: "2 liters".to_string(),
            due_date: "2024-01-15T03:00:00.000Z".to_string(),
            status: TaskStatus::Completed,
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn edit_prefills_fields_and_keeps_the_date_part() {
        let form = TaskForm::edit(&sample_task());
        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.due_date, "2024-01-15");
        assert_eq!(form.status, TaskStatus::Completed);
        assert_eq!(form.editing_id(), Some("t1"));
    }

    #[test]
    fn submit_produces_a_local_midnight_timestamp() {
        let mut form = TaskForm::new();
        form.title = "Buy milk".to_string();
        form.due_date = "2024-01-15".to_string();

        let (draft, editing) = form.submit().unwrap();
        assert!(editing.is_none());
        assert!(draft.due_date.ends_with('Z'));

        let parsed = DateTime::parse_from_rfc3339(&draft.due_date)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(parsed.date_naive().to_string(), "2024-01-15");
        assert_eq!(parsed.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn submit_defaults_empty_description_to_empty_string() {
        let mut form = TaskForm::new();
        form.title = "Buy milk".to_string();
        form.due_date = "2024-01-15".to_string();
        let (draft, _) = form.submit().unwrap();
        assert_eq!(draft.description, "");
    }

    #[test]
    fn submit_carries_the_edited_task_id() {
        let mut form = TaskForm::edit(&sample_task());
        form.title = "Buy oat milk".to_string();
        let (_, editing) = form.submit().unwrap();
        assert_eq!(editing.as_deref(), Some("t1"));
    }

    #[test]
    fn submit_rejects_missing_title_and_bad_dates() {
        let mut form = TaskForm::new();
        form.due_date = "2024-01-15".to_string();
        assert_eq!(form.submit(), Err(FormError::MissingTitle));

        form.title = "Buy milk".to_string();
        form.due_date = String::new();
        assert_eq!(form.submit(), Err(FormError::MissingDueDate));

        form.due_date = "15/01/2024".to_string();
        assert_eq!(form.submit(), Err(FormError::InvalidDueDate));
    }

    #[test]
    fn status_field_is_only_reachable_when_editing() {
        let mut form = TaskForm::new();
        form.focus = TaskField::DueDate;
        form.focus_next();
        assert_eq!(form.focus, TaskField::Title);

        let mut form = TaskForm::edit(&sample_task());
        form.focus = TaskField::DueDate;
        form.focus_next();
        assert_eq!(form.focus, TaskField::Status);
        form.focus_next();
        assert_eq!(form.focus, TaskField::Title);
    }

    #[test]
    fn auth_form_requires_credentials() {
        let mut form = AuthForm::default();
        assert!(matches!(
            form.login_request(),
            Err(FormError::MissingCredentials)
        ));

        form.email = "ana@example.com".to_string();
        form.password = "secret".to_string();
        assert!(form.login_request().is_ok());
        assert!(matches!(
            form.register_request(),
            Err(FormError::MissingName)
        ));

        form.name = "Ana".to_string();
        assert!(form.register_request().is_ok());
    }

    #[test]
    fn auth_focus_skips_name_on_login() {
        let mut form = AuthForm::default();
        form.focus = AuthField::Password;
        form.focus_next(false);
        assert_eq!(form.focus, AuthField::Email);
        form.focus = AuthField::Password;
        form.focus_next(true);
        assert_eq!(form.focus, AuthField::Name);
    }
}
