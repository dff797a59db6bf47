use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::ApiClient;
use crate::form::{AuthField, AuthForm, TaskField, TaskForm};
use crate::session::User;
use crate::task::{Task, TaskPatch, TaskStats, TaskStatus};

const NOTICE_TTL: Duration = Duration::from_secs(4);
/// Delay between the logout notification and the switch to the login
/// screen.
const LOGOUT_REDIRECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
}

/// Popup overlaying the dashboard.
#[derive(Debug, Clone)]
pub enum Dialog {
    TaskForm(TaskForm),
    ConfirmDelete { id: String, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient status line message, cleared after a few seconds.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    raised_at: Instant,
}

impl Notice {
    fn new(text: String, kind: NoticeKind) -> Self {
        Self {
            text,
            kind,
            raised_at: Instant::now(),
        }
    }
}

/// The id of the task open in the editor wins over any id supplied with
/// the payload; with neither, the save is a create.
fn resolve_save_target<'a>(
    editing: Option<&'a str>,
    payload_id: Option<&'a str>,
) -> Option<&'a str> {
    editing.or(payload_id)
}

/// Application state: current screen, task list, dialog overlay, and the
/// flows that drive the API client. Every mutating flow reloads the full
/// list from the server afterwards; nothing is patched locally.
pub struct App {
    pub api: ApiClient,
    pub screen: Screen,
    pub auth_form: AuthForm,
    pub tasks: Vec<Task>,
    pub selected: usize,
    pub loading: bool,
    pub dialog: Option<Dialog>,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    in_flight: bool,
    logout_at: Option<Instant>,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        let screen = if api.is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        Self {
            api,
            screen,
            auth_form: AuthForm::default(),
            tasks: Vec::new(),
            selected: 0,
            loading: screen == Screen::Dashboard,
            dialog: None,
            notice: None,
            should_quit: false,
            in_flight: false,
            logout_at: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.api.session().map(|s| &s.user)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(&self.tasks, Utc::now())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn is_dashboard(&self) -> bool {
        self.screen == Screen::Dashboard
    }

    /// Housekeeping between events: expire the notice and perform the
    /// delayed post-logout switch to the login screen.
    pub fn tick(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.raised_at.elapsed() >= NOTICE_TTL {
                self.notice = None;
            }
        }
        if let Some(at) = self.logout_at {
            if Instant::now() >= at {
                self.logout_at = None;
                self.tasks.clear();
                self.selected = 0;
                self.dialog = None;
                self.auth_form = AuthForm::default();
                self.screen = Screen::Login;
            }
        }
    }

    pub async fn on_key(&mut self, key: KeyEvent) {
        // Between logout and the redirect the UI is inert.
        if self.logout_at.is_some() {
            return;
        }
        match self.dialog {
            Some(Dialog::TaskForm(_)) => self.on_task_form_key(key).await,
            Some(Dialog::ConfirmDelete { .. }) => self.on_confirm_key(key).await,
            None => match self.screen {
                Screen::Login | Screen::Register => self.on_auth_key(key).await,
                Screen::Dashboard => self.on_dashboard_key(key).await,
            },
        }
    }

    async fn on_auth_key(&mut self, key: KeyEvent) {
        let registering = self.screen == Screen::Register;
        match key.code {
            KeyCode::Tab => self.auth_form.focus_next(registering),
            KeyCode::Enter => self.submit_auth().await,
            KeyCode::Char('r')
                if key.modifiers.contains(KeyModifiers::CONTROL) && !registering =>
            {
                self.screen = Screen::Register;
                self.auth_form = AuthForm::default();
                self.auth_form.focus = AuthField::Name;
            }
            KeyCode::Esc if registering => {
                self.screen = Screen::Login;
                self.auth_form = AuthForm::default();
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Backspace => self.auth_form.pop(),
            KeyCode::Char(c) => self.auth_form.push(c),
            _ => {}
        }
    }

    async fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('n') => self.dialog = Some(Dialog::TaskForm(TaskForm::new())),
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task() {
                    self.dialog = Some(Dialog::TaskForm(TaskForm::edit(task)));
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.dialog = Some(Dialog::ConfirmDelete {
                        id: task.id.clone(),
                        title: task.title.clone(),
                    });
                }
            }
            KeyCode::Char(' ') => self.toggle_selected().await,
            KeyCode::Char('r') => self.load_tasks().await,
            KeyCode::Char('l') => self.logout(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }

    async fn on_task_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.dialog = None;
                return;
            }
            KeyCode::Enter => {
                self.submit_task_form().await;
                return;
            }
            _ => {}
        }
        if let Some(Dialog::TaskForm(form)) = &mut self.dialog {
            match key.code {
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.pop(),
                KeyCode::Left | KeyCode::Right if form.focus == TaskField::Status => {
                    form.toggle_status()
                }
                KeyCode::Char(' ') if form.focus == TaskField::Status => form.toggle_status(),
                KeyCode::Char(c) => form.push(c),
                _ => {}
            }
        }
    }

    async fn on_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete().await,
            KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
            _ => {}
        }
    }

    pub async fn load_tasks(&mut self) {
        self.loading = true;
        match self.api.list_tasks().await {
            Ok(tasks) => {
                self.tasks = tasks;
                if self.selected >= self.tasks.len() {
                    self.selected = self.tasks.len().saturating_sub(1);
                }
            }
            Err(err) => {
                tracing::error!(%err, "failed to load tasks");
                self.tasks.clear();
                self.selected = 0;
                self.error(err.to_string());
            }
        }
        self.loading = false;
    }

    async fn submit_auth(&mut self) {
        if self.in_flight {
            return;
        }
        let registering = self.screen == Screen::Register;
        // Empty fields are rejected locally; nothing is sent.
        let outcome = if registering {
            let request = match self.auth_form.register_request() {
                Ok(request) => request,
                Err(err) => {
                    self.error(err.to_string());
                    return;
                }
            };
            self.in_flight = true;
            self.api.register(request).await
        } else {
            let request = match self.auth_form.login_request() {
                Ok(request) => request,
                Err(err) => {
                    self.error(err.to_string());
                    return;
                }
            };
            self.in_flight = true;
            self.api.login(request).await
        };
        self.in_flight = false;

        match outcome {
            Ok(_) => {
                self.auth_form = AuthForm::default();
                self.screen = Screen::Dashboard;
                self.info(if registering {
                    "Account created"
                } else {
                    "Signed in"
                });
                self.load_tasks().await;
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    async fn submit_task_form(&mut self) {
        if self.in_flight {
            return;
        }
        let Some(Dialog::TaskForm(form)) = &self.dialog else {
            return;
        };
        let editing = form.editing_id().map(str::to_string);
        let (draft, payload_id) = match form.submit() {
            Ok(parts) => parts,
            Err(err) => {
                self.error(err.to_string());
                return;
            }
        };

        let target =
            resolve_save_target(editing.as_deref(), payload_id.as_deref()).map(str::to_string);
        self.in_flight = true;
        let result = match &target {
            Some(id) => self.api.update_task(id, &TaskPatch::from_draft(&draft)).await,
            None => self.api.create_task(&draft).await.map(|_| ()),
        };
        self.in_flight = false;

        match result {
            Ok(()) => {
                // The dialog only closes once the save went through.
                self.dialog = None;
                self.info(if target.is_some() {
                    "Task updated"
                } else {
                    "Task created"
                });
                self.load_tasks().await;
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    async fn confirm_delete(&mut self) {
        if self.in_flight {
            return;
        }
        let Some(Dialog::ConfirmDelete { id, .. }) = &self.dialog else {
            return;
        };
        let id = id.clone();

        self.in_flight = true;
        let result = self.api.delete_task(&id).await;
        self.in_flight = false;
        self.dialog = None;

        match result {
            Ok(()) => {
                self.info("Task deleted");
                self.load_tasks().await;
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    async fn toggle_selected(&mut self) {
        if self.in_flight {
            return;
        }
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let next = task.status.toggled();

        self.in_flight = true;
        let result = self.api.update_task(&id, &TaskPatch::status_only(next)).await;
        self.in_flight = false;

        match result {
            Ok(()) => {
                self.info(match next {
                    TaskStatus::Completed => "Task completed",
                    TaskStatus::Pending => "Task reopened",
                });
                self.load_tasks().await;
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    fn logout(&mut self) {
        self.api.logout();
        self.info("Signed out");
        self.logout_at = Some(Instant::now() + LOGOUT_REDIRECT_DELAY);
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text.into(), NoticeKind::Info));
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text.into(), NoticeKind::Error));
    }
}
