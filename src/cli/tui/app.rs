//! TUI application state and logic.

use crate::Dashboard;
use crate::core::{NewJob, NewProfile, Page};
use crate::resources::Outcome;

/// Labels of the job form fields, in edit order.
pub const JOB_FIELDS: [&str; 6] = [
    "Name",
    "Schedule",
    "Source",
    "Destination",
    "Profile",
    "Storage class",
];

/// Labels of the profile form fields, in edit order.
pub const PROFILE_FIELDS: [&str; 5] = [
    "Name",
    "Access key ID",
    "Secret access key",
    "Region",
    "Role ARN",
];

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    /// Toggle the live log of the selected job.
    Select,
    /// External navigation to a location fragment.
    Goto(&'static str),
    NextPage,
    New,
    Delete,
    Refresh,
    /// Load the next archived log chunk of the open log.
    Archive,
    Back,
    Input(char),
    Erase,
    NextField,
    PrevField,
    Submit,
}

/// Main TUI application state.
pub struct TuiApp {
    pub dashboard: Dashboard,
    pub selected: usize,
    pub field: usize,
    pub running: bool,
    pub status: Option<String>,
}

impl TuiApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            selected: 0,
            field: 0,
            running: true,
            status: None,
        }
    }

    /// True while a creation form has the keyboard.
    pub fn form_open(&self) -> bool {
        let forms = self.dashboard.state().forms();
        forms.job_visible || forms.profile_visible
    }

    /// Handle an action and update state accordingly.
    pub async fn handle_action(&mut self, action: Action) {
        if self.form_open() {
            self.handle_form_action(action).await;
            return;
        }

        match action {
            Action::Quit => self.running = false,
            Action::Goto(fragment) => {
                self.dashboard.navigate(Some(fragment));
                self.selected = 0;
            }
            Action::NextPage => {
                let next = match self.dashboard.state().page() {
                    Page::Start | Page::Home => Page::Jobs,
                    Page::Jobs => Page::Profiles,
                    Page::Profiles => Page::Home,
                };
                self.dashboard.switch_page(next);
                self.selected = 0;
            }
            Action::Up => self.selected = self.selected.saturating_sub(1),
            Action::Down => {
                if self.selected + 1 < self.list_len() {
                    self.selected += 1;
                }
            }
            Action::Select => self.toggle_selected_log().await,
            Action::New => {
                self.field = 0;
                match self.dashboard.state().page() {
                    Page::Profiles => self.dashboard.state().show_profile_form(),
                    _ => self.dashboard.state().show_job_form(),
                }
            }
            Action::Delete => self.delete_selected().await,
            Action::Refresh => {
                self.status = None;
                if let Err(e) = self.dashboard.fleet().open().await {
                    self.status = Some(format!("Reconnect failed: {}", e));
                }
                self.dashboard.resources().list_profiles().await;
            }
            Action::Archive => self.load_next_archive().await,
            Action::Back => {
                if self.dashboard.state().log_tail().is_open() {
                    self.dashboard.log_tail().close().await;
                }
            }
            _ => {}
        }
    }

    async fn handle_form_action(&mut self, action: Action) {
        let state = self.dashboard.state().clone();
        let forms = state.forms();
        let field_count = if forms.job_visible {
            JOB_FIELDS.len()
        } else {
            PROFILE_FIELDS.len()
        };

        match action {
            Action::Back => {
                if forms.job_visible {
                    state.hide_job_form();
                } else {
                    state.hide_profile_form();
                }
            }
            Action::NextField | Action::Down => self.field = (self.field + 1) % field_count,
            Action::PrevField | Action::Up => {
                self.field = (self.field + field_count - 1) % field_count
            }
            Action::Input(c) => self.edit_field(forms.job_visible, |value| value.push(c)),
            Action::Erase => self.edit_field(forms.job_visible, |value| {
                value.pop();
            }),
            Action::Submit => {
                let (outcome, what) = if forms.job_visible {
                    (self.dashboard.submit_job_form().await, "Job")
                } else {
                    (self.dashboard.submit_profile_form().await, "Profile")
                };
                self.status = Some(match outcome {
                    Outcome::Applied => format!("{} saved", what),
                    Outcome::Rejected => format!("{} was not accepted by the server", what),
                    Outcome::Failed => format!("Could not reach the server to save {}", what),
                });
            }
            Action::Quit => self.running = false,
            _ => {}
        }
    }

    fn edit_field(&self, job_form: bool, edit: impl FnOnce(&mut String)) {
        let state = self.dashboard.state();
        let field = self.field;
        if job_form {
            state.edit_job_draft(|draft| edit(job_field(draft, field)));
        } else {
            state.edit_profile_draft(|draft| edit(profile_field(draft, field)));
        }
    }

    fn list_len(&self) -> usize {
        match self.dashboard.state().page() {
            Page::Jobs => self.dashboard.state().jobs().len(),
            Page::Profiles => self.dashboard.state().profiles().len(),
            _ => 0,
        }
    }

    async fn toggle_selected_log(&mut self) {
        if self.dashboard.state().page() != Page::Jobs {
            return;
        }
        let Some(job) = self.dashboard.state().jobs().get(self.selected).cloned() else {
            return;
        };
        self.dashboard.toggle_log(&job.name).await;
    }

    async fn delete_selected(&mut self) {
        let state = self.dashboard.state().clone();
        let outcome = match state.page() {
            Page::Jobs => match state.jobs().get(self.selected) {
                Some(job) => self.dashboard.delete_job(&job.name).await,
                None => return,
            },
            Page::Profiles => match state.profiles().get(self.selected) {
                Some(profile) => self.dashboard.delete_profile(&profile.name).await,
                None => return,
            },
            _ => return,
        };
        if !outcome.is_applied() {
            self.status = Some("Delete was not confirmed by the server".to_string());
        }
        self.selected = self.selected.min(self.list_len().saturating_sub(1));
    }

    async fn load_next_archive(&mut self) {
        let tail = self.dashboard.state().log_tail();
        let Some(job) = tail.job else {
            return;
        };
        // Archived chunks are numbered from 1; 0 is the live log file.
        let next = tail.chunks.len() + 1;
        if next > tail.history.entries().len() {
            self.status = Some("No more archived logs".to_string());
            return;
        }
        if self.dashboard.show_historical_log(&job, next).await.is_none() {
            self.status = Some(format!("Could not load archived log {}", next));
        }
    }
}

pub fn job_field(draft: &mut NewJob, field: usize) -> &mut String {
    match field {
        0 => &mut draft.name,
        1 => &mut draft.schedule,
        2 => &mut draft.source,
        3 => &mut draft.destination,
        4 => &mut draft.profile,
        _ => &mut draft.storage_class,
    }
}

pub fn profile_field(draft: &mut NewProfile, field: usize) -> &mut String {
    match field {
        0 => &mut draft.name,
        1 => &mut draft.aws_access_key_id,
        2 => &mut draft.aws_secret_access_key,
        3 => &mut draft.region,
        _ => &mut draft.role_arn,
    }
}
