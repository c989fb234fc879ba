//! Observable view state shared by the channels, the resource client and the TUI.
//!
//! Every cell is a `tokio::sync::watch` channel: writers replace or modify the
//! value, readers either clone the current value or subscribe for changes.
//! Each cell has a single owner that writes it:
//!
//! - jobs / health: the fleet status channel (snapshot replace)
//! - profiles: the resource client (list refresh)
//! - log tail: the log tail channel, guarded by a per-session id
//! - forms / navigator: user actions routed through the dashboard

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::core::{
    CronDescription, FleetSnapshot, HealthStatus, Inventory, Job, JobCounters, JobLogIndex,
    Navigator, NewJob, NewProfile, Page, Profile, describe_cron, format_ago_at,
};

/// Live log tail of the job currently being viewed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTailState {
    /// Job being tailed, if any.
    pub job: Option<String>,
    /// Live lines, each terminated by `\n`.
    pub buffer: String,
    /// Number of lines appended since the tail opened. Views scroll to the
    /// bottom whenever it grows.
    pub lines: u64,
    /// Session allowed to append. Zero when closed.
    pub session: u64,
    /// Archived chunk listing of the tailed job.
    pub history: JobLogIndex,
    /// Archived chunks fetched so far, by index.
    pub chunks: BTreeMap<usize, String>,
}

impl LogTailState {
    pub fn is_open(&self) -> bool {
        self.job.is_some()
    }
}

/// Creation form visibility and drafts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forms {
    pub job_visible: bool,
    pub job: NewJob,
    pub profile_visible: bool,
    pub profile: NewProfile,
}

struct Cells {
    jobs: watch::Sender<Vec<Job>>,
    health: watch::Sender<HealthStatus>,
    profiles: watch::Sender<Vec<Profile>>,
    log_tail: watch::Sender<LogTailState>,
    forms: watch::Sender<Forms>,
    navigator: watch::Sender<Navigator>,
    sessions: AtomicU64,
}

/// Handle to the shared view state. Cheap to clone.
#[derive(Clone)]
pub struct ViewState {
    cells: Arc<Cells>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            cells: Arc::new(Cells {
                jobs: watch::Sender::new(Vec::new()),
                health: watch::Sender::new(HealthStatus::default()),
                profiles: watch::Sender::new(Vec::new()),
                log_tail: watch::Sender::new(LogTailState::default()),
                forms: watch::Sender::new(Forms::default()),
                navigator: watch::Sender::new(Navigator::new()),
                sessions: AtomicU64::new(0),
            }),
        }
    }

    // -- jobs & health ---------------------------------------------------

    pub fn jobs(&self) -> Vec<Job> {
        self.cells.jobs.borrow().clone()
    }

    pub fn subscribe_jobs(&self) -> watch::Receiver<Vec<Job>> {
        self.cells.jobs.subscribe()
    }

    pub fn health(&self) -> HealthStatus {
        self.cells.health.borrow().clone()
    }

    /// Replace jobs and health with `snapshot`, deriving `last_run_ago` against `now_secs`.
    pub fn apply_snapshot(&self, snapshot: FleetSnapshot, now_secs: i64) {
        let FleetSnapshot { mut jobs, health } = snapshot;
        for job in &mut jobs {
            job.last_run_ago = job.last_run.map(|ts| format_ago_at(ts, now_secs));
        }
        self.cells.jobs.send_replace(jobs);
        self.cells.health.send_replace(health);
    }

    // -- profiles --------------------------------------------------------

    pub fn profiles(&self) -> Vec<Profile> {
        self.cells.profiles.borrow().clone()
    }

    pub fn subscribe_profiles(&self) -> watch::Receiver<Vec<Profile>> {
        self.cells.profiles.subscribe()
    }

    pub fn replace_profiles(&self, profiles: Vec<Profile>) {
        self.cells.profiles.send_replace(profiles);
    }

    // -- navigation ------------------------------------------------------

    pub fn inventory(&self) -> Inventory {
        Inventory {
            jobs: self.cells.jobs.borrow().len(),
            profiles: self.cells.profiles.borrow().len(),
        }
    }

    pub fn page(&self) -> Page {
        self.cells.navigator.borrow().page()
    }

    pub fn fragment(&self) -> String {
        self.cells.navigator.borrow().fragment().to_string()
    }

    /// Apply an external fragment change.
    pub fn navigate(&self, fragment: Option<&str>) -> Page {
        let inventory = self.inventory();
        let mut page = Page::Start;
        self.cells.navigator.send_modify(|nav| {
            page = nav.navigate(fragment, inventory);
        });
        page
    }

    /// Show `page`, writing back its fragment.
    pub fn switch_page(&self, page: Page) -> Page {
        let inventory = self.inventory();
        let mut resolved = page;
        self.cells.navigator.send_modify(|nav| {
            resolved = nav.switch_to(page, inventory);
        });
        resolved
    }

    // -- log tail --------------------------------------------------------

    pub fn log_tail(&self) -> LogTailState {
        self.cells.log_tail.borrow().clone()
    }

    pub fn subscribe_log_tail(&self) -> watch::Receiver<LogTailState> {
        self.cells.log_tail.subscribe()
    }

    /// Start a fresh tail of `job` and return the session id allowed to append.
    pub fn begin_tail(&self, job: &str) -> u64 {
        let session = self.cells.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        self.cells.log_tail.send_replace(LogTailState {
            job: Some(job.to_string()),
            session,
            ..LogTailState::default()
        });
        session
    }

    /// Append one live line if `session` still owns the tail.
    pub fn append_line(&self, session: u64, line: &str) -> bool {
        self.cells.log_tail.send_if_modified(|tail| {
            if tail.session != session || session == 0 {
                return false;
            }
            tail.buffer.push_str(line);
            tail.buffer.push('\n');
            tail.lines += 1;
            true
        })
    }

    /// Record the archived chunk listing for `session`'s job.
    pub fn set_log_history(&self, session: u64, history: JobLogIndex) -> bool {
        self.cells.log_tail.send_if_modified(|tail| {
            if tail.session != session || session == 0 {
                return false;
            }
            tail.history = history;
            true
        })
    }

    /// Store an archived chunk if `job` is still the tailed job.
    pub fn set_log_chunk(&self, job: &str, index: usize, text: String) -> bool {
        self.cells.log_tail.send_if_modified(|tail| {
            if tail.job.as_deref() != Some(job) {
                return false;
            }
            tail.chunks.insert(index, text);
            true
        })
    }

    /// Clear the tail: no job, empty buffer, no session.
    pub fn end_tail(&self) {
        self.cells.log_tail.send_replace(LogTailState::default());
    }

    /// Transfer counters of the tailed job, zero when nothing is tailed.
    pub fn selected_counters(&self) -> JobCounters {
        let tail = self.cells.log_tail.borrow();
        let Some(name) = tail.job.as_deref() else {
            return JobCounters::default();
        };
        self.cells
            .jobs
            .borrow()
            .iter()
            .find(|job| job.name == name)
            .map(JobCounters::from)
            .unwrap_or_default()
    }

    // -- forms -----------------------------------------------------------

    pub fn forms(&self) -> Forms {
        self.cells.forms.borrow().clone()
    }

    pub fn show_job_form(&self) {
        self.cells.forms.send_modify(|forms| forms.job_visible = true);
    }

    /// Hide the job form and reset its draft.
    pub fn hide_job_form(&self) {
        self.cells.forms.send_modify(|forms| {
            forms.job_visible = false;
            forms.job = NewJob::default();
        });
    }

    pub fn edit_job_draft(&self, edit: impl FnOnce(&mut NewJob)) {
        self.cells.forms.send_modify(|forms| edit(&mut forms.job));
    }

    /// Preview of the draft's schedule.
    pub fn job_schedule_description(&self) -> CronDescription {
        describe_cron(&self.cells.forms.borrow().job.schedule)
    }

    pub fn show_profile_form(&self) {
        self.cells
            .forms
            .send_modify(|forms| forms.profile_visible = true);
    }

    /// Hide the profile form and reset its draft.
    pub fn hide_profile_form(&self) {
        self.cells.forms.send_modify(|forms| {
            forms.profile_visible = false;
            forms.profile = NewProfile::default();
        });
    }

    pub fn edit_profile_draft(&self, edit: impl FnOnce(&mut NewProfile)) {
        self.cells.forms.send_modify(|forms| edit(&mut forms.profile));
    }
}
