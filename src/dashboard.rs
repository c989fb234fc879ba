//! View-state coordinator.
//!
//! Owns the two push channels, the resource client and the shared
//! [`ViewState`], and exposes the user actions the presentation layer
//! triggers. Views never mutate state directly; they call into the dashboard
//! and re-render from the state cells.

use std::time::Duration;

use tracing::{error, info};

use crate::api::ApiClient;
use crate::channel::{FleetChannel, LogTail, TailToggle};
use crate::context::AppContext;
use crate::core::{JobCounters, Page, ReconnectBackoff};
use crate::resources::{Outcome, ResourceClient};
use crate::state::ViewState;

/// How long startup waits for the first fleet snapshot before resolving the
/// landing page with whatever has arrived.
pub const FIRST_SNAPSHOT_GRACE: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct Dashboard {
    state: ViewState,
    fleet: FleetChannel,
    log_tail: LogTail,
    resources: ResourceClient,
}

impl Dashboard {
    pub fn new(api: ApiClient, backoff: ReconnectBackoff) -> Self {
        let state = ViewState::new();
        let fleet = FleetChannel::new(api.clone(), state.clone(), backoff);
        let log_tail = LogTail::new(api.clone(), state.clone());
        let resources = ResourceClient::new(api, state.clone(), fleet.clone());
        Self {
            state,
            fleet,
            log_tail,
            resources,
        }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.api.clone(), ctx.config.backoff())
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn fleet(&self) -> &FleetChannel {
        &self.fleet
    }

    pub fn log_tail(&self) -> &LogTail {
        &self.log_tail
    }

    pub fn resources(&self) -> &ResourceClient {
        &self.resources
    }

    /// Open the fleet channel, load profiles, then resolve `fragment`.
    pub async fn start(&self, fragment: Option<&str>, grace: Duration) -> Page {
        let mut jobs = self.state.subscribe_jobs();
        if let Err(e) = self.fleet.open().await {
            error!(error = %e, "Failed to open fleet status channel");
        }
        self.resources.list_profiles().await;

        if tokio::time::timeout(grace, jobs.changed()).await.is_err() {
            info!("No fleet snapshot yet, resolving landing page without it");
        }

        let page = self.state.navigate(fragment);
        info!(%page, "Dashboard started");
        page
    }

    /// Handle an external fragment change.
    pub fn navigate(&self, fragment: Option<&str>) -> Page {
        self.state.navigate(fragment)
    }

    pub fn switch_page(&self, page: Page) -> Page {
        self.state.switch_page(page)
    }

    /// Open, close or switch the live log tail for `job`.
    pub async fn toggle_log(&self, job: &str) -> Option<TailToggle> {
        match self.log_tail.toggle(job).await {
            Ok(toggle) => Some(toggle),
            Err(e) => {
                error!(job, error = %e, "Failed to toggle log tail");
                None
            }
        }
    }

    pub async fn show_historical_log(&self, job: &str, index: usize) -> Option<String> {
        self.resources.fetch_historical_log(job, index).await
    }

    /// Counters of the job whose log is open.
    pub fn selected_counters(&self) -> JobCounters {
        self.state.selected_counters()
    }

    /// Submit the job form's draft.
    pub async fn submit_job_form(&self) -> Outcome {
        let draft = self.state.forms().job;
        self.resources.create_job(&draft).await
    }

    /// Submit the profile form's draft.
    pub async fn submit_profile_form(&self) -> Outcome {
        let draft = self.state.forms().profile;
        self.resources.create_profile(&draft).await
    }

    pub async fn delete_job(&self, name: &str) -> Outcome {
        self.resources.delete_job(name).await
    }

    pub async fn delete_profile(&self, name: &str) -> Outcome {
        self.resources.delete_profile(name).await
    }

    /// Close both channels.
    pub async fn shutdown(&self) {
        self.log_tail.close().await;
        self.fleet.close().await;
    }
}
