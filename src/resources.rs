//! Job and profile mutations, kept consistent with the server.
//!
//! Local state only changes after the server confirms a mutation. A
//! confirmation is a reply carrying a non-empty `message`; anything else
//! (missing message, error status, transport failure) is logged and leaves
//! local state as it was. Nothing is retried.

use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::channel::FleetChannel;
use crate::core::{MutationReply, NewJob, NewProfile};
use crate::error::{Error, Result};
use crate::state::ViewState;

/// How a single user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Server confirmed; local state refreshed.
    Applied,
    /// Server answered without confirming.
    Rejected,
    /// Request failed at the transport or HTTP level.
    Failed,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// Issues CRUD requests and refreshes the affected state on success.
#[derive(Clone)]
pub struct ResourceClient {
    api: ApiClient,
    state: ViewState,
    fleet: FleetChannel,
}

impl ResourceClient {
    pub fn new(api: ApiClient, state: ViewState, fleet: FleetChannel) -> Self {
        Self { api, state, fleet }
    }

    /// Replace the profile collection. Keeps the previous one on failure.
    pub async fn list_profiles(&self) -> Outcome {
        match self.api.list_profiles().await {
            Ok(profiles) => {
                info!(count = profiles.len(), "Profiles loaded");
                self.state.replace_profiles(profiles);
                Outcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Error fetching profiles");
                Outcome::Failed
            }
        }
    }

    /// On confirmation, hide the profile form and reload profiles.
    pub async fn create_profile(&self, profile: &NewProfile) -> Outcome {
        let reply = self.api.create_profile(profile).await;
        let outcome = check(reply, "add profile", &profile.name);
        if outcome.is_applied() {
            self.state.hide_profile_form();
            self.list_profiles().await;
        }
        outcome
    }

    /// On confirmation, reload profiles.
    pub async fn delete_profile(&self, name: &str) -> Outcome {
        let reply = self.api.delete_profile(name).await;
        let outcome = check(reply, "delete profile", name);
        if outcome.is_applied() {
            self.list_profiles().await;
        }
        outcome
    }

    /// On confirmation, hide the job form and reopen the fleet channel so the
    /// new job shows up without waiting for the next periodic push.
    pub async fn create_job(&self, job: &NewJob) -> Outcome {
        let reply = self.api.create_job(job).await;
        let outcome = check(reply, "add job", &job.name);
        if outcome.is_applied() {
            self.state.hide_job_form();
            self.refresh_fleet().await;
        }
        outcome
    }

    /// On confirmation, reopen the fleet channel.
    pub async fn delete_job(&self, name: &str) -> Outcome {
        let reply = self.api.delete_job(name).await;
        let outcome = check(reply, "delete job", name);
        if outcome.is_applied() {
            self.refresh_fleet().await;
        }
        outcome
    }

    /// Fetch archived chunk `index` of `job`'s log and keep it beside the live tail.
    pub async fn fetch_historical_log(&self, job: &str, index: usize) -> Option<String> {
        match self.api.fetch_historical_log(job, index).await {
            Ok(text) => {
                self.state.set_log_chunk(job, index, text.clone());
                Some(text)
            }
            Err(e) => {
                error!(job, index, error = %e, "Error fetching log");
                None
            }
        }
    }

    async fn refresh_fleet(&self) {
        if let Err(e) = self.fleet.open().await {
            error!(error = %e, "Failed to reopen fleet status channel");
        }
    }
}

/// Turn a mutation reply into an [`Outcome`], logging anything but success.
fn check(reply: Result<MutationReply>, operation: &'static str, target: &str) -> Outcome {
    match reply {
        Ok(reply) if reply.is_confirmed() => {
            info!(operation, target, message = reply.message.as_deref(), "Mutation confirmed");
            Outcome::Applied
        }
        Ok(_) => {
            let e = Error::Rejected {
                operation,
                target: target.to_string(),
            };
            warn!(error = %e, "Mutation not confirmed");
            Outcome::Rejected
        }
        Err(e) => {
            error!(operation, target, error = %e, "Mutation failed");
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(message: Option<&str>) -> Result<MutationReply> {
        Ok(MutationReply {
            message: message.map(str::to_string),
        })
    }

    #[test]
    fn confirmed_reply_is_applied() {
        assert_eq!(check(reply(Some("Job added successfully")), "add job", "a"), Outcome::Applied);
    }

    #[test]
    fn missing_or_empty_message_is_rejected() {
        assert_eq!(check(reply(None), "add job", "a"), Outcome::Rejected);
        assert_eq!(check(reply(Some("")), "add job", "a"), Outcome::Rejected);
    }

    #[test]
    fn transport_error_is_failed() {
        let err = Err(Error::Url("bad".into()));
        assert_eq!(check(err, "delete job", "a"), Outcome::Failed);
    }
}
