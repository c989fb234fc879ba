//! HTTP client for the Cupcake REST API.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::core::{
    HealthStatus, Job, JobLogIndex, JobStats, MutationReply, NewJob, NewProfile, Profile,
};
use crate::error::{Error, Result};

/// Client for the REST endpoints under `/api`.
///
/// Also derives the WebSocket URLs of the push channels from the same base.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the server at `base` (e.g. `http://nas:8080`).
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::Url(format!("{} cannot be used as a base URL", base)));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `base/<segments...>` with each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(format!("{} cannot be used as a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Same as [`endpoint`](Self::endpoint) with the scheme switched to `ws`/`wss`.
    pub fn ws_endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint(segments)?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| Error::Url(format!("cannot switch {} to {}", url, scheme)))?;
        Ok(url)
    }

    /// `/ws/cupcake`: fleet status snapshots.
    pub fn fleet_url(&self) -> Result<Url> {
        self.ws_endpoint(&["ws", "cupcake"])
    }

    /// `/api/job/{name}/log/latest`: live tail of one job's log.
    pub fn log_tail_url(&self, job: &str) -> Result<Url> {
        self.ws_endpoint(&["api", "job", job, "log", "latest"])
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.get_json(self.endpoint(&["api", "profiles"])?).await
    }

    pub async fn get_profile(&self, name: &str) -> Result<Profile> {
        let value: Value = self.get_json(self.endpoint(&["api", "profile", name])?).await?;
        // Unknown profiles come back as 200 with an `error` field.
        if value.get("error").is_some() {
            return Err(Error::Rejected {
                operation: "get profile",
                target: name.to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create_profile(&self, profile: &NewProfile) -> Result<MutationReply> {
        let url = self.endpoint(&["api", "profile"])?;
        self.mutate(self.http.post(url.clone()).json(profile), &url)
            .await
    }

    pub async fn delete_profile(&self, name: &str) -> Result<MutationReply> {
        let url = self.endpoint(&["api", "profile", name])?;
        self.mutate(self.http.delete(url.clone()), &url).await
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.get_json(self.endpoint(&["api", "jobs"])?).await
    }

    pub async fn create_job(&self, job: &NewJob) -> Result<MutationReply> {
        let url = self.endpoint(&["api", "job"])?;
        self.mutate(self.http.post(url.clone()).json(job), &url).await
    }

    pub async fn delete_job(&self, name: &str) -> Result<MutationReply> {
        let url = self.endpoint(&["api", "job", name])?;
        self.mutate(self.http.delete(url.clone()), &url).await
    }

    /// Counters and last run time of one job, read straight from its stats record.
    pub async fn job_stats(&self, job: &str) -> Result<JobStats> {
        self.get_json(self.endpoint(&["api", "job", job, "stats"])?)
            .await
    }

    /// Listing of archived log chunks for `job`.
    pub async fn list_job_logs(&self, job: &str) -> Result<JobLogIndex> {
        self.get_json(self.endpoint(&["api", "job", job, "logs"])?)
            .await
    }

    /// Plain-text body of archived chunk `index` of `job`'s log.
    pub async fn fetch_historical_log(&self, job: &str, index: usize) -> Result<String> {
        let index = index.to_string();
        let url = self.endpoint(&["api", "job", job, "log", &index])?;
        let response = self.send(self.http.get(url.clone()), &url).await?;
        Ok(response.text().await?)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json(self.endpoint(&["api", "health"])?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.http.get(url.clone()), &url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn mutate(&self, request: RequestBuilder, url: &Url) -> Result<MutationReply> {
        let response = self.send(request, url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        tracing::debug!(url = %url, "API request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}
