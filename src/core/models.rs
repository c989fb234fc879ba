use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Default cron schedule offered by the job creation form.
pub const DEFAULT_SCHEDULE: &str = "*/30 * * * *";
/// Default S3 storage class offered by the job creation form.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD_IA";

/// A backup job as reported by the fleet status snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub storage_class: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub log_retention: Option<String>,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub log_file: Option<String>,
    /// Epoch seconds of the last completed run.
    #[serde(default, deserialize_with = "epoch_seconds")]
    pub last_run: Option<i64>,
    /// Human-readable age of `last_run`, recomputed on every snapshot.
    #[serde(default, skip_serializing)]
    pub last_run_ago: Option<String>,
    #[serde(default)]
    pub uploaded: u64,
    #[serde(default)]
    pub downloaded: u64,
    #[serde(default)]
    pub deleted: u64,
}

/// Per-job stats record served by `GET /api/job/{name}/stats`.
///
/// An empty object means the job has not run yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStats {
    #[serde(default, deserialize_with = "epoch_seconds")]
    pub last_run: Option<i64>,
    #[serde(default)]
    pub uploaded: u64,
    #[serde(default)]
    pub downloaded: u64,
    #[serde(default)]
    pub deleted: u64,
}

/// Read a JSON number of epoch seconds, flooring fractional values.
fn epoch_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<Number>::deserialize(deserializer)?;
    Ok(number.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64))))
}

/// Transfer counters for the job whose log is being viewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounters {
    pub uploaded: u64,
    pub downloaded: u64,
    pub deleted: u64,
}

impl From<&Job> for JobCounters {
    fn from(job: &Job) -> Self {
        Self {
            uploaded: job.uploaded,
            downloaded: job.downloaded,
            deleted: job.deleted,
        }
    }
}

/// An AWS credential profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub aws_access_key_id: String,
    #[serde(default)]
    pub aws_secret_access_key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub role_arn: String,
}

/// Body of `POST /api/profile`. Same shape as [`Profile`].
pub type NewProfile = Profile;

/// Body of `POST /api/job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub name: String,
    pub schedule: String,
    pub source: String,
    pub destination: String,
    pub profile: String,
    pub storage_class: String,
}

impl Default for NewJob {
    fn default() -> Self {
        Self {
            name: String::new(),
            schedule: DEFAULT_SCHEDULE.to_string(),
            source: String::new(),
            destination: String::new(),
            profile: String::new(),
            storage_class: DEFAULT_STORAGE_CLASS.to_string(),
        }
    }
}

/// Opaque health value attached to every fleet snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthStatus(pub Value);

impl HealthStatus {
    /// Overall status string, if the server provided one (e.g. "tasty").
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// Scheduler daemon state, if the server provided one.
    pub fn crond(&self) -> Option<&str> {
        self.0.get("crond").and_then(Value::as_str)
    }
}

/// Message pushed over the fleet status channel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub health: HealthStatus,
}

/// Reply to every mutation endpoint.
///
/// Presence of a non-empty `message` is the server's confirmation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationReply {
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationReply {
    pub fn is_confirmed(&self) -> bool {
        self.message.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// Historical log listing for one job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum JobLogIndex {
    Listing {
        #[serde(default)]
        name: String,
        #[serde(default)]
        count: usize,
        #[serde(default)]
        logs: Vec<String>,
    },
    Paths(Vec<String>),
}

impl JobLogIndex {
    /// Archived chunk paths, newest first.
    pub fn entries(&self) -> &[String] {
        match self {
            JobLogIndex::Listing { logs, .. } => logs,
            JobLogIndex::Paths(paths) => paths,
        }
    }
}

impl Default for JobLogIndex {
    fn default() -> Self {
        JobLogIndex::Paths(Vec::new())
    }
}
