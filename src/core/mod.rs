pub mod backoff;
pub mod cron;
pub mod models;
pub mod navigation;
pub mod relative_time;

pub use backoff::ReconnectBackoff;
pub use cron::{CronDescription, describe as describe_cron};
pub use models::{
    FleetSnapshot, HealthStatus, Job, JobCounters, JobLogIndex, JobStats, MutationReply, NewJob,
    NewProfile, Profile,
};
pub use navigation::{Inventory, Navigator, Page};
pub use relative_time::{format_ago, format_ago_at};
