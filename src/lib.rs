//! Live client for the Cupcake S3 backup dashboard.
//!
//! Keeps a local, observable copy of the server's jobs, profiles and health
//! through two WebSocket push channels and a small REST client, and drives
//! the dashboard's page navigation.

pub mod api;
pub mod channel;
pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod resources;
pub mod state;

pub use dashboard::Dashboard;
pub use error::{Error, Result};
