//! REST API access.
//!
//! - `client`: typed wrappers over the `/api` endpoints
//!
//! Mutation endpoints reply with `{message?}`; interpreting that reply is left
//! to the caller (see `crate::resources`).

pub mod client;

pub use client::ApiClient;
