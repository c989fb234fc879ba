//! Command-line front ends.

pub mod tui;
