//! CLI command implementations

pub mod clean;
pub mod config;
pub mod diff;
pub mod discard;
pub mod recover;
pub mod scan;
