//! Common types shared across Prospectus crates.
//!
//! This crate provides the data contracts the orchestrator, resolver,
//! memory, and pipeline crates use to communicate.

pub mod capability;
pub mod error;
pub mod run;

pub use capability::Capability;
pub use error::{ProspectusError, Result};
pub use run::RunContext;
