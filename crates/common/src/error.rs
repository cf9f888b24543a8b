//! Error types for Prospectus.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProspectusError {
    /// A Capability Invoker call failed or returned unusable output.
    /// Fatal to the enclosing run.
    #[error("Invocation error: {0}")]
    Invocation(String),

    /// The entity resolver found no candidate code for an identifier.
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// A market data backend call failed. Non-fatal; callers degrade
    /// this to a descriptive string scoped to the query.
    #[error("Backend error: {0}")]
    Backend(String),

    /// An insight store append/recall failed. Logged and swallowed by
    /// the pipeline.
    #[error("Store error: {0}")]
    Store(String),

    /// Malformed task graph: duplicate node id or unknown dependency.
    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProspectusError>;
