//! Capability identifiers a task node may use.
//!
//! Declared in `prospectus-common` so the graph executor and the invoker
//! can reference them without circular dependencies.

use serde::{Deserialize, Serialize};

/// A tool a task node is allowed to call through the Capability Invoker.
///
/// The core never interprets tool semantics; the declared set is passed
/// through to the invoker verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Resolve a company identifier and fetch fundamentals
    FinancialDataLookup,
    /// Read a local document/report
    DocumentRead,
    /// Query persisted insights from earlier runs
    MemoryRecall,
    /// Issue a web search
    WebSearch,
    /// Query the local knowledge base
    KnowledgeSearch,
}

impl Capability {
    /// The wire identifier handed to the invoker.
    pub fn id(&self) -> &'static str {
        match self {
            Capability::FinancialDataLookup => "financial-data-lookup",
            Capability::DocumentRead => "document-read",
            Capability::MemoryRecall => "memory-recall",
            Capability::WebSearch => "web-search",
            Capability::KnowledgeSearch => "knowledge-search",
        }
    }
}
