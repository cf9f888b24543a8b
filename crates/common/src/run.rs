//! Per-run research parameters.

use serde::{Deserialize, Serialize};

/// Parameters shared by every node in a pipeline run.
///
/// Immutable for the lifetime of a run; instruction templates borrow it
/// when expanding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Industry or company under research
    pub industry: String,

    /// Target reporting period, e.g. "2025"
    pub target_year: String,

    /// Analytical focus, e.g. "growth", "valuation"
    pub focus: String,

    /// Jurisdiction / region scope
    pub province: String,

    /// Free-form depth qualifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
}

impl RunContext {
    pub fn new(
        industry: impl Into<String>,
        target_year: impl Into<String>,
        focus: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            industry: industry.into(),
            target_year: target_year.into(),
            focus: focus.into(),
            province: province.into(),
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: impl Into<String>) -> Self {
        self.depth = Some(depth.into());
        self
    }
}
