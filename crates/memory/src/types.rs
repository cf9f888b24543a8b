//! Insight types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category of a persisted insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    /// Raw researched data points
    Fact,
    /// Analyst conclusions
    Conclusion,
    /// Drafted report prose, reusable as writing corpus
    ReportSegment,
}

/// A persisted memory record. Append-only; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Unique ID
    pub id: String,

    /// The actual content
    pub content: String,

    /// Category
    pub category: InsightCategory,

    /// String metadata for filtering (industry, province, year, stage)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Creation timestamp (Unix millis)
    pub created_at: u64,
}

impl Insight {
    pub fn new(content: impl Into<String>, category: InsightCategory) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        Self {
            id: format!("ins_{:024x}", now),
            content: content.into(),
            category,
            metadata: BTreeMap::new(),
            created_at: (now / 1_000_000) as u64,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
