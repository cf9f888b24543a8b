//! Insight store for Prospectus.
//!
//! Categorized, append-only text records written after the Research,
//! Analyze, and Write stages, recallable by later runs:
//!
//! - **Fact**: researched data points
//! - **Conclusion**: analyst takeaways
//! - **ReportSegment**: drafted prose, reusable as writing corpus

pub mod recall;
pub mod store;
pub mod types;

pub use recall::RecallTool;
pub use store::{InMemoryInsightStore, InsightStore};
pub use types::{Insight, InsightCategory};
