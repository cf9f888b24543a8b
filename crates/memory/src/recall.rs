//! Recall tool facade.

use std::sync::Arc;

use tracing::warn;

use crate::store::InsightStore;

const DEFAULT_RECALL_LIMIT: usize = 5;

/// "Search Historical Insights" — lets an agent query long-term memory.
///
/// Store failures degrade to a descriptive string; this tool never
/// raises.
pub struct RecallTool {
    store: Arc<dyn InsightStore>,
    limit: usize,
}

impl RecallTool {
    pub fn new(store: Arc<dyn InsightStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_RECALL_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub async fn run(&self, query: &str) -> String {
        match self.store.recall(query, self.limit).await {
            Ok(snippets) if snippets.is_empty() => {
                "No relevant historical insights found.".to_string()
            }
            Ok(snippets) => format!(
                "Found historical insights:\n{}",
                snippets
                    .iter()
                    .map(|s| format!("- {s}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
            Err(e) => {
                warn!(error = %e, query = %query, "Insight recall failed");
                format!("Memory recall failed: {e}")
            }
        }
    }
}
