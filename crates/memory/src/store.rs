//! Insight storage.

use std::sync::Arc;

use async_trait::async_trait;
use prospectus_common::Result;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{Insight, InsightCategory};

/// The narrow interface the pipeline consumes.
///
/// Appends are independent and the store is append-only, so callers
/// never need cross-call locking.
#[async_trait]
pub trait InsightStore: Send + Sync {
    /// Persist one insight. Pipeline callers treat failure as non-fatal.
    async fn append(&self, insight: Insight) -> Result<()>;

    /// Recall up to `limit` snippets relevant to `query`, most recent
    /// first.
    async fn recall(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Process-local store with keyword matching.
///
/// Stands in for the vector-backed store behind the same interface;
/// similarity search internals are an external collaborator.
pub struct InMemoryInsightStore {
    insights: Arc<RwLock<Vec<Insight>>>,
}

impl InMemoryInsightStore {
    pub fn new() -> Self {
        Self {
            insights: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of stored insights.
    pub async fn len(&self) -> usize {
        self.insights.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.insights.read().await.is_empty()
    }

    /// Insights of one category, filtered on metadata key/value pairs.
    pub async fn query(
        &self,
        category: Option<InsightCategory>,
        filters: &[(&str, &str)],
    ) -> Vec<Insight> {
        self.insights
            .read()
            .await
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .filter(|i| {
                filters
                    .iter()
                    .all(|(k, v)| i.metadata.get(*k).map(String::as_str) == Some(*v))
            })
            .cloned()
            .collect()
    }
}

impl Default for InMemoryInsightStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InsightStore for InMemoryInsightStore {
    async fn append(&self, insight: Insight) -> Result<()> {
        debug!(
            insight_id = %insight.id,
            category = ?insight.category,
            "Appending insight"
        );

        self.insights.write().await.push(insight);
        Ok(())
    }

    async fn recall(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let needle = query.to_lowercase();

        debug!(query = %query, limit = limit, "Recalling insights");

        let store = self.insights.read().await;
        let mut matches: Vec<&Insight> = store
            .iter()
            .filter(|i| i.content.to_lowercase().contains(&needle))
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit);

        Ok(matches.iter().map(|i| i.content.clone()).collect())
    }
}
