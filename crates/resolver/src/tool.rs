//! Fundamentals tool facade.

use std::sync::Arc;

use tracing::warn;

use crate::resolver::EntityResolver;
use crate::router::MarketRouter;

/// "Stock Fundamental Analysis" — resolve an identifier, route to the
/// right backend, render the profile.
///
/// Resolution and backend failures are reported as descriptive strings
/// scoped to the identifier, never raised; the run continues.
pub struct FundamentalsTool {
    resolver: Arc<EntityResolver>,
    router: MarketRouter,
}

impl FundamentalsTool {
    pub fn new(resolver: Arc<EntityResolver>, router: MarketRouter) -> Self {
        Self { resolver, router }
    }

    pub async fn run(&self, query: &str) -> String {
        let entity = match self.resolver.resolve(query).await {
            Ok(entity) => entity,
            Err(e) => {
                warn!(query = %query, error = %e, "Identifier resolution failed");
                return format!("Error: could not find ticker for '{query}': {e}");
            }
        };

        match self.router.fetch(&entity).await {
            Ok(profile) => profile.render(),
            Err(e) => {
                warn!(code = %entity.canonical_code, error = %e, "Backend fetch failed");
                format!("Error analyzing {}: {e}", entity.canonical_code)
            }
        }
    }
}
