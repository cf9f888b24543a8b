//! Backend routing by market segment.

use std::sync::Arc;

use prospectus_common::Result;
use tracing::debug;

use crate::backend::{CompanyProfile, DomesticBackend, InternationalBackend};
use crate::resolver::{MarketSegment, ResolvedEntity};

/// Dispatches a resolved entity to the backend for its segment.
pub struct MarketRouter {
    domestic: Arc<dyn DomesticBackend>,
    international: Arc<dyn InternationalBackend>,
}

impl MarketRouter {
    pub fn new(
        domestic: Arc<dyn DomesticBackend>,
        international: Arc<dyn InternationalBackend>,
    ) -> Self {
        Self {
            domestic,
            international,
        }
    }

    pub async fn fetch(&self, entity: &ResolvedEntity) -> Result<CompanyProfile> {
        debug!(
            code = %entity.canonical_code,
            segment = ?entity.segment,
            "Routing data fetch"
        );

        match entity.segment {
            MarketSegment::DomesticListed => {
                self.domestic.fetch_by_code(&entity.canonical_code).await
            }
            MarketSegment::Other => {
                self.international
                    .fetch_by_ticker(&entity.canonical_code)
                    .await
            }
        }
    }
}
