//! Company identifier resolution.
//!
//! Turns a free-form identifier (name or code, domestic or foreign) into
//! a canonical security code plus a market-segment classification.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use prospectus_common::{ProspectusError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::search::SearchProvider;

/// A-share codes are exactly six ASCII digits.
static SIX_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());

/// Yahoo-style domestic code with exchange suffix, e.g. "600519.SS".
static SUFFIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{6})\.(SS|SZ)$").unwrap());

/// A six-digit code labeled by a code/ticker keyword in search text.
static LABELED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(code|代码|ticker)[:：\s]*(\d{6})").unwrap());

/// Bare six-digit number with a known domestic exchange prefix.
static PREFIXED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(60\d{4}|00\d{4}|30\d{4})\b").unwrap());

/// 2-5 letter uppercase token, treated as a foreign ticker.
static FOREIGN_TICKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,5}\b").unwrap());

/// Fixed phrase appended to the raw identifier for disambiguation.
const SEARCH_SUFFIX: &str = "股票代码 stock ticker";

/// Market-segment classification of a canonical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSegment {
    /// Six-digit A-share code, served by the domestic backend
    DomesticListed,
    /// Everything else, served by the international backend
    Other,
}

impl MarketSegment {
    pub fn classify(canonical_code: &str) -> Self {
        if SIX_DIGIT.is_match(canonical_code) {
            MarketSegment::DomesticListed
        } else {
            MarketSegment::Other
        }
    }
}

/// How a resolution was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    CacheHit,
    LiteralPattern,
    ExternalSearch,
}

/// A resolved company identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub raw_query: String,
    pub canonical_code: String,
    pub segment: MarketSegment,
    pub source: ResolutionSource,
}

impl ResolvedEntity {
    fn new(raw_query: &str, canonical_code: String, source: ResolutionSource) -> Self {
        let segment = MarketSegment::classify(&canonical_code);
        Self {
            raw_query: raw_query.to_string(),
            canonical_code,
            segment,
            source,
        }
    }
}

/// Resolver with a process-wide cache.
///
/// Construct once per process and inject into callers. Cache writes are
/// idempotent, so concurrent resolution of the same key is benign.
pub struct EntityResolver {
    search: Arc<dyn SearchProvider>,
    cache: RwLock<HashMap<String, ResolvedEntity>>,
}

impl EntityResolver {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Pre-seed the cache, mainly for tests.
    pub async fn prime(&self, entity: ResolvedEntity) {
        let key = cache_key(&normalize(&entity.raw_query));
        self.cache.write().await.insert(key, entity);
    }

    /// Resolve an identifier. First match wins:
    /// cache → literal six digits → suffixed code → one external search.
    pub async fn resolve(&self, query: &str) -> Result<ResolvedEntity> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Err(ProspectusError::Resolution(
                "Empty identifier after normalization".to_string(),
            ));
        }

        if let Some(cached) = self.cache.read().await.get(&cache_key(&normalized)) {
            debug!(query = %normalized, code = %cached.canonical_code, "Resolver cache hit");
            let mut hit = cached.clone();
            hit.source = ResolutionSource::CacheHit;
            return Ok(hit);
        }

        if SIX_DIGIT.is_match(&normalized) {
            return self
                .cache_and_return(&normalized, normalized.clone(), ResolutionSource::LiteralPattern)
                .await;
        }

        if let Some(caps) = SUFFIXED.captures(&normalized) {
            let code = caps[1].to_string();
            return self
                .cache_and_return(&normalized, code, ResolutionSource::LiteralPattern)
                .await;
        }

        let search_text = self
            .search
            .search(&format!("{normalized} {SEARCH_SUFFIX}"))
            .await
            .map_err(|e| {
                ProspectusError::Resolution(format!("Search failed for '{normalized}': {e}"))
            })?;

        match scan_search_text(&search_text) {
            Some(code) => {
                self.cache_and_return(&normalized, code, ResolutionSource::ExternalSearch)
                    .await
            }
            None => Err(ProspectusError::Resolution(format!(
                "No ticker candidate found for '{normalized}'"
            ))),
        }
    }

    async fn cache_and_return(
        &self,
        normalized: &str,
        code: String,
        source: ResolutionSource,
    ) -> Result<ResolvedEntity> {
        let entity = ResolvedEntity::new(normalized, code, source);

        info!(
            query = %normalized,
            code = %entity.canonical_code,
            segment = ?entity.segment,
            source = ?entity.source,
            "Resolved identifier"
        );

        self.cache
            .write()
            .await
            .insert(cache_key(normalized), entity.clone());
        Ok(entity)
    }
}

/// Trim surrounding whitespace and quote characters.
fn normalize(query: &str) -> String {
    query
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Cache lookups are case-insensitive; resolution itself is not.
fn cache_key(normalized: &str) -> String {
    normalized.to_lowercase()
}

/// Scan search result text for a code, in priority order: labeled code,
/// prefixed bare six digits, foreign ticker token.
fn scan_search_text(text: &str) -> Option<String> {
    if let Some(caps) = LABELED_CODE.captures(text) {
        return Some(caps[2].to_string());
    }
    if let Some(caps) = PREFIXED_CODE.captures(text) {
        return Some(caps[1].to_string());
    }
    if let Some(m) = FOREIGN_TICKER.find(text) {
        return Some(m.as_str().to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Search mock returning fixed text and counting calls.
    struct FixedSearch {
        text: String,
        calls: AtomicUsize,
    }

    impl FixedSearch {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    #[tokio::test]
    async fn six_digit_code_resolves_literally_without_search() {
        let search = Arc::new(FixedSearch::new("unused"));
        let resolver = EntityResolver::new(search.clone());

        let entity = resolver.resolve("600519").await.unwrap();

        assert_eq!(entity.canonical_code, "600519");
        assert_eq!(entity.segment, MarketSegment::DomesticListed);
        assert_eq!(entity.source, ResolutionSource::LiteralPattern);
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn suffixed_code_is_stripped() {
        let search = Arc::new(FixedSearch::new("unused"));
        let resolver = EntityResolver::new(search.clone());

        let entity = resolver.resolve("600519.SS").await.unwrap();
        assert_eq!(entity.canonical_code, "600519");
        assert_eq!(entity.segment, MarketSegment::DomesticListed);
        assert_eq!(search.calls(), 0);

        let sz = resolver.resolve("000858.SZ").await.unwrap();
        assert_eq!(sz.canonical_code, "000858");
    }

    #[tokio::test]
    async fn quotes_and_whitespace_are_normalized() {
        let search = Arc::new(FixedSearch::new("unused"));
        let resolver = EntityResolver::new(search.clone());

        let entity = resolver.resolve("  \"600519\"  ").await.unwrap();
        assert_eq!(entity.canonical_code, "600519");
    }

    #[tokio::test]
    async fn second_resolution_is_a_cache_hit() {
        let search = Arc::new(FixedSearch::new("Kweichow Moutai ticker: 600519"));
        let resolver = EntityResolver::new(search.clone());

        let first = resolver.resolve("Kweichow Moutai").await.unwrap();
        assert_eq!(first.source, ResolutionSource::ExternalSearch);
        assert_eq!(first.canonical_code, "600519");
        assert_eq!(search.calls(), 1);

        let second = resolver.resolve("Kweichow Moutai").await.unwrap();
        assert_eq!(second.source, ResolutionSource::CacheHit);
        assert_eq!(second.canonical_code, first.canonical_code);
        // Idempotent: no second search issued.
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn cache_lookup_is_case_insensitive() {
        let search = Arc::new(FixedSearch::new("NVIDIA Corp trades as NVDA on Nasdaq"));
        let resolver = EntityResolver::new(search.clone());

        resolver.resolve("NVIDIA Corporation").await.unwrap();
        let hit = resolver.resolve("nvidia corporation").await.unwrap();

        assert_eq!(hit.source, ResolutionSource::CacheHit);
        assert_eq!(hit.canonical_code, "NVDA");
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn labeled_code_wins_over_foreign_token() {
        let search = Arc::new(FixedSearch::new("BYD Company code: 002594 listed on SZSE"));
        let resolver = EntityResolver::new(search);

        let entity = resolver.resolve("BYD Company Limited").await.unwrap();
        assert_eq!(entity.canonical_code, "002594");
        assert_eq!(entity.segment, MarketSegment::DomesticListed);
    }

    #[tokio::test]
    async fn prefixed_bare_code_is_found() {
        let search = Arc::new(FixedSearch::new("shares of 300750 rallied today"));
        let resolver = EntityResolver::new(search);

        let entity = resolver.resolve("CATL").await.unwrap();
        assert_eq!(entity.canonical_code, "300750");
        assert_eq!(entity.segment, MarketSegment::DomesticListed);
    }

    #[tokio::test]
    async fn foreign_ticker_token_classifies_other() {
        let search = Arc::new(FixedSearch::new("NVIDIA Corp trades as NVDA on Nasdaq"));
        let resolver = EntityResolver::new(search.clone());

        let entity = resolver.resolve("NVIDIA Corporation").await.unwrap();
        assert_eq!(entity.canonical_code, "NVDA");
        assert_eq!(entity.segment, MarketSegment::Other);
        assert_eq!(entity.source, ResolutionSource::ExternalSearch);
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn no_candidate_is_a_resolution_error() {
        let search = Arc::new(FixedSearch::new("nothing useful here 123"));
        let resolver = EntityResolver::new(search);

        let err = resolver.resolve("Mystery Startup GmbH").await.unwrap_err();
        assert!(matches!(err, ProspectusError::Resolution(_)));
    }

    #[tokio::test]
    async fn primed_cache_short_circuits() {
        let search = Arc::new(FixedSearch::new("unused"));
        let resolver = EntityResolver::new(search.clone());

        resolver
            .prime(ResolvedEntity::new(
                "Tencent",
                "0700.HK".to_string(),
                ResolutionSource::ExternalSearch,
            ))
            .await;

        let hit = resolver.resolve("Tencent").await.unwrap();
        assert_eq!(hit.source, ResolutionSource::CacheHit);
        assert_eq!(search.calls(), 0);
    }

    #[test]
    fn classify_six_digits_is_domestic() {
        assert_eq!(MarketSegment::classify("600519"), MarketSegment::DomesticListed);
        assert_eq!(MarketSegment::classify("688981"), MarketSegment::DomesticListed);
        assert_eq!(MarketSegment::classify("NVDA"), MarketSegment::Other);
        assert_eq!(MarketSegment::classify("0700.HK"), MarketSegment::Other);
    }
}
