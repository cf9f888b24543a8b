//! Market data backends.
//!
//! Each backend assembles a normalized [`CompanyProfile`]; fields a
//! backend cannot supply are reported as explicit "not available" so the
//! rendered shape stays stable for downstream parsing.

use async_trait::async_trait;
use prospectus_common::{ProspectusError, Result};
use serde::Deserialize;
use tracing::debug;

const NOT_AVAILABLE: &str = "not available";

/// Normalized summary record plus a free-text financial excerpt.
#[derive(Debug, Clone)]
pub struct CompanyProfile {
    pub code: String,
    pub market: String,
    pub name: String,
    pub price: String,
    pub market_cap: String,
    pub pe_ratio: String,
    pub sector: String,
    pub recent_financials: String,
}

impl CompanyProfile {
    fn empty(code: &str, market: &str) -> Self {
        Self {
            code: code.to_string(),
            market: market.to_string(),
            name: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            market_cap: NOT_AVAILABLE.to_string(),
            pe_ratio: NOT_AVAILABLE.to_string(),
            sector: NOT_AVAILABLE.to_string(),
            recent_financials: NOT_AVAILABLE.to_string(),
        }
    }

    /// Stable text rendering consumed by agents.
    pub fn render(&self) -> String {
        format!(
            "Analysis for {} ({}):\n\
             Summary:\n\
             \x20 Name: {}\n\
             \x20 Price: {}\n\
             \x20 Market Cap: {}\n\
             \x20 PE Ratio: {}\n\
             \x20 Sector: {}\n\
             \n\
             Recent Financials:\n{}",
            self.code,
            self.market,
            self.name,
            self.price,
            self.market_cap,
            self.pe_ratio,
            self.sector,
            self.recent_financials
        )
    }
}

/// Data source for six-digit A-share codes.
#[async_trait]
pub trait DomesticBackend: Send + Sync {
    async fn fetch_by_code(&self, code: &str) -> Result<CompanyProfile>;
}

/// Data source for foreign tickers.
#[async_trait]
pub trait InternationalBackend: Send + Sync {
    async fn fetch_by_ticker(&self, ticker: &str) -> Result<CompanyProfile>;
}

fn or_na(value: Option<impl ToString>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

// ---------------------------------------------------------------------------
// Eastmoney (A-share)
// ---------------------------------------------------------------------------

const EASTMONEY_QUOTE_URL: &str = "https://push2.eastmoney.com/api/qt/stock/get";

#[derive(Deserialize)]
struct EastmoneyEnvelope {
    data: Option<EastmoneyQuote>,
}

/// Eastmoney's terse field naming, mapped to what we keep.
#[derive(Deserialize)]
struct EastmoneyQuote {
    /// Security name
    f58: Option<String>,
    /// Latest price
    f43: Option<f64>,
    /// Total market cap
    f116: Option<f64>,
    /// Dynamic PE
    f162: Option<f64>,
    /// Industry sector
    f127: Option<String>,
    /// Revenue, most recent period
    f183: Option<f64>,
    /// Net profit, most recent period
    f184: Option<f64>,
}

/// A-share backend over Eastmoney's public quote endpoint.
pub struct EastmoneyBackend {
    http_client: reqwest::Client,
}

impl EastmoneyBackend {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    /// Eastmoney secid: Shanghai codes (60/68 prefix) are market 1,
    /// Shenzhen the rest are market 0.
    fn secid(code: &str) -> String {
        if code.starts_with("60") || code.starts_with("68") {
            format!("1.{code}")
        } else {
            format!("0.{code}")
        }
    }
}

impl Default for EastmoneyBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomesticBackend for EastmoneyBackend {
    async fn fetch_by_code(&self, code: &str) -> Result<CompanyProfile> {
        debug!(code = %code, "Fetching A-share fundamentals");

        let response = self
            .http_client
            .get(EASTMONEY_QUOTE_URL)
            .query(&[
                ("secid", Self::secid(code).as_str()),
                ("fields", "f43,f58,f116,f127,f162,f183,f184"),
            ])
            .send()
            .await
            .map_err(|e| {
                ProspectusError::Backend(format!("Eastmoney request failed for {code}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProspectusError::Backend(format!(
                "Eastmoney API error {status} for {code}"
            )));
        }

        let envelope: EastmoneyEnvelope = response.json().await.map_err(|e| {
            ProspectusError::Backend(format!("Failed to parse Eastmoney response for {code}: {e}"))
        })?;

        let quote = envelope.data.ok_or_else(|| {
            ProspectusError::Backend(format!("Eastmoney returned no data for {code}"))
        })?;

        let mut profile = CompanyProfile::empty(code, "A-Share (CN)");
        profile.name = or_na(quote.f58);
        profile.price = or_na(quote.f43);
        profile.market_cap = or_na(quote.f116);
        profile.pe_ratio = or_na(quote.f162);
        profile.sector = or_na(quote.f127);
        profile.recent_financials = format!(
            "Revenue (latest period): {}\nNet profit (latest period): {}",
            or_na(quote.f183),
            or_na(quote.f184)
        );

        Ok(profile)
    }
}

// ---------------------------------------------------------------------------
// Yahoo (international)
// ---------------------------------------------------------------------------

const YAHOO_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

#[derive(Deserialize)]
struct YahooEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponse,
}

#[derive(Deserialize)]
struct YahooQuoteResponse {
    #[serde(default)]
    result: Vec<YahooQuote>,
}

#[derive(Deserialize)]
struct YahooQuote {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "marketCap")]
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    #[serde(rename = "epsTrailingTwelveMonths")]
    eps_ttm: Option<f64>,
    #[serde(rename = "fullExchangeName")]
    exchange: Option<String>,
}

/// International backend over Yahoo Finance's quote endpoint.
pub struct YahooBackend {
    http_client: reqwest::Client,
}

impl YahooBackend {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for YahooBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InternationalBackend for YahooBackend {
    async fn fetch_by_ticker(&self, ticker: &str) -> Result<CompanyProfile> {
        debug!(ticker = %ticker, "Fetching international fundamentals");

        let response = self
            .http_client
            .get(YAHOO_QUOTE_URL)
            .query(&[("symbols", ticker)])
            .send()
            .await
            .map_err(|e| {
                ProspectusError::Backend(format!("Yahoo request failed for {ticker}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProspectusError::Backend(format!(
                "Yahoo API error {status} for {ticker}"
            )));
        }

        let envelope: YahooEnvelope = response.json().await.map_err(|e| {
            ProspectusError::Backend(format!("Failed to parse Yahoo response for {ticker}: {e}"))
        })?;

        let quote = envelope
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| {
                ProspectusError::Backend(format!(
                    "Yahoo returned no data for {ticker}; it may be delisted"
                ))
            })?;

        let mut profile = CompanyProfile::empty(ticker, "International");
        profile.name = or_na(quote.long_name);
        profile.price = or_na(quote.regular_market_price);
        profile.market_cap = or_na(quote.market_cap);
        profile.pe_ratio = or_na(quote.trailing_pe);
        profile.sector = or_na(quote.exchange);
        profile.recent_financials = format!("EPS (trailing twelve months): {}", or_na(quote.eps_ttm));

        Ok(profile)
    }
}
