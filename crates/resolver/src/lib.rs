//! Entity resolution and market routing for Prospectus.
//!
//! Turns a free-form company identifier into a canonical security code,
//! classifies it into a market segment, and dispatches to the matching
//! data backend:
//!
//! ```text
//! "Kweichow Moutai"          "600519.SS"        "NVDA"
//!         │                       │                │
//!         ▼                       ▼                ▼
//! ┌──────────────────────────────────────────────────────┐
//! │  EntityResolver   (cache → literal → search scan)    │
//! └──────────────────────────┬───────────────────────────┘
//!                            ▼
//!                  ┌──────────────────┐
//!                  │   MarketRouter   │
//!                  └───────┬──────────┘
//!              domestic ───┴─── other
//!                 ▼                ▼
//!          EastmoneyBackend   YahooBackend
//! ```

pub mod backend;
pub mod resolver;
pub mod router;
pub mod search;
pub mod tool;

pub use backend::{
    CompanyProfile, DomesticBackend, EastmoneyBackend, InternationalBackend, YahooBackend,
};
pub use resolver::{EntityResolver, MarketSegment, ResolutionSource, ResolvedEntity};
pub use router::MarketRouter;
pub use search::{SearchProvider, SerperSearch};
pub use tool::FundamentalsTool;
