//! rift_profile: regional fetch/aggregate core for player playstyle
//! statistics.
//!
//! The crate routes requests to the correct regional upstream cluster,
//! enforces the shared dual-window call quota, caches every entity class with
//! its own TTL, fetches match records under bounded concurrency, and folds
//! the accepted records into small aggregate statistics without retaining raw
//! data. Rendering, narrative generation and end-user auth live outside this
//! core.

// Module declarations
pub mod middleware;
pub mod router;
pub mod services;
pub mod test_utils;
pub mod types;
pub mod utils;

use std::sync::Arc;

pub use router::regions::RegionCluster;
pub use router::{
    RegionalRouter, RouterConfig, RouterRequest, RouterResponse, UpstreamTransport,
};
pub use services::{
    AggregatedStats, AnalyzerConfig, CrawlerConfig, EntityClass, FetcherConfig, InMemoryKvStore,
    MatchCrawler, MatchFetcher, PlayerAnalysis, PlayerAnalyzer, RateLimiter, RateLimiterConfig,
    RiotApiClient, SkipTally, TieredCache,
};
pub use types::{MatchHistoryQuery, MatchRecord, RiotAccount};
pub use utils::{ProfileError, ProfileResult, SystemClock};

/// Wire up an analyzer on the system clock, the default HTTP transport, an
/// in-memory durable tier and default quotas. The rate limiter and cache are
/// explicit instances owned here and shared by reference; no hidden global
/// state.
pub fn build_analyzer(config: RouterConfig) -> PlayerAnalyzer {
    let clock: Arc<dyn utils::Clock> = Arc::new(SystemClock::new());
    let router = Arc::new(RegionalRouter::with_default_transport(config));
    let cache = Arc::new(TieredCache::new(
        Arc::new(InMemoryKvStore::new()),
        clock.clone(),
    ));
    let limiter = Arc::new(RateLimiter::new(RateLimiterConfig::default(), clock));
    PlayerAnalyzer::new(
        router,
        cache,
        limiter,
        FetcherConfig::default(),
        AnalyzerConfig::default(),
    )
}
