// src/services/mod.rs

pub mod aggregate;
pub mod cache;
pub mod crawler;
pub mod filter;
pub mod match_fetcher;
pub mod pipeline;
pub mod rate_limiter;
pub mod riot_client;

// Re-export commonly used services
pub use aggregate::{aggregate_matches, AggregatedStats, ChampionStats, PlaystyleTag, WinLoss};
pub use cache::{CacheEntry, EntityClass, InMemoryKvStore, KvStore, TieredCache};
pub use crawler::{CrawlReport, CrawlerConfig, MatchCrawler};
pub use filter::{filter_matches, FilterOutcome, SkipReason, SkipTally};
pub use match_fetcher::{FetchOutcome, FetcherConfig, MatchFetcher};
pub use pipeline::{AnalyzerConfig, PlayerAnalysis, PlayerAnalyzer};
pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterStatus, WindowStatus};
pub use riot_client::RiotApiClient;
