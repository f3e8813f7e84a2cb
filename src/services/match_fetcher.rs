// src/services/match_fetcher.rs
//
// Bounded-concurrency match fetcher composing the cache, the rate limiter and
// the routed client. Cache hits never consume quota; individual failures are
// counted, never fatal to the batch.

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::log_warn;
use crate::router::regions::RegionCluster;
use crate::services::cache::{EntityClass, TieredCache};
use crate::services::rate_limiter::RateLimiter;
use crate::services::riot_client::RiotApiClient;
use crate::types::MatchRecord;
use crate::utils::ProfileResult;

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Maximum simultaneously in-flight match fetches.
    pub max_concurrency: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}

/// Everything retrieved for a batch, plus how many ids failed. The batch
/// always runs to completion: every id is attempted exactly once.
#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<MatchRecord>,
    pub failed: u32,
}

#[derive(Clone)]
pub struct MatchFetcher {
    client: Arc<RiotApiClient>,
    cache: Arc<TieredCache>,
    limiter: Arc<RateLimiter>,
    config: FetcherConfig,
}

impl MatchFetcher {
    pub fn new(
        client: Arc<RiotApiClient>,
        cache: Arc<TieredCache>,
        limiter: Arc<RateLimiter>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            client,
            cache,
            limiter,
            config,
        }
    }

    pub async fn fetch_matches(
        &self,
        cluster: RegionCluster,
        match_ids: &[String],
    ) -> FetchOutcome {
        let results: Vec<ProfileResult<MatchRecord>> = stream::iter(match_ids.iter().cloned())
            .map(|match_id| {
                let fetcher = self.clone();
                async move {
                    let result = fetcher.fetch_one(cluster, &match_id).await;
                    if let Err(err) = &result {
                        log_warn!(
                            "match fetch failed",
                            serde_json::json!({"match_id": match_id, "error": err.code(), "details": err.message})
                        );
                    }
                    result
                }
            })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut outcome = FetchOutcome {
            records: Vec::with_capacity(results.len()),
            failed: 0,
        };
        for result in results {
            match result {
                Ok(record) => outcome.records.push(record),
                Err(_) => outcome.failed += 1,
            }
        }
        outcome
    }

    /// Cache-first single fetch: a hit returns immediately without touching
    /// the rate limiter; a miss awaits quota, fetches and writes through.
    async fn fetch_one(
        &self,
        cluster: RegionCluster,
        match_id: &str,
    ) -> ProfileResult<MatchRecord> {
        if let Some(record) = self
            .cache
            .get::<MatchRecord>(EntityClass::MatchDetail, match_id)
            .await?
        {
            return Ok(record);
        }

        self.limiter.await_availability().await;
        let record = self.client.get_match(cluster, match_id).await?;
        self.cache
            .set(EntityClass::MatchDetail, match_id, &record)
            .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{RegionalRouter, RouterConfig};
    use crate::services::rate_limiter::RateLimiterConfig;
    use crate::test_utils::{match_record, match_record_json, ManualClock, MatchRecordSpec, MockUpstream};

    struct Harness {
        fetcher: MatchFetcher,
        cache: Arc<TieredCache>,
        limiter: Arc<RateLimiter>,
        clock: Arc<ManualClock>,
        upstream: Arc<MockUpstream>,
    }

    fn harness(limiter_config: RateLimiterConfig) -> Harness {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let upstream = Arc::new(MockUpstream::new());
        let router = Arc::new(RegionalRouter::new(
            RouterConfig::with_api_key("test-key"),
            upstream.clone(),
        ));
        let client = Arc::new(RiotApiClient::new(router));
        let cache = Arc::new(TieredCache::new(
            Arc::new(crate::services::cache::InMemoryKvStore::new()),
            clock.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(limiter_config, clock.clone()));
        let fetcher = MatchFetcher::new(
            client,
            cache.clone(),
            limiter.clone(),
            FetcherConfig::default(),
        );
        Harness {
            fetcher,
            cache,
            limiter,
            clock,
            upstream,
        }
    }

    fn spec(match_id: &str) -> MatchRecordSpec {
        MatchRecordSpec {
            match_id: match_id.to_string(),
            ..MatchRecordSpec::default()
        }
    }

    #[tokio::test]
    async fn test_cached_ids_need_no_quota_and_no_network() {
        let config = RateLimiterConfig {
            short_max_calls: 3,
            short_window_ms: 1_000,
            long_max_calls: 3,
            long_window_ms: 120_000,
        };
        let h = harness(config);

        let ids = ["KR_1", "KR_2", "KR_3"];
        for id in ids {
            h.cache
                .set(EntityClass::MatchDetail, id, &match_record(spec(id)))
                .await
                .unwrap();
        }
        // Exhaust the entire quota.
        for _ in 0..3 {
            h.limiter.await_availability().await;
        }

        let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        let outcome = h.fetcher.fetch_matches(RegionCluster::Asia, &ids).await;

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.failed, 0);
        assert_eq!(h.upstream.call_count(), 0, "no network calls");
        assert_eq!(h.clock.total_slept_ms(), 0, "no rate-limiter wait");
    }

    #[tokio::test]
    async fn test_misses_are_fetched_and_written_through() {
        let h = harness(RateLimiterConfig::default());
        h.upstream.stub(
            "/lol/match/v5/matches/KR_9",
            200,
            match_record_json(spec("KR_9")),
        );

        let ids = vec!["KR_9".to_string()];
        let outcome = h.fetcher.fetch_matches(RegionCluster::Asia, &ids).await;
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(h.upstream.call_count(), 1);

        // Second pass is served entirely from cache.
        let outcome = h.fetcher.fetch_matches(RegionCluster::Asia, &ids).await;
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(h.upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_single_failure_does_not_abort_batch() {
        let h = harness(RateLimiterConfig::default());
        h.upstream.stub(
            "/lol/match/v5/matches/KR_1",
            200,
            match_record_json(spec("KR_1")),
        );
        h.upstream.stub(
            "/lol/match/v5/matches/KR_3",
            200,
            match_record_json(spec("KR_3")),
        );
        // KR_2 is unstubbed and 404s.

        let ids: Vec<String> = ["KR_1", "KR_2", "KR_3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let outcome = h.fetcher.fetch_matches(RegionCluster::Asia, &ids).await;
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failed, 1);
    }
}
