// src/services/pipeline.rs
//
// End-to-end analysis: identity → owning cluster → match-id list →
// orchestrated fetch → filter → aggregate. Every resolution step is
// cache-first and rate-limited on miss.

use serde::Serialize;
use std::sync::Arc;

use crate::log_info;
use crate::router::regions::RegionCluster;
use crate::router::RegionalRouter;
use crate::services::aggregate::{aggregate_matches, AggregatedStats};
use crate::services::cache::{EntityClass, TieredCache};
use crate::services::filter::{filter_matches, SkipTally};
use crate::services::match_fetcher::{FetcherConfig, MatchFetcher};
use crate::services::rate_limiter::RateLimiter;
use crate::services::riot_client::RiotApiClient;
use crate::types::{MatchHistoryQuery, RiotAccount};
use crate::utils::{ErrorDetails, ProfileError, ProfileResult};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Minimum accepted matches for an analysis to be meaningful.
    pub min_matches: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { min_matches: 5 }
    }
}

/// Result of a completed analysis. Raw match records are not retained.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAnalysis {
    pub account: RiotAccount,
    pub cluster: RegionCluster,
    pub stats: AggregatedStats,
    /// Accepted match count the stats were folded from.
    pub match_count: usize,
    pub skipped: SkipTally,
    pub failed_fetches: u32,
}

pub struct PlayerAnalyzer {
    client: Arc<RiotApiClient>,
    cache: Arc<TieredCache>,
    limiter: Arc<RateLimiter>,
    fetcher: MatchFetcher,
    config: AnalyzerConfig,
}

impl PlayerAnalyzer {
    pub fn new(
        router: Arc<RegionalRouter>,
        cache: Arc<TieredCache>,
        limiter: Arc<RateLimiter>,
        fetcher_config: FetcherConfig,
        config: AnalyzerConfig,
    ) -> Self {
        let client = Arc::new(RiotApiClient::new(router));
        let fetcher = MatchFetcher::new(
            client.clone(),
            cache.clone(),
            limiter.clone(),
            fetcher_config,
        );
        Self {
            client,
            cache,
            limiter,
            fetcher,
            config,
        }
    }

    pub fn fetcher(&self) -> &MatchFetcher {
        &self.fetcher
    }

    pub fn client(&self) -> &Arc<RiotApiClient> {
        &self.client
    }

    pub async fn analyze(
        &self,
        game_name: &str,
        tag_line: &str,
        query: &MatchHistoryQuery,
    ) -> ProfileResult<PlayerAnalysis> {
        let account = self.resolve_identity(game_name, tag_line).await?;
        let cluster = self.resolve_region(&account).await?;
        let match_ids = self
            .resolve_match_ids(cluster, &account.puuid, query)
            .await?;

        let outcome = self.fetcher.fetch_matches(cluster, &match_ids).await;
        let fetched = outcome.records.len();
        let filtered = filter_matches(outcome.records, &account.puuid);

        log_info!(
            "match set assembled",
            serde_json::json!({
                "puuid": account.puuid,
                "requested": match_ids.len(),
                "fetched": fetched,
                "accepted": filtered.accepted.len(),
                "failed_fetches": outcome.failed,
            })
        );

        if filtered.accepted.len() < self.config.min_matches {
            let mut details = ErrorDetails::new();
            details.insert("skipped".to_string(), filtered.skipped.to_json());
            details.insert(
                "failed_fetches".to_string(),
                serde_json::json!(outcome.failed),
            );
            details.insert(
                "accepted".to_string(),
                serde_json::json!(filtered.accepted.len()),
            );
            return Err(ProfileError::insufficient_data(format!(
                "only {} usable matches of {} requested (minimum {})",
                filtered.accepted.len(),
                match_ids.len(),
                self.config.min_matches
            ))
            .with_details(details));
        }

        let stats = aggregate_matches(&filtered.accepted, &account.puuid);
        Ok(PlayerAnalysis {
            account,
            cluster,
            stats,
            match_count: filtered.accepted.len(),
            skipped: filtered.skipped,
            failed_fetches: outcome.failed,
        })
    }

    /// (name, tag) → account, cache-first. Identities are immutable once
    /// resolved, so a hit is always authoritative.
    async fn resolve_identity(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> ProfileResult<RiotAccount> {
        let key = identity_key(game_name, tag_line);
        if let Some(account) = self
            .cache
            .get::<RiotAccount>(EntityClass::Identity, &key)
            .await?
        {
            return Ok(account);
        }

        self.limiter.await_availability().await;
        let account = self
            .client
            .get_account_by_riot_id(game_name, tag_line)
            .await?;
        self.cache
            .set(EntityClass::Identity, &key, &account)
            .await?;
        Ok(account)
    }

    async fn resolve_region(&self, account: &RiotAccount) -> ProfileResult<RegionCluster> {
        let key = identity_key(&account.game_name, &account.tag_line);
        if let Some(cluster) = self
            .cache
            .get::<RegionCluster>(EntityClass::Region, &key)
            .await?
        {
            return Ok(cluster);
        }

        self.limiter.await_availability().await;
        let cluster = self.client.get_active_region(&account.puuid).await?;
        self.cache.set(EntityClass::Region, &key, &cluster).await?;
        Ok(cluster)
    }

    async fn resolve_match_ids(
        &self,
        cluster: RegionCluster,
        puuid: &str,
        query: &MatchHistoryQuery,
    ) -> ProfileResult<Vec<String>> {
        let key = format!("{}:{}", puuid, query.scope_key());
        if let Some(ids) = self
            .cache
            .get::<Vec<String>>(EntityClass::MatchIdList, &key)
            .await?
        {
            return Ok(ids);
        }

        self.limiter.await_availability().await;
        let ids = self.client.get_match_ids(cluster, puuid, query).await?;
        self.cache.set(EntityClass::MatchIdList, &key, &ids).await?;
        Ok(ids)
    }
}

fn identity_key(game_name: &str, tag_line: &str) -> String {
    format!("{}#{}", game_name.to_lowercase(), tag_line.to_lowercase())
}
