// src/services/crawler.rs
//
// Breadth-first match crawler: start from one seed player id, pull their
// recent match ids, fetch the matches through the orchestrator (cached,
// rate-limited), then expand through the other participants until the
// configured limits are hit.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::log_warn;
use crate::router::regions::RegionCluster;
use crate::services::match_fetcher::MatchFetcher;
use crate::services::rate_limiter::RateLimiter;
use crate::services::riot_client::RiotApiClient;
use crate::types::{MatchHistoryQuery, MatchRecord};
use crate::utils::ProfileResult;

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum unique player ids to process.
    pub max_puuids: usize,
    /// Maximum unique matches to collect.
    pub max_matches: usize,
    /// Match ids requested per player id.
    pub matches_per_puuid: u32,
    /// Optional queue allow-list; `None` keeps every queue.
    pub queue_filter: Option<Vec<u32>>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_puuids: 1_000,
            max_matches: 5_000,
            matches_per_puuid: 20,
            queue_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct CrawlReport {
    pub puuids_processed: usize,
    pub matches_fetched: usize,
    pub unique_puuids: usize,
    pub matches: Vec<MatchRecord>,
}

pub struct MatchCrawler {
    client: Arc<RiotApiClient>,
    fetcher: MatchFetcher,
    limiter: Arc<RateLimiter>,
    config: CrawlerConfig,
}

impl MatchCrawler {
    pub fn new(
        client: Arc<RiotApiClient>,
        fetcher: MatchFetcher,
        limiter: Arc<RateLimiter>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            client,
            fetcher,
            limiter,
            config,
        }
    }

    pub async fn crawl(
        &self,
        cluster: RegionCluster,
        seed_puuid: &str,
    ) -> ProfileResult<CrawlReport> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut fetched: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut matches: Vec<MatchRecord> = Vec::new();
        let mut processed = 0usize;

        queue.push_back(seed_puuid.to_string());

        while let Some(puuid) = queue.pop_front() {
            if processed >= self.config.max_puuids || fetched.len() >= self.config.max_matches {
                break;
            }
            if !visited.insert(puuid.clone()) {
                continue;
            }
            processed += 1;

            self.limiter.await_availability().await;
            let history = MatchHistoryQuery::with_count(self.config.matches_per_puuid);
            let ids = match self.client.get_match_ids(cluster, &puuid, &history).await {
                Ok(ids) => ids,
                Err(err) => {
                    // One unreachable player never aborts the crawl.
                    log_warn!(
                        "match-id list failed during crawl",
                        serde_json::json!({"puuid": puuid, "error": err.code()})
                    );
                    continue;
                }
            };

            let budget = self.config.max_matches - fetched.len();
            let new_ids: Vec<String> = ids
                .into_iter()
                .filter(|id| !fetched.contains(id))
                .take(budget)
                .collect();

            let outcome = self.fetcher.fetch_matches(cluster, &new_ids).await;
            for record in outcome.records {
                if let Some(filter) = &self.config.queue_filter {
                    let queue_id = record.info.as_ref().map(|info| info.queue_id);
                    if !queue_id.is_some_and(|id| filter.contains(&id)) {
                        continue;
                    }
                }
                if !fetched.insert(record.metadata.match_id.clone()) {
                    continue;
                }

                for participant in extract_participants(&record) {
                    if !visited.contains(&participant)
                        && visited.len() + queue.len() < self.config.max_puuids
                    {
                        queue.push_back(participant);
                    }
                }
                matches.push(record);
            }
        }

        Ok(CrawlReport {
            puuids_processed: processed,
            matches_fetched: fetched.len(),
            unique_puuids: visited.len(),
            matches,
        })
    }
}

/// Participant player ids, preferring the compact metadata list over the
/// per-participant info blocks.
fn extract_participants(record: &MatchRecord) -> Vec<String> {
    if !record.metadata.participants.is_empty() {
        return record.metadata.participants.clone();
    }
    record
        .info
        .as_ref()
        .map(|info| {
            info.participants
                .iter()
                .filter(|p| !p.puuid.is_empty())
                .map(|p| p.puuid.clone())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{match_record, MatchRecordSpec};

    #[test]
    fn test_extract_participants_prefers_metadata() {
        let mut record = match_record(MatchRecordSpec::default());
        record.metadata.participants = vec!["a".to_string(), "b".to_string()];
        assert_eq!(extract_participants(&record), vec!["a", "b"]);

        record.metadata.participants.clear();
        let from_info = extract_participants(&record);
        assert_eq!(from_info, vec!["p1".to_string()]);
    }
}
