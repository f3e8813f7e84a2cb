// End-to-end pipeline tests against a scripted upstream: identity and
// region resolution, fetch orchestration, filtering, aggregation, the
// insufficient-data gate and cache reuse across analyses.

use std::sync::Arc;

use serde_json::json;

use rift_profile::services::filter::SkipReason;
use rift_profile::test_utils::{match_record_json, ManualClock, MatchRecordSpec, MockUpstream};
use rift_profile::utils::Clock;
use rift_profile::{
    AnalyzerConfig, CrawlerConfig, FetcherConfig, InMemoryKvStore, MatchCrawler, MatchFetcher,
    MatchHistoryQuery, PlayerAnalyzer, RateLimiter, RateLimiterConfig, RegionCluster,
    RegionalRouter, RiotApiClient, RouterConfig, TieredCache,
};

struct Harness {
    upstream: Arc<MockUpstream>,
    clock: Arc<ManualClock>,
    cache: Arc<TieredCache>,
    limiter: Arc<RateLimiter>,
    router: Arc<RegionalRouter>,
    analyzer: PlayerAnalyzer,
}

fn harness() -> Harness {
    let upstream = Arc::new(MockUpstream::new());
    let clock = Arc::new(ManualClock::new(1_000_000));
    let clock_dyn: Arc<dyn Clock> = clock.clone();
    let router = Arc::new(RegionalRouter::new(
        RouterConfig::with_api_key("test-key"),
        upstream.clone(),
    ));
    let cache = Arc::new(TieredCache::new(
        Arc::new(InMemoryKvStore::new()),
        clock_dyn.clone(),
    ));
    let limiter = Arc::new(RateLimiter::new(RateLimiterConfig::default(), clock_dyn));
    let analyzer = PlayerAnalyzer::new(
        router.clone(),
        cache.clone(),
        limiter.clone(),
        FetcherConfig::default(),
        AnalyzerConfig::default(),
    );
    Harness {
        upstream,
        clock,
        cache,
        limiter,
        router,
        analyzer,
    }
}

/// Stub identity, active-region discovery (kr → asia) and the match-id list
/// for the canonical test player.
fn stub_player(upstream: &MockUpstream, match_ids: &[&str]) {
    upstream.stub(
        "/riot/account/v1/accounts/by-riot-id/Faker/KR1",
        200,
        json!({"puuid": "puuid-faker", "gameName": "Faker", "tagLine": "KR1"}),
    );
    upstream.stub(
        "/riot/account/v1/region/by-game/lol/by-puuid/puuid-faker",
        200,
        json!({"puuid": "puuid-faker", "game": "lol", "region": "kr"}),
    );
    upstream.stub(
        "/lol/match/v5/matches/by-puuid/puuid-faker/ids",
        200,
        json!(match_ids),
    );
}

fn stub_match(upstream: &MockUpstream, spec: MatchRecordSpec) {
    let path = format!("/lol/match/v5/matches/{}", spec.match_id);
    upstream.stub(&path, 200, match_record_json(spec));
}

fn ranked_match(match_id: &str) -> MatchRecordSpec {
    MatchRecordSpec {
        match_id: match_id.to_string(),
        puuid: "puuid-faker".to_string(),
        ..MatchRecordSpec::default()
    }
}

#[tokio::test]
async fn test_analyze_happy_path() {
    let h = harness();
    let ids: Vec<String> = (1..=8).map(|i| format!("KR_{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    stub_player(&h.upstream, &id_refs);

    for id in &ids[..6] {
        stub_match(&h.upstream, ranked_match(id));
    }
    // Two games in a queue outside the allow-list are fetched but skipped.
    for id in &ids[6..] {
        stub_match(
            &h.upstream,
            MatchRecordSpec {
                queue_id: 700,
                ..ranked_match(id)
            },
        );
    }

    let analysis = h
        .analyzer
        .analyze("Faker", "KR1", &MatchHistoryQuery::default())
        .await
        .unwrap();

    assert_eq!(analysis.account.puuid, "puuid-faker");
    assert_eq!(analysis.cluster, RegionCluster::Asia);
    assert_eq!(analysis.match_count, 6);
    assert_eq!(analysis.failed_fetches, 0);
    assert_eq!(analysis.skipped.count(SkipReason::QueueNotAllowed), 2);

    let stats = &analysis.stats;
    assert_eq!(stats.games, 6);
    assert_eq!(stats.wins, 6);
    assert_eq!(stats.losses, 0);
    // Fixture games: 5/3/7 over 30 minutes with 15k damage each.
    assert!((stats.kda - 4.0).abs() < 1e-9);
    assert!((stats.damage_per_min - 500.0).abs() < 1e-9);
    assert_eq!(stats.champions["Ahri"].games, 6);

    // Everything upstream went to the owning cluster except the universal
    // identity and discovery calls.
    for url in h.upstream.calls().iter().skip(2) {
        assert!(url.starts_with("https://asia.api.riotgames.com/"), "{}", url);
    }
}

#[tokio::test]
async fn test_repeat_analysis_is_served_from_cache() {
    let h = harness();
    let ids: Vec<String> = (1..=6).map(|i| format!("KR_{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    stub_player(&h.upstream, &id_refs);
    for id in &ids {
        stub_match(&h.upstream, ranked_match(id));
    }

    let query = MatchHistoryQuery::default();
    let first = h.analyzer.analyze("Faker", "KR1", &query).await.unwrap();
    let calls_after_first = h.upstream.call_count();
    // identity + discovery + id list + 6 matches
    assert_eq!(calls_after_first, 9);

    let second = h.analyzer.analyze("Faker", "KR1", &query).await.unwrap();
    assert_eq!(
        h.upstream.call_count(),
        calls_after_first,
        "a repeat within every TTL costs zero upstream calls"
    );
    assert_eq!(h.clock.total_slept_ms(), 0, "cache hits never wait on quota");
    assert_eq!(second.stats, first.stats);
}

#[tokio::test]
async fn test_insufficient_data_carries_skip_breakdown() {
    let h = harness();
    stub_player(&h.upstream, &["KR_1", "KR_2", "KR_3", "KR_4"]);
    for id in ["KR_1", "KR_2", "KR_3"] {
        stub_match(&h.upstream, ranked_match(id));
    }
    stub_match(
        &h.upstream,
        MatchRecordSpec {
            game_type: "CUSTOM_GAME".to_string(),
            ..ranked_match("KR_4")
        },
    );

    let err = h
        .analyzer
        .analyze("Faker", "KR1", &MatchHistoryQuery::default())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INSUFFICIENT_DATA");
    assert_eq!(err.http_status(), 422);
    let details = err.details.expect("details present");
    assert_eq!(details["accepted"], json!(3));
    assert_eq!(details["skipped"]["not_matched_game"], json!(1));
    assert_eq!(details["failed_fetches"], json!(0));
}

#[tokio::test]
async fn test_failed_fetch_does_not_abort_analysis() {
    let h = harness();
    let ids: Vec<String> = (1..=6).map(|i| format!("KR_{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    stub_player(&h.upstream, &id_refs);
    // KR_6 has no stub: the scripted upstream answers 404 for it.
    for id in &ids[..5] {
        stub_match(&h.upstream, ranked_match(id));
    }

    let analysis = h
        .analyzer
        .analyze("Faker", "KR1", &MatchHistoryQuery::default())
        .await
        .unwrap();

    assert_eq!(analysis.match_count, 5);
    assert_eq!(analysis.failed_fetches, 1);
    assert_eq!(analysis.stats.games, 5);
}

#[tokio::test]
async fn test_crawler_expands_through_participants() {
    let h = harness();

    h.upstream.stub(
        "/lol/match/v5/matches/by-puuid/p1/ids",
        200,
        json!(["KR_1", "KR_2"]),
    );
    h.upstream
        .stub("/lol/match/v5/matches/by-puuid/p2/ids", 200, json!([]));
    h.upstream
        .stub("/lol/match/v5/matches/by-puuid/p3/ids", 200, json!([]));

    let mut kr1 = match_record_json(ranked_match("KR_1"));
    kr1["metadata"]["participants"] = json!(["p1", "p2"]);
    h.upstream.stub("/lol/match/v5/matches/KR_1", 200, kr1);
    let mut kr2 = match_record_json(ranked_match("KR_2"));
    kr2["metadata"]["participants"] = json!(["p1", "p3"]);
    h.upstream.stub("/lol/match/v5/matches/KR_2", 200, kr2);

    let client = Arc::new(RiotApiClient::new(h.router.clone()));
    let fetcher = MatchFetcher::new(
        client.clone(),
        h.cache.clone(),
        h.limiter.clone(),
        FetcherConfig::default(),
    );
    let crawler = MatchCrawler::new(
        client,
        fetcher,
        h.limiter.clone(),
        CrawlerConfig {
            max_puuids: 10,
            ..CrawlerConfig::default()
        },
    );

    let report = crawler.crawl(RegionCluster::Asia, "p1").await.unwrap();
    assert_eq!(report.matches_fetched, 2);
    assert_eq!(report.unique_puuids, 3, "p2 and p3 discovered from KR_1/KR_2");
    assert_eq!(report.puuids_processed, 3);
    assert_eq!(report.matches.len(), 2);
}

#[tokio::test]
async fn test_match_id_list_scope_distinguishes_queries() {
    let h = harness();
    stub_player(&h.upstream, &["KR_1", "KR_2", "KR_3", "KR_4", "KR_5"]);
    for i in 1..=5 {
        stub_match(&h.upstream, ranked_match(&format!("KR_{}", i)));
    }

    let default_query = MatchHistoryQuery::default();
    h.analyzer
        .analyze("Faker", "KR1", &default_query)
        .await
        .unwrap();
    let calls_after_first = h.upstream.call_count();

    // A different count is a different id-list scope: one fresh list call,
    // everything else stays cached.
    let narrower = MatchHistoryQuery::with_count(5);
    h.analyzer.analyze("Faker", "KR1", &narrower).await.unwrap();
    assert_eq!(h.upstream.call_count(), calls_after_first + 1);
}
