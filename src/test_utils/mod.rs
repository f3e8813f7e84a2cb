// src/test_utils/mod.rs
//
// Test support shared by unit and integration tests: a scripted upstream
// transport, a manual clock, and match-record fixture builders.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::router::{UpstreamRequest, UpstreamResponse, UpstreamTransport};
use crate::types::{MatchInfo, MatchMetadata, MatchRecord, Participant, RANKED_SOLO_QUEUE};
use crate::utils::{Clock, ProfileError, ProfileResult};

// ============= MANUAL CLOCK =============

/// Clock whose `sleep` advances simulated time instead of suspending, so
/// rate-limiter and TTL behavior is deterministic and instant in tests.
pub struct ManualClock {
    now_ms: AtomicU64,
    slept_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
            slept_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Total simulated sleep accumulated by callers.
    pub fn total_slept_ms(&self) -> u64 {
        self.slept_ms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    async fn sleep_ms(&self, ms: u64) {
        self.slept_ms.fetch_add(ms, Ordering::SeqCst);
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

// ============= MOCK UPSTREAM TRANSPORT =============

struct Stub {
    path: String,
    status: u16,
    body: Value,
}

/// Scripted upstream: responses are matched by URL path, every executed call
/// is recorded, and a network failure can be simulated.
#[derive(Default)]
pub struct MockUpstream {
    stubs: Mutex<Vec<Stub>>,
    calls: Mutex<Vec<String>>,
    network_failure: Mutex<Option<String>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub(&self, path: &str, status: u16, body: Value) {
        self.stubs.lock().unwrap().push(Stub {
            path: path.to_string(),
            status,
            body,
        });
    }

    pub fn simulate_network_failure(&self, message: &str) {
        *self.network_failure.lock().unwrap() = Some(message.to_string());
    }

    /// Full URLs of every executed request, in dispatch order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(path))
            .count()
    }
}

#[async_trait]
impl UpstreamTransport for MockUpstream {
    async fn execute(&self, request: UpstreamRequest) -> ProfileResult<UpstreamResponse> {
        self.calls.lock().unwrap().push(request.url.to_string());

        if let Some(message) = self.network_failure.lock().unwrap().clone() {
            return Err(ProfileError::network_error(message));
        }

        let stubs = self.stubs.lock().unwrap();
        match stubs.iter().find(|stub| stub.path == request.url.path()) {
            Some(stub) => Ok(UpstreamResponse {
                status: stub.status,
                body: stub.body.to_string(),
            }),
            None => Ok(UpstreamResponse {
                status: 404,
                body: serde_json::json!({
                    "status": {"message": "Not Found", "status_code": 404}
                })
                .to_string(),
            }),
        }
    }
}

// ============= MATCH RECORD FIXTURES =============

/// Knobs for a single-participant match fixture. Defaults describe an
/// ordinary accepted ranked game for player `p1`.
#[derive(Debug, Clone)]
pub struct MatchRecordSpec {
    pub match_id: String,
    pub puuid: String,
    pub champion_name: String,
    pub game_type: String,
    pub queue_id: u32,
    pub game_duration: u64,
    pub win: bool,
    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub damage_to_champions: u64,
    pub gold_earned: u64,
    pub vision_score: u64,
    pub objective_damage: u64,
    pub heals_on_teammates: u64,
    pub shielded_on_teammates: u64,
}

impl Default for MatchRecordSpec {
    fn default() -> Self {
        Self {
            match_id: "KR_1".to_string(),
            puuid: "p1".to_string(),
            champion_name: "Ahri".to_string(),
            game_type: "MATCHED_GAME".to_string(),
            queue_id: RANKED_SOLO_QUEUE,
            game_duration: 1_800,
            win: true,
            kills: 5,
            deaths: 3,
            assists: 7,
            damage_to_champions: 15_000,
            gold_earned: 11_000,
            vision_score: 20,
            objective_damage: 2_000,
            heals_on_teammates: 0,
            shielded_on_teammates: 0,
        }
    }
}

pub fn match_record(spec: MatchRecordSpec) -> MatchRecord {
    MatchRecord {
        metadata: MatchMetadata {
            match_id: spec.match_id,
            participants: vec![spec.puuid.clone()],
        },
        info: Some(MatchInfo {
            game_duration: spec.game_duration,
            game_type: spec.game_type,
            queue_id: spec.queue_id,
            participants: vec![Participant {
                puuid: spec.puuid,
                champion_name: spec.champion_name,
                kills: spec.kills,
                deaths: spec.deaths,
                assists: spec.assists,
                win: spec.win,
                total_damage_dealt_to_champions: spec.damage_to_champions,
                gold_earned: spec.gold_earned,
                vision_score: spec.vision_score,
                damage_dealt_to_objectives: spec.objective_damage,
                total_heals_on_teammates: spec.heals_on_teammates,
                total_damage_shielded_on_teammates: spec.shielded_on_teammates,
            }],
        }),
    }
}

/// Serialized (camelCase wire shape) form of a fixture, for stubbing upstream
/// bodies.
pub fn match_record_json(spec: MatchRecordSpec) -> Value {
    serde_json::to_value(match_record(spec)).expect("fixture serializes")
}
