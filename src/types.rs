// src/types.rs

use serde::{Deserialize, Serialize};

// ============= QUEUE CLASSIFICATION =============

/// Ranked queues accepted by the filter stage.
pub const RANKED_SOLO_QUEUE: u32 = 420;
pub const RANKED_FLEX_QUEUE: u32 = 440;

/// Casual queues accepted by the filter stage.
pub const NORMAL_DRAFT_QUEUE: u32 = 400;
pub const NORMAL_BLIND_QUEUE: u32 = 430;
pub const ARAM_QUEUE: u32 = 450;

/// Queue allow-list: standard ranked and casual queues only. Remakes,
/// customs and event modes never enter the aggregate.
pub const ALLOWED_QUEUE_IDS: [u32; 5] = [
    RANKED_SOLO_QUEUE,
    RANKED_FLEX_QUEUE,
    NORMAL_DRAFT_QUEUE,
    NORMAL_BLIND_QUEUE,
    ARAM_QUEUE,
];

/// Game type marker for a standard completed game.
pub const MATCHED_GAME_TYPE: &str = "MATCHED_GAME";

pub fn is_ranked_queue(queue_id: u32) -> bool {
    queue_id == RANKED_SOLO_QUEUE || queue_id == RANKED_FLEX_QUEUE
}

// ============= ACCOUNT / IDENTITY =============

/// Stable identity resolved from a display name + tag. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotAccount {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

/// Active-region discovery response from the authoritative cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRegion {
    pub puuid: String,
    #[serde(default)]
    pub game: Option<String>,
    /// Either a cluster name ("americas") or a platform code ("kr"); the
    /// router validates it through the canonical mapping either way.
    pub region: String,
}

// ============= MATCH HISTORY QUERY =============

/// Scope parameters for a match-id list request. Part of the cache key for
/// the match-id-list entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchHistoryQuery {
    /// Number of match ids to return. Upstream maximum is 100.
    pub count: u32,
    /// Optional queue id filter (e.g. 420 for ranked solo).
    pub queue: Option<u32>,
    /// Start index for pagination.
    pub start: u32,
    /// Optional window start, epoch milliseconds.
    pub start_time: Option<i64>,
    /// Optional window end, epoch milliseconds.
    pub end_time: Option<i64>,
}

impl Default for MatchHistoryQuery {
    fn default() -> Self {
        Self {
            count: 20,
            queue: None,
            start: 0,
            start_time: None,
            end_time: None,
        }
    }
}

impl MatchHistoryQuery {
    pub fn with_count(count: u32) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Query-string pairs for the upstream ids endpoint. Count is clamped to
    /// the upstream maximum; zero-valued optionals are omitted.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("count".to_string(), self.count.min(100).to_string())];
        if let Some(queue) = self.queue {
            pairs.push(("queue".to_string(), queue.to_string()));
        }
        if self.start > 0 {
            pairs.push(("start".to_string(), self.start.to_string()));
        }
        if let Some(start_time) = self.start_time {
            pairs.push(("startTime".to_string(), start_time.to_string()));
        }
        if let Some(end_time) = self.end_time {
            pairs.push(("endTime".to_string(), end_time.to_string()));
        }
        pairs
    }

    /// Stable scope component of the match-id-list cache key.
    pub fn scope_key(&self) -> String {
        format!(
            "c{}-q{}-s{}-t{}-{}",
            self.count.min(100),
            self.queue.map_or_else(|| "any".to_string(), |q| q.to_string()),
            self.start,
            self.start_time.unwrap_or(0),
            self.end_time.unwrap_or(0),
        )
    }
}

// ============= MATCH RECORD =============

/// Normalized match-v5 record. `info` is optional by design: upstream
/// occasionally returns metadata-only payloads and the filter stage must
/// treat that case explicitly rather than defaulting fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub metadata: MatchMetadata,
    #[serde(default)]
    pub info: Option<MatchInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
    /// Participant puuids, ten per standard game.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Game length in seconds.
    #[serde(default)]
    pub game_duration: u64,
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub queue_id: u32,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// Per-player combat/economy/vision metrics within one match. Fields default
/// to zero because older records omit some of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub puuid: String,
    #[serde(default)]
    pub champion_name: String,
    #[serde(default)]
    pub kills: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub assists: u64,
    #[serde(default)]
    pub win: bool,
    #[serde(default)]
    pub total_damage_dealt_to_champions: u64,
    #[serde(default)]
    pub gold_earned: u64,
    #[serde(default)]
    pub vision_score: u64,
    #[serde(default)]
    pub damage_dealt_to_objectives: u64,
    #[serde(default)]
    pub total_heals_on_teammates: u64,
    #[serde(default)]
    pub total_damage_shielded_on_teammates: u64,
}

impl MatchRecord {
    /// The target player's participant entry, if present in this match.
    pub fn participant_for(&self, puuid: &str) -> Option<&Participant> {
        self.info
            .as_ref()?
            .participants
            .iter()
            .find(|p| p.puuid == puuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_history_query_pairs() {
        let query = MatchHistoryQuery {
            count: 250,
            queue: Some(RANKED_SOLO_QUEUE),
            start: 40,
            start_time: Some(1_700_000_000_000),
            end_time: None,
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("count".to_string(), "100".to_string())));
        assert!(pairs.contains(&("queue".to_string(), "420".to_string())));
        assert!(pairs.contains(&("start".to_string(), "40".to_string())));
        assert!(pairs.contains(&("startTime".to_string(), "1700000000000".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "endTime"));
    }

    #[test]
    fn test_scope_key_distinguishes_queries() {
        let a = MatchHistoryQuery::default();
        let b = MatchHistoryQuery {
            queue: Some(RANKED_SOLO_QUEUE),
            ..MatchHistoryQuery::default()
        };
        assert_ne!(a.scope_key(), b.scope_key());
    }

    #[test]
    fn test_match_record_metadata_only_payload() {
        let raw = serde_json::json!({
            "metadata": {"matchId": "KR_1", "participants": ["p1", "p2"]}
        });
        let record: MatchRecord = serde_json::from_value(raw).unwrap();
        assert!(record.info.is_none());
        assert!(record.participant_for("p1").is_none());
    }
}
