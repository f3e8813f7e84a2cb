// src/services/filter.rs
//
// Validation stage: partitions raw fetched records into accepted records and
// a per-reason rejection tally. Reasons are counted individually so a "zero
// valid matches" outcome is diagnosable.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{MatchRecord, ALLOWED_QUEUE_IDS, MATCHED_GAME_TYPE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Upstream payload carried no info block.
    MissingInfo,
    /// Remake, custom or tutorial game, not a standard completed game.
    NotMatchedGame,
    /// Queue id outside the ranked/casual allow-list.
    QueueNotAllowed,
    /// Target player id absent from the participant list.
    PlayerNotFound,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingInfo => "missing_info",
            SkipReason::NotMatchedGame => "not_matched_game",
            SkipReason::QueueNotAllowed => "queue_not_allowed",
            SkipReason::PlayerNotFound => "player_not_found",
        }
    }
}

/// Per-reason rejection counts.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SkipTally {
    counts: BTreeMap<SkipReason, u32>,
}

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> u32 {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `{reason: count}` map for error details and response payloads.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.counts
                .iter()
                .map(|(reason, count)| {
                    (reason.as_str().to_string(), serde_json::json!(count))
                })
                .collect(),
        )
    }
}

#[derive(Debug)]
pub struct FilterOutcome {
    pub accepted: Vec<MatchRecord>,
    pub skipped: SkipTally,
}

/// Accept a record only if it carries an info block, is a standard completed
/// game, its queue is allow-listed and the target player participated.
pub fn filter_matches(records: Vec<MatchRecord>, puuid: &str) -> FilterOutcome {
    let mut accepted = Vec::with_capacity(records.len());
    let mut skipped = SkipTally::default();

    for record in records {
        let info = match &record.info {
            Some(info) => info,
            None => {
                skipped.record(SkipReason::MissingInfo);
                continue;
            }
        };
        if info.game_type != MATCHED_GAME_TYPE {
            skipped.record(SkipReason::NotMatchedGame);
            continue;
        }
        if !ALLOWED_QUEUE_IDS.contains(&info.queue_id) {
            skipped.record(SkipReason::QueueNotAllowed);
            continue;
        }
        if record.participant_for(puuid).is_none() {
            skipped.record(SkipReason::PlayerNotFound);
            continue;
        }
        accepted.push(record);
    }

    FilterOutcome { accepted, skipped }
}
