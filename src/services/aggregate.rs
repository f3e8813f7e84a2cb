// src/services/aggregate.rs
//
// Single-pass fold of accepted records into aggregate playstyle statistics.
// Accumulators are integers and maps are ordered, so the fold is
// order-independent and bit-identical under shuffling; per-minute rates are
// divided out only at finalization, time-weighted over total duration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{is_ranked_queue, MatchRecord, Participant};

// Playstyle classification thresholds, evaluated in priority order.
const CARRY_DAMAGE_PER_MIN: f64 = 600.0;
const CARRY_KDA: f64 = 3.0;
const VISION_CONTROL_PER_MIN: f64 = 1.5;
const SPLIT_PUSH_OBJECTIVE_DAMAGE: u64 = 10_000;
const SUPPORT_HEAL_SHIELD: u64 = 8_000;

/// Qualitative per-game playstyle tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlaystyleTag {
    Carry,
    VisionControl,
    SplitPush,
    Support,
    Balanced,
}

/// Ordered threshold rules; the first matching rule wins.
pub fn classify_playstyle(participant: &Participant, game_duration_secs: u64) -> PlaystyleTag {
    let minutes = game_duration_secs as f64 / 60.0;
    let damage_per_min = if minutes > 0.0 {
        participant.total_damage_dealt_to_champions as f64 / minutes
    } else {
        0.0
    };
    let vision_per_min = if minutes > 0.0 {
        participant.vision_score as f64 / minutes
    } else {
        0.0
    };
    let kda = (participant.kills + participant.assists) as f64
        / (participant.deaths.max(1)) as f64;

    if damage_per_min >= CARRY_DAMAGE_PER_MIN && kda >= CARRY_KDA {
        PlaystyleTag::Carry
    } else if vision_per_min >= VISION_CONTROL_PER_MIN {
        PlaystyleTag::VisionControl
    } else if participant.damage_dealt_to_objectives >= SPLIT_PUSH_OBJECTIVE_DAMAGE {
        PlaystyleTag::SplitPush
    } else if participant.total_heals_on_teammates + participant.total_damage_shielded_on_teammates
        >= SUPPORT_HEAL_SHIELD
    {
        PlaystyleTag::Support
    } else {
        PlaystyleTag::Balanced
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    pub games: u64,
    pub wins: u64,
}

impl WinLoss {
    pub fn losses(&self) -> u64 {
        self.games - self.wins
    }

    fn record(&mut self, win: bool) {
        self.games += 1;
        if win {
            self.wins += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChampionStats {
    pub games: u64,
    pub wins: u64,
    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub playstyles: BTreeMap<PlaystyleTag, u64>,
}

/// Derived aggregate statistics. Never persisted; recomputable from the same
/// accepted record set deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    /// Win/loss per queue id.
    pub queues: BTreeMap<u32, WinLoss>,
    pub ranked: WinLoss,
    pub casual: WinLoss,

    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub total_damage_to_champions: u64,
    pub total_gold_earned: u64,
    pub total_vision_score: u64,
    pub total_duration_secs: u64,

    /// (kills + assists) / deaths over the whole set.
    pub kda: f64,
    /// Time-weighted: total damage over total minutes, not an average of
    /// per-game rates.
    pub damage_per_min: f64,
    pub gold_per_min: f64,
    pub vision_per_min: f64,

    pub champions: BTreeMap<String, ChampionStats>,
}

/// Running integer accumulator; rates are divided out in `finish`.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    stats: AggregatedStats,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute one accepted record to the target participant. Records whose
    /// participant list does not contain the target are ignored; the filter
    /// stage guarantees they never reach this point.
    pub fn fold(&mut self, record: &MatchRecord, puuid: &str) {
        let info = match &record.info {
            Some(info) => info,
            None => return,
        };
        let participant = match record.participant_for(puuid) {
            Some(participant) => participant,
            None => return,
        };

        let stats = &mut self.stats;
        stats.games += 1;
        if participant.win {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }

        stats
            .queues
            .entry(info.queue_id)
            .or_default()
            .record(participant.win);
        if is_ranked_queue(info.queue_id) {
            stats.ranked.record(participant.win);
        } else {
            stats.casual.record(participant.win);
        }

        stats.kills += participant.kills;
        stats.deaths += participant.deaths;
        stats.assists += participant.assists;
        stats.total_damage_to_champions += participant.total_damage_dealt_to_champions;
        stats.total_gold_earned += participant.gold_earned;
        stats.total_vision_score += participant.vision_score;
        stats.total_duration_secs += info.game_duration;

        let champion = stats
            .champions
            .entry(participant.champion_name.clone())
            .or_default();
        champion.games += 1;
        if participant.win {
            champion.wins += 1;
        }
        champion.kills += participant.kills;
        champion.deaths += participant.deaths;
        champion.assists += participant.assists;
        let tag = classify_playstyle(participant, info.game_duration);
        *champion.playstyles.entry(tag).or_insert(0) += 1;
    }

    pub fn finish(mut self) -> AggregatedStats {
        let minutes = self.stats.total_duration_secs as f64 / 60.0;
        self.stats.damage_per_min = per_minute(self.stats.total_damage_to_champions, minutes);
        self.stats.gold_per_min = per_minute(self.stats.total_gold_earned, minutes);
        self.stats.vision_per_min = per_minute(self.stats.total_vision_score, minutes);
        self.stats.kda = (self.stats.kills + self.stats.assists) as f64
            / (self.stats.deaths.max(1)) as f64;
        self.stats
    }
}

/// Zero total duration yields a zero rate, never a division error.
fn per_minute(total: u64, minutes: f64) -> f64 {
    if minutes > 0.0 {
        total as f64 / minutes
    } else {
        0.0
    }
}

pub fn aggregate_matches(records: &[MatchRecord], puuid: &str) -> AggregatedStats {
    let mut accumulator = StatsAccumulator::new();
    for record in records {
        accumulator.fold(record, puuid);
    }
    accumulator.finish()
}
