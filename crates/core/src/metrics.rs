//! Win rate, damage rate and blended reward over completed episodes.

use serde::{Deserialize, Serialize};

use crate::episode::EpisodeSummary;
use crate::types::{Side, Winner};

/// Starting total health of an unscaled roster; the damage-rate denominator.
pub const DAMAGE_BASELINE: f64 = 1600.0;
pub const WIN_WEIGHT: f64 = 0.7;
pub const DAMAGE_WEIGHT: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideMetrics {
    pub wins: u32,
    pub win_rate: f64,
    pub damage_rate: f64,
    pub reward: f64,
}

pub fn reward(win_rate: f64, damage_rate: f64) -> f64 {
    WIN_WEIGHT * win_rate + DAMAGE_WEIGHT * damage_rate
}

/// Metrics for `side`; `None` when no episode completed.
pub fn side_metrics(episodes: &[EpisodeSummary], side: Side) -> Option<SideMetrics> {
    if episodes.is_empty() {
        return None;
    }
    let count = episodes.len() as f64;
    let wins = episodes.iter().filter(|episode| episode.winner == Winner::Side(side)).count() as u32;
    let total_damage: i64 = episodes.iter().map(|episode| episode.damage_dealt[side.index()]).sum();
    let win_rate = f64::from(wins) / count;
    let damage_rate = total_damage as f64 / count / DAMAGE_BASELINE;
    Some(SideMetrics { wins, win_rate, damage_rate, reward: reward(win_rate, damage_rate) })
}
