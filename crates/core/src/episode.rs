//! Episode and batch runners.
//! A failed episode is skipped and logged; only a bad team draft stops the batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::battle::{Battle, SideAgents};
use crate::journal::{BattleSetup, InputJournal};
use crate::metrics::{SideMetrics, side_metrics};
use crate::state::{Roster, RosterError, StartingStats};
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub index: u32,
    pub seed: u64,
    pub winner: Winner,
    pub end: EpisodeEnd,
    pub rounds: u32,
    /// Damage dealt by each side, indexed by `Side::index`.
    pub damage_dealt: [i64; 2],
    pub final_hash: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeResult {
    pub summary: EpisodeSummary,
    pub journal: InputJournal,
}

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug)]
pub struct SkippedEpisode {
    pub index: u32,
    pub seed: u64,
    pub error: EpisodeError,
    /// Inputs accepted before the failure.
    pub journal: InputJournal,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("a batch needs at least one episode")]
    NoEpisodes,
    #[error("team generation for {side} failed: {source}")]
    Draft {
        side: Side,
        #[source]
        source: RosterError,
    },
}

#[derive(Debug)]
pub struct BatchReport {
    pub completed: Vec<EpisodeResult>,
    pub skipped: Vec<SkippedEpisode>,
    /// Per-side metrics over completed episodes, indexed by `Side::index`.
    pub metrics: Option<[SideMetrics; 2]>,
}

impl BatchReport {
    /// The side with the higher reward, or `Draw` when they are equal.
    pub fn leader(&self) -> Option<Winner> {
        let [a, b] = self.metrics?;
        Some(if a.reward > b.reward {
            Winner::Side(Side::A)
        } else if b.reward > a.reward {
            Winner::Side(Side::B)
        } else {
            Winner::Draw
        })
    }
}

/// Seed for episode `index` of a batch seeded with `base`.
pub fn episode_seed(base: u64, index: u32) -> u64 {
    base ^ (u64::from(index) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Runs one episode to completion on fresh rosters.
/// On failure the inputs accepted so far come back alongside the error.
pub fn run_episode(
    index: u32,
    setup: BattleSetup,
    agents: &mut [SideAgents; 2],
) -> Result<EpisodeResult, (EpisodeError, InputJournal)> {
    let mut battle = match Battle::new(&setup) {
        Ok(battle) => battle,
        Err(err) => return Err((err.into(), InputJournal::new(setup))),
    };
    let outcome = battle.run_to_end(agents);
    let mut journal = InputJournal::new(setup);
    journal.inputs = battle.take_inputs();
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => return Err((err.into(), journal)),
    };

    let summary = EpisodeSummary {
        index,
        seed: battle.seed(),
        winner: outcome.winner,
        end: outcome.end,
        rounds: outcome.rounds,
        damage_dealt: [battle.damage_dealt(Side::A), battle.damage_dealt(Side::B)],
        final_hash: battle.snapshot_hash(),
    };
    info!(
        target: "battle.episode",
        index,
        winner = ?summary.winner,
        end = ?summary.end,
        rounds = summary.rounds,
        damage_a = summary.damage_dealt[0],
        damage_b = summary.damage_dealt[1],
        "episode finished"
    );
    Ok(EpisodeResult { summary, journal })
}

/// Runs `episodes` independent episodes built from `base`, each with its own derived seed.
/// Both drafts are checked once up front; a bad draft aborts before any episode runs.
pub fn run_batch<F>(base: &BattleSetup, episodes: u32, mut make_agents: F) -> Result<BatchReport, BatchError>
where
    F: FnMut(&BattleSetup) -> [SideAgents; 2],
{
    if episodes == 0 {
        return Err(BatchError::NoEpisodes);
    }
    for side in Side::BOTH {
        Roster::from_drafts(side, base.team(side), StartingStats::default())
            .map_err(|source| BatchError::Draft { side, source })?;
    }

    let mut completed = Vec::new();
    let mut skipped = Vec::new();
    for index in 0..episodes {
        let mut setup = base.clone();
        setup.seed = episode_seed(base.seed, index);
        let seed = setup.seed;
        info!(target: "battle.episode", index, seed, "episode started");
        let mut agents = make_agents(&setup);
        match run_episode(index, setup, &mut agents) {
            Ok(result) => completed.push(result),
            Err((error, journal)) => {
                warn!(target: "battle.episode", index, seed, %error, "episode skipped");
                skipped.push(SkippedEpisode { index, seed, error, journal });
            }
        }
    }

    let summaries: Vec<EpisodeSummary> = completed.iter().map(|result| result.summary.clone()).collect();
    let metrics = side_metrics(&summaries, Side::A).zip(side_metrics(&summaries, Side::B)).map(|(a, b)| [a, b]);
    Ok(BatchReport { completed, skipped, metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ParsedSkill;
    use crate::oracle::{
        ActionDecision, HeuristicOracle, OracleProfile, RuleSkillParser, ScriptedOracle,
        ScriptedParser, TargetReply,
    };
    use crate::state::{Difficulty, HeroDraft};

    fn base(seed: u64) -> BattleSetup {
        let team = |names: [&str; 4]| names.into_iter().map(HeroDraft::named).collect();
        BattleSetup {
            seed,
            teams: [
                team(["Nord", "Breton", "Redguard", "Bosmer"]),
                team(["Argonian", "Khajit", "Imperial", "Onsimer"]),
            ],
            difficulty: Difficulty::default(),
            scaled_side: Side::B,
            max_rounds: 60,
        }
    }

    fn heuristic(setup: &BattleSetup) -> [SideAgents; 2] {
        Side::BOTH.map(|side| SideAgents {
            oracle: Box::new(HeuristicOracle::new(
                OracleProfile::Tactical,
                setup.seed.wrapping_add(side.index() as u64),
            )),
            parser: Box::new(RuleSkillParser::new().unwrap()),
        })
    }

    #[test]
    fn episode_seeds_are_distinct_and_stable() {
        let seeds: Vec<u64> = (0..5).map(|index| episode_seed(7, index)).collect();
        for (i, seed) in seeds.iter().enumerate() {
            assert!(!seeds[i + 1..].contains(seed));
        }
        assert_eq!(seeds, (0..5).map(|index| episode_seed(7, index)).collect::<Vec<_>>());
    }

    #[test]
    fn heuristic_batch_completes_and_reports_bounded_metrics() {
        let report = run_batch(&base(3), 4, heuristic).unwrap();
        assert_eq!(report.completed.len() + report.skipped.len(), 4);
        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        let [a, b] = report.metrics.unwrap();
        for metrics in [a, b] {
            assert!((0.0..=1.0).contains(&metrics.win_rate));
            assert!(metrics.damage_rate >= 0.0);
        }
        assert!(a.wins + b.wins <= 4);
        assert!(report.leader().is_some());
    }

    #[test]
    fn failing_episode_is_skipped_not_fatal() {
        let mut calls = 0;
        let report = run_batch(&base(1), 3, |setup| {
            calls += 1;
            if calls == 2 {
                // Side A surrenders on its first turn; side B never acts.
                let surrender = ScriptedOracle::new(
                    [ActionDecision {
                        hero: 0,
                        skill: SkillKind::BasicAttack,
                        target_type: TargetType::Enemy,
                        teammate_target: None,
                    }],
                    [TargetReply::Surrender],
                );
                return [
                    SideAgents { oracle: Box::new(surrender), parser: Box::new(ScriptedParser::default()) },
                    SideAgents {
                        oracle: Box::new(ScriptedOracle::default()),
                        parser: Box::new(ScriptedParser::new([ParsedSkill::single(1.0)])),
                    },
                ];
            }
            if calls == 3 {
                return [
                    SideAgents {
                        oracle: Box::new(ScriptedOracle::default()),
                        parser: Box::new(ScriptedParser::default()),
                    },
                    SideAgents {
                        oracle: Box::new(ScriptedOracle::default()),
                        parser: Box::new(ScriptedParser::default()),
                    },
                ];
            }
            heuristic(setup)
        })
        .unwrap();

        assert_eq!(report.completed.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        let skipped = &report.skipped[0];
        assert_eq!(skipped.index, 2);
        assert!(matches!(skipped.error, EpisodeError::Engine(EngineError::OracleUnavailable(_))));
        let surrendered = &report.completed[1].summary;
        assert_eq!(surrendered.winner, Winner::Side(Side::B));
        assert_eq!(surrendered.end, EpisodeEnd::GameOver(GameOverCause::Surrender));
        assert_eq!(surrendered.damage_dealt, [0, 0]);
    }

    #[test]
    fn bad_draft_aborts_before_any_episode() {
        let mut setup = base(1);
        setup.teams[1][2] = HeroDraft::named("Dwemer");
        let mut calls = 0;
        let result = run_batch(&setup, 3, |setup| {
            calls += 1;
            heuristic(setup)
        });
        assert!(matches!(result, Err(BatchError::Draft { side: Side::B, .. })));
        assert_eq!(calls, 0);
        assert!(matches!(run_batch(&base(1), 0, heuristic), Err(BatchError::NoEpisodes)));
    }
}
