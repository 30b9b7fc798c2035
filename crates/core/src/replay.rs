//! Re-executes a recorded episode from its input journal.

use thiserror::Error;

use crate::battle::{Battle, BattleOutcome, SideAgents};
use crate::journal::{InputJournal, InputPayload};
use crate::oracle::{ScriptedOracle, ScriptedParser};
use crate::state::RosterError;
use crate::types::{EngineError, Side};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("journal setup does not build: {0}")]
    Roster(#[from] RosterError),
    #[error("journal ran out of inputs for {side}")]
    MissingInput { side: Side },
    #[error("replay failed: {0}")]
    Engine(EngineError),
    #[error("{remaining} journal inputs were never consumed")]
    TrailingInput { remaining: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub outcome: BattleOutcome,
    pub final_snapshot_hash: u64,
    pub rounds: u32,
}

fn scripted_agents(journal: &InputJournal, side: Side) -> SideAgents {
    let mut oracle = ScriptedOracle::default();
    let mut parser = ScriptedParser::default();
    for record in journal.inputs_for(side) {
        match &record.payload {
            InputPayload::Action(action) => oracle.push_action(action.clone()),
            InputPayload::Target(reply) => oracle.push_target(reply.clone()),
            InputPayload::SkillParse(parse) => parser.push(*parse),
        }
    }
    SideAgents { oracle: Box::new(oracle), parser: Box::new(parser) }
}

/// Replays `journal` from its setup. Every recorded input must be consumed, in order.
pub fn replay_to_end(journal: &InputJournal) -> Result<ReplayResult, ReplayError> {
    let mut battle = Battle::new(&journal.setup)?;
    let mut agents = Side::BOTH.map(|side| scripted_agents(journal, side));

    let outcome = battle.run_to_end(&mut agents).map_err(|err| match err {
        EngineError::OracleUnavailable(_) => ReplayError::MissingInput { side: battle.to_act() },
        other => ReplayError::Engine(other),
    })?;

    let remaining = journal.inputs.len().saturating_sub(battle.inputs().len());
    if remaining > 0 {
        return Err(ReplayError::TrailingInput { remaining });
    }
    Ok(ReplayResult { outcome, final_snapshot_hash: battle.snapshot_hash(), rounds: outcome.rounds })
}
