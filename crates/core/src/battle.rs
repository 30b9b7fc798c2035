//! One encounter: both rosters, both intel ledgers, and the turn machine driving them.
//! Turns alternate A then B; a round is complete once B has acted.

use std::cmp::Ordering;
use std::mem;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::intel::IntelLedger;
use crate::journal::{BattleSetup, InputPayload, InputRecord};
use crate::oracle::{DecisionOracle, SkillParser};
use crate::state::{Roster, RosterError, StartingStats};
use crate::types::*;

mod hash;
mod turn;

#[cfg(test)]
mod tests;

pub use turn::TurnStop;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideState {
    pub roster: Roster,
    pub intel: IntelLedger,
    /// Total roster health at creation, after difficulty scaling.
    pub starting_health: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub winner: Winner,
    pub end: EpisodeEnd,
    pub rounds: u32,
}

/// The decision sources for one side.
pub struct SideAgents {
    pub oracle: Box<dyn DecisionOracle>,
    pub parser: Box<dyn SkillParser>,
}

pub struct Battle {
    seed: u64,
    round: u32,
    max_rounds: u32,
    to_act: Side,
    rng: ChaCha8Rng,
    sides: [SideState; 2],
    log: Vec<LogEvent>,
    inputs: Vec<InputRecord>,
    next_input_seq: u64,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    pub fn new(setup: &BattleSetup) -> Result<Self, RosterError> {
        let side_state = |side: Side| -> Result<SideState, RosterError> {
            let stats = if side == setup.scaled_side {
                setup.difficulty.scale(StartingStats::default())
            } else {
                StartingStats::default()
            };
            let roster = Roster::from_drafts(side, setup.team(side), stats)?;
            let starting_health = roster.total_health();
            Ok(SideState { roster, intel: IntelLedger::new(), starting_health })
        };
        Ok(Self::from_sides(setup.seed, setup.max_rounds, [side_state(Side::A)?, side_state(Side::B)?]))
    }

    pub(crate) fn from_sides(seed: u64, max_rounds: u32, sides: [SideState; 2]) -> Self {
        Self {
            seed,
            round: 1,
            max_rounds,
            to_act: Side::A,
            rng: ChaCha8Rng::seed_from_u64(seed),
            sides,
            log: Vec::new(),
            inputs: Vec::new(),
            next_input_seq: 0,
            outcome: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The round in progress, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn to_act(&self) -> Side {
        self.to_act
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[side.index()]
    }

    pub fn roster(&self, side: Side) -> &Roster {
        &self.sides[side.index()].roster
    }

    /// What `side` knows about its opponent.
    pub fn intel(&self, side: Side) -> &IntelLedger {
        &self.sides[side.index()].intel
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn inputs(&self) -> &[InputRecord] {
        &self.inputs
    }

    pub fn take_inputs(&mut self) -> Vec<InputRecord> {
        mem::take(&mut self.inputs)
    }

    /// Damage `side` has dealt so far: the opponent's starting total minus its current total.
    /// Healing above the starting total does not make this negative.
    pub fn damage_dealt(&self, side: Side) -> i64 {
        let opponent = self.side(side.opponent());
        (opponent.starting_health - opponent.roster.total_health()).max(0)
    }

    /// Plays turns until the game ends or the round limit is reached.
    pub fn run_to_end(&mut self, agents: &mut [SideAgents; 2]) -> Result<BattleOutcome, EngineError> {
        loop {
            if let Some(outcome) = self.outcome {
                return Ok(outcome);
            }
            if self.round > self.max_rounds {
                return Ok(self.finish_by_round_limit());
            }
            let agents = &mut agents[self.to_act.index()];
            self.play_turn(agents.oracle.as_mut(), agents.parser.as_mut())?;
        }
    }

    fn finish_by_round_limit(&mut self) -> BattleOutcome {
        let alive_a = self.roster(Side::A).alive_count();
        let alive_b = self.roster(Side::B).alive_count();
        let winner = match alive_a.cmp(&alive_b) {
            Ordering::Greater => Winner::Side(Side::A),
            Ordering::Less => Winner::Side(Side::B),
            Ordering::Equal => Winner::Draw,
        };
        let outcome = BattleOutcome { winner, end: EpisodeEnd::RoundLimit, rounds: self.max_rounds };
        info!(target: "battle.turn", alive_a, alive_b, ?winner, "round limit reached");
        self.outcome = Some(outcome);
        outcome
    }

    fn record(&mut self, side: Side, payload: InputPayload) {
        self.inputs.push(InputRecord { seq: self.next_input_seq, round: self.round, side, payload });
        self.next_input_seq += 1;
    }

    #[cfg(test)]
    pub(crate) fn roster_mut(&mut self, side: Side) -> &mut Roster {
        &mut self.sides[side.index()].roster
    }
}

