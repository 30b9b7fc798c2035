//! External decision sources consulted by the turn orchestrator.
//! The engine never trusts these: every response is validated before it mutates state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::ParsedSkill;
use crate::intel::IntelEntry;
use crate::state::{Hero, Roster};
use crate::types::*;

mod heuristic;
mod rules;
mod scripted;
pub mod wire;

pub use heuristic::{HeuristicOracle, OracleProfile};
pub use rules::RuleSkillParser;
pub use scripted::{ScriptedOracle, ScriptedParser};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle response malformed: {0}")]
    Malformed(String),
}

impl From<OracleError> for EngineError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Unavailable(msg) => EngineError::OracleUnavailable(msg),
            OracleError::Malformed(msg) => EngineError::OracleMalformed(msg),
        }
    }
}

/// Serialized view of one own-team hero, as handed to action selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroView {
    pub position: u8,
    pub name: String,
    pub health: i32,
    pub attack_power: i32,
    pub status: HeroStatus,
    pub revealed: bool,
    pub shield_active: bool,
    pub active: SkillKind,
    pub passive_text: String,
    pub active_text: String,
}

impl From<&Hero> for HeroView {
    fn from(hero: &Hero) -> Self {
        Self {
            position: hero.position,
            name: hero.archetype.name().to_string(),
            health: hero.health,
            attack_power: hero.attack_power,
            status: hero.status,
            revealed: hero.revealed,
            shield_active: hero.shield_active,
            active: hero.active,
            passive_text: hero.passive_text.clone(),
            active_text: hero.active_text.clone(),
        }
    }
}

impl HeroView {
    pub fn is_alive(&self) -> bool {
        self.status == HeroStatus::Alive
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterView {
    pub side: Side,
    pub heroes: Vec<HeroView>,
}

impl From<&Roster> for RosterView {
    fn from(roster: &Roster) -> Self {
        Self { side: roster.side, heroes: roster.heroes().iter().map(HeroView::from).collect() }
    }
}

/// Oracle #1 response: who acts, with what, against which side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecision {
    pub hero: u8,
    pub skill: SkillKind,
    pub target_type: TargetType,
    pub teammate_target: Option<u8>,
}

/// Oracle #2 input: the acting hero plus everything its side knows about the enemy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    pub side: Side,
    pub actor: HeroView,
    pub skill: SkillKind,
    pub intel: Vec<IntelEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetReply {
    Attack { position: u8, guessed_identity: String },
    Surrender,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillQuery {
    pub text: String,
    pub attacker_attack_power: i32,
    pub target_health: i32,
}

pub trait DecisionOracle {
    fn select_action(&mut self, roster: &RosterView) -> Result<ActionDecision, OracleError>;
    fn choose_target(&mut self, request: &TargetRequest) -> Result<TargetReply, OracleError>;
}

pub trait SkillParser {
    fn parse(&mut self, query: &SkillQuery) -> Result<ParsedSkill, OracleError>;
}

impl<T: DecisionOracle + ?Sized> DecisionOracle for Box<T> {
    fn select_action(&mut self, roster: &RosterView) -> Result<ActionDecision, OracleError> {
        (**self).select_action(roster)
    }

    fn choose_target(&mut self, request: &TargetRequest) -> Result<TargetReply, OracleError> {
        (**self).choose_target(request)
    }
}

impl<T: SkillParser + ?Sized> SkillParser for Box<T> {
    fn parse(&mut self, query: &SkillQuery) -> Result<ParsedSkill, OracleError> {
        (**self).parse(query)
    }
}
