use serde::{Deserialize, Serialize};

use crate::combat::ParsedSkill;
use crate::oracle::{ActionDecision, TargetReply};
use crate::state::{Difficulty, HeroDraft};
use crate::types::Side;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

/// Everything needed to rebuild an episode's starting position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub seed: u64,
    /// Drafts indexed by `Side::index`.
    pub teams: [Vec<HeroDraft>; 2],
    pub difficulty: Difficulty,
    pub scaled_side: Side,
    pub max_rounds: u32,
}

impl BattleSetup {
    pub fn team(&self, side: Side) -> &[HeroDraft] {
        &self.teams[side.index()]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub setup: BattleSetup,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub round: u32,
    pub side: Side,
    pub payload: InputPayload,
}

/// One accepted oracle response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputPayload {
    Action(ActionDecision),
    Target(TargetReply),
    SkillParse(ParsedSkill),
}

impl InputJournal {
    pub fn new(setup: BattleSetup) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: env!("CARGO_PKG_VERSION").to_string(),
            setup,
            inputs: Vec::new(),
        }
    }

    pub fn inputs_for(&self, side: Side) -> impl Iterator<Item = &InputRecord> {
        self.inputs.iter().filter(move |record| record.side == side)
    }
}
