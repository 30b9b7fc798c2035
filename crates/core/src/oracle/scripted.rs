use std::collections::VecDeque;

use super::{
    ActionDecision, DecisionOracle, OracleError, RosterView, SkillParser, SkillQuery,
    TargetReply, TargetRequest,
};
use crate::combat::ParsedSkill;

/// Queue-backed decision oracle. Replays responses in order; running dry is `Unavailable`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedOracle {
    actions: VecDeque<ActionDecision>,
    targets: VecDeque<TargetReply>,
}

impl ScriptedOracle {
    pub fn new(
        actions: impl IntoIterator<Item = ActionDecision>,
        targets: impl IntoIterator<Item = TargetReply>,
    ) -> Self {
        Self { actions: actions.into_iter().collect(), targets: targets.into_iter().collect() }
    }

    pub fn push_action(&mut self, action: ActionDecision) {
        self.actions.push_back(action);
    }

    pub fn push_target(&mut self, reply: TargetReply) {
        self.targets.push_back(reply);
    }

    pub fn remaining(&self) -> usize {
        self.actions.len() + self.targets.len()
    }
}

impl DecisionOracle for ScriptedOracle {
    fn select_action(&mut self, _roster: &RosterView) -> Result<ActionDecision, OracleError> {
        self.actions
            .pop_front()
            .ok_or_else(|| OracleError::Unavailable("no scripted action left".to_string()))
    }

    fn choose_target(&mut self, _request: &TargetRequest) -> Result<TargetReply, OracleError> {
        self.targets
            .pop_front()
            .ok_or_else(|| OracleError::Unavailable("no scripted target left".to_string()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedParser {
    parses: VecDeque<ParsedSkill>,
}

impl ScriptedParser {
    pub fn new(parses: impl IntoIterator<Item = ParsedSkill>) -> Self {
        Self { parses: parses.into_iter().collect() }
    }

    pub fn push(&mut self, parse: ParsedSkill) {
        self.parses.push_back(parse);
    }

    pub fn remaining(&self) -> usize {
        self.parses.len()
    }
}

impl SkillParser for ScriptedParser {
    fn parse(&mut self, _query: &SkillQuery) -> Result<ParsedSkill, OracleError> {
        self.parses
            .pop_front()
            .ok_or_else(|| OracleError::Unavailable("no scripted skill parse left".to_string()))
    }
}
