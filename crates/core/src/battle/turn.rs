//! The per-turn state machine.
//! Any oracle failure or rule violation aborts the turn with an `EngineError`;
//! defeat and surrender are ordinary terminal phases.

use tracing::{debug, info, warn};

use super::*;
use crate::combat::{AttackPayload, ResolutionFeedback, apply_internal_skill, resolve_attack};
use crate::content::BASIC_ATTACK_TEXT;
use crate::oracle::{ActionDecision, HeroView, RosterView, SkillQuery, TargetReply, TargetRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStop {
    /// Control passed to the other side.
    Continue,
    GameOver(BattleOutcome),
}

#[derive(Debug)]
enum TurnPhase {
    SelectAction,
    Targeting(ActionDecision),
    AttackDispatched { actor: u8, skill: SkillKind, position: u8, guess: String },
    InternalResolved,
    FeedbackApplied { actor: u8, position: u8, feedback: ResolutionFeedback },
    RoundAdvance,
    GameOver(BattleOutcome),
}

impl Battle {
    /// Plays one turn for the side whose turn it is.
    pub fn play_turn(
        &mut self,
        oracle: &mut dyn DecisionOracle,
        parser: &mut dyn SkillParser,
    ) -> Result<TurnStop, EngineError> {
        if let Some(outcome) = self.outcome {
            return Ok(TurnStop::GameOver(outcome));
        }
        let side = self.to_act;
        info!(target: "battle.turn", %side, round = self.round, "turn started");
        self.log.push(LogEvent::TurnStarted { side, round: self.round });

        let mut phase = TurnPhase::SelectAction;
        loop {
            debug!(target: "battle.turn", %side, ?phase, "phase");
            phase = match phase {
                TurnPhase::SelectAction => self.select_action(side, oracle)?,
                TurnPhase::Targeting(decision) => self.choose_target(side, decision, oracle)?,
                TurnPhase::AttackDispatched { actor, skill, position, guess } => {
                    self.dispatch_attack(side, actor, skill, position, guess, parser)?
                }
                TurnPhase::InternalResolved => TurnPhase::RoundAdvance,
                TurnPhase::FeedbackApplied { actor, position, feedback } => {
                    self.apply_feedback(side, actor, position, &feedback)?
                }
                TurnPhase::RoundAdvance => {
                    self.to_act = side.opponent();
                    if side == Side::B {
                        self.round += 1;
                    }
                    return Ok(TurnStop::Continue);
                }
                TurnPhase::GameOver(outcome) => {
                    info!(target: "battle.turn", ?outcome, "game over");
                    self.outcome = Some(outcome);
                    return Ok(TurnStop::GameOver(outcome));
                }
            };
        }
    }

    fn game_over(&self, winner: Side, cause: GameOverCause) -> TurnPhase {
        TurnPhase::GameOver(BattleOutcome {
            winner: Winner::Side(winner),
            end: EpisodeEnd::GameOver(cause),
            rounds: self.round,
        })
    }

    fn select_action(
        &mut self,
        side: Side,
        oracle: &mut dyn DecisionOracle,
    ) -> Result<TurnPhase, EngineError> {
        let roster = self.roster(side);
        if roster.alive_count() == 0 {
            info!(target: "battle.turn", %side, "no hero left standing");
            self.log.push(LogEvent::Defeated { side });
            return Ok(self.game_over(side.opponent(), GameOverCause::Defeat));
        }

        let decision = oracle.select_action(&RosterView::from(roster))?;
        validate_action(roster, &decision)?;

        match (decision.target_type, decision.teammate_target) {
            (TargetType::Teammate, Some(target)) => {
                let roster = &mut self.sides[side.index()].roster;
                apply_internal_skill(roster, decision.hero, decision.skill, target, &mut self.log)?;
                self.record(side, InputPayload::Action(decision));
                Ok(TurnPhase::InternalResolved)
            }
            (TargetType::Teammate, None) => Err(EngineError::OracleMalformed(
                "teammate action without teammate_target_id".to_string(),
            )),
            (TargetType::Enemy, _) => {
                self.record(side, InputPayload::Action(decision.clone()));
                Ok(TurnPhase::Targeting(decision))
            }
        }
    }

    fn choose_target(
        &mut self,
        side: Side,
        decision: ActionDecision,
        oracle: &mut dyn DecisionOracle,
    ) -> Result<TurnPhase, EngineError> {
        let state = self.side(side);
        let actor = state
            .roster
            .hero(decision.hero)
            .ok_or(EngineError::InvalidTarget(decision.hero))?;
        let request = TargetRequest {
            side,
            actor: HeroView::from(actor),
            skill: decision.skill,
            intel: state.intel.snapshot(),
        };
        let reply = oracle.choose_target(&request)?;
        if let TargetReply::Attack { position, .. } = &reply {
            if usize::from(*position) >= ROSTER_SIZE {
                return Err(EngineError::InvalidTarget(*position));
            }
            if state.intel.is_known_dead(*position) {
                return Err(EngineError::IllegalMove(format!(
                    "enemy position {position} is already known dead"
                )));
            }
        }
        self.record(side, InputPayload::Target(reply.clone()));

        Ok(match reply {
            TargetReply::Surrender => {
                info!(target: "battle.turn", %side, "surrender declared");
                self.log.push(LogEvent::Surrendered { side });
                self.game_over(side.opponent(), GameOverCause::Surrender)
            }
            TargetReply::Attack { position, guessed_identity } => TurnPhase::AttackDispatched {
                actor: decision.hero,
                skill: decision.skill,
                position,
                guess: guessed_identity,
            },
        })
    }

    fn dispatch_attack(
        &mut self,
        side: Side,
        actor: u8,
        skill: SkillKind,
        position: u8,
        guess: String,
        parser: &mut dyn SkillParser,
    ) -> Result<TurnPhase, EngineError> {
        let hero = self.roster(side).hero(actor).ok_or(EngineError::InvalidTarget(actor))?;
        let target_health = self
            .roster(side.opponent())
            .hero(position)
            .ok_or(EngineError::InvalidTarget(position))?
            .health;
        let attack_power = hero.attack_power;
        let text = if skill == SkillKind::BasicAttack {
            BASIC_ATTACK_TEXT.to_string()
        } else {
            hero.active_text.clone()
        };
        let parsed = parser.parse(&SkillQuery { text, attacker_attack_power: attack_power, target_health })?;
        self.record(side, InputPayload::SkillParse(parsed));

        info!(
            target: "battle.turn",
            %side,
            actor,
            ?skill,
            enemy = position,
            guess = %guess,
            damage = parsed.damage_amount,
            "attack dispatched"
        );
        self.log.push(LogEvent::AttackDispatched {
            side,
            actor,
            skill,
            target: position,
            guess: guess.clone(),
        });
        let payload = AttackPayload {
            attacker: side,
            actor,
            skill,
            attack_power,
            target: position,
            guessed_identity: guess,
        };
        let defending = &mut self.sides[side.opponent().index()].roster;
        let feedback =
            resolve_attack(defending, &payload, &parsed, &mut self.rng, &mut self.log)?;
        Ok(TurnPhase::FeedbackApplied { actor, position, feedback })
    }

    fn apply_feedback(
        &mut self,
        side: Side,
        actor: u8,
        position: u8,
        feedback: &ResolutionFeedback,
    ) -> Result<TurnPhase, EngineError> {
        let state = &mut self.sides[side.index()];
        if feedback.counter_damage > 0 {
            let died = state.roster.apply_raw_damage(actor, feedback.counter_damage)?;
            self.log.push(LogEvent::Recoil { side, position: actor, amount: feedback.counter_damage });
            if died {
                warn!(target: "battle.turn", %side, actor, "attacker killed by recoil");
                self.log.push(LogEvent::HeroDied { side, position: actor });
            }
        }
        state.intel.apply_feedback(position, feedback);
        Ok(TurnPhase::RoundAdvance)
    }
}

/// Rule checks on an action before anything is mutated.
fn validate_action(roster: &Roster, decision: &ActionDecision) -> Result<(), EngineError> {
    let hero = roster.hero(decision.hero).ok_or(EngineError::InvalidTarget(decision.hero))?;
    if !hero.is_alive() {
        return Err(EngineError::IllegalMove(format!("selected hero {} is dead", decision.hero)));
    }
    if decision.skill != SkillKind::BasicAttack && decision.skill != hero.active {
        return Err(EngineError::IllegalMove(format!(
            "hero {} has no {:?} skill",
            decision.hero, decision.skill
        )));
    }
    match decision.target_type {
        TargetType::Enemy if decision.skill.is_internal() => Err(EngineError::IllegalMove(
            format!("{:?} cannot target an enemy", decision.skill),
        )),
        TargetType::Teammate if !decision.skill.is_internal() => Err(EngineError::IllegalMove(
            format!("{:?} must target an enemy", decision.skill),
        )),
        _ => Ok(()),
    }
}
