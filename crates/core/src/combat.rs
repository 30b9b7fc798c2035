//! Attack resolution against a defending roster.
//! This module owns the breach penalty, target selection and the finishing bonus.
//! The per-target passive pipeline lives in `pipeline`, own-team skills in `internal`.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::state::Roster;
use crate::types::*;

mod internal;
mod pipeline;


pub use internal::apply_internal_skill;

pub const BREACH_DAMAGE: i32 = 50;
pub const FINISHER_HEALTH_THRESHOLD: i32 = 160;
pub const FINISHER_MULTIPLIER: f64 = 1.4;

/// Percent-scale randomness consumed by the Reduce passive.
pub trait ChanceRoll {
    /// Uniform value in `0..100`.
    fn roll_percent(&mut self) -> u32;
}

impl ChanceRoll for ChaCha8Rng {
    fn roll_percent(&mut self) -> u32 {
        (self.next_u64() % 100) as u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackPayload {
    pub attacker: Side,
    pub actor: u8,
    pub skill: SkillKind,
    pub attack_power: i32,
    pub target: u8,
    pub guessed_identity: String,
}

/// Numeric reading of a skill description, produced by the skill-parsing oracle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedSkill {
    pub damage_amount: f64,
    pub is_aoe: bool,
    pub targets_lowest: bool,
}

impl ParsedSkill {
    pub fn single(damage_amount: f64) -> Self {
        Self { damage_amount, is_aoe: false, targets_lowest: false }
    }

    /// Whole-point damage; fractions are dropped.
    pub fn damage_points(&self) -> Result<i32, EngineError> {
        if !self.damage_amount.is_finite() || self.damage_amount < 0.0 {
            return Err(EngineError::MalformedSkillParse(format!(
                "damage_amount must be a non-negative number, got {}",
                self.damage_amount
            )));
        }
        if self.damage_amount > f64::from(i32::MAX) {
            return Err(EngineError::MalformedSkillParse(format!(
                "damage_amount {} is out of range",
                self.damage_amount
            )));
        }
        Ok(self.damage_amount as i32)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionFeedback {
    pub guess_correct: bool,
    /// Present only on the guess that first revealed the target.
    pub actual_identity: Option<Archetype>,
    pub counter_damage: i32,
    pub target_health: i32,
    pub target_status: HeroStatus,
    /// Positions that died during this resolution, in order of death.
    pub newly_dead: Vec<u8>,
}

pub fn resolve_attack(
    defending: &mut Roster,
    attack: &AttackPayload,
    skill: &ParsedSkill,
    rolls: &mut dyn ChanceRoll,
    log: &mut Vec<LogEvent>,
) -> Result<ResolutionFeedback, EngineError> {
    let Some(target) = defending.hero(attack.target) else {
        return Err(EngineError::InvalidTarget(attack.target));
    };
    let mut damage = skill.damage_points()?;
    let side = defending.side;
    let target_idx = usize::from(attack.target);
    let mut newly_dead = Vec::new();

    let guess_correct = target.archetype.matches_guess(&attack.guessed_identity);
    let mut actual_identity = None;
    if guess_correct && !target.revealed {
        actual_identity = Some(target.archetype);
        info!(
            target: "battle.combat",
            side = %side,
            position = attack.target,
            identity = %target.archetype,
            "breach: identity guessed, global damage applied"
        );
        log.push(LogEvent::Breach { side, position: attack.target });
        let heroes = defending.heroes_mut();
        heroes[target_idx].revealed = true;
        for hero in heroes.iter_mut() {
            if hero.lose_health(BREACH_DAMAGE) {
                newly_dead.push(hero.position);
                log.push(LogEvent::HeroDied { side, position: hero.position });
            }
        }
    }

    let targets = if skill.is_aoe {
        defending.alive_positions()
    } else if skill.targets_lowest {
        match lowest_health_alive(defending) {
            Some((position, health)) => {
                if health < FINISHER_HEALTH_THRESHOLD {
                    let boosted = (f64::from(attack.attack_power) * FINISHER_MULTIPLIER) as i32;
                    if boosted > damage {
                        debug!(target: "battle.combat", from = damage, to = boosted, "finisher bonus");
                        damage = boosted;
                    }
                }
                vec![position]
            }
            None => Vec::new(),
        }
    } else if defending.heroes()[target_idx].is_alive() {
        vec![attack.target]
    } else {
        Vec::new()
    };

    let mut counter_damage = 0;
    for position in targets {
        // Breach or a deflected share may already have killed a queued target.
        if !defending.heroes()[usize::from(position)].is_alive() {
            continue;
        }
        counter_damage += pipeline::strike(defending, position, damage, rolls, log, &mut newly_dead);
    }

    let target = &defending.heroes()[target_idx];
    Ok(ResolutionFeedback {
        guess_correct,
        actual_identity,
        counter_damage,
        target_health: target.health,
        target_status: target.status,
        newly_dead,
    })
}

/// Lowest-health alive hero; ties go to the lower position.
fn lowest_health_alive(roster: &Roster) -> Option<(u8, i32)> {
    roster
        .heroes()
        .iter()
        .filter(|hero| hero.is_alive())
        .min_by_key(|hero| (hero.health, hero.position))
        .map(|hero| (hero.position, hero.health))
}
