use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{self, BASE_ATTACK_POWER, BASE_HEALTH};
use crate::types::*;

/// Attack-power bookkeeping threshold for the Deflect passive.
pub const DEFLECT_BUFF_STEP: i32 = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub position: u8,
    pub archetype: Archetype,
    pub health: i32,
    pub attack_power: i32,
    pub status: HeroStatus,
    pub revealed: bool,
    pub shield_active: bool,
    pub accumulated_damage: i32,
    pub buff_threshold: i32,
    pub passive: PassiveKind,
    pub active: SkillKind,
    pub passive_text: String,
    pub active_text: String,
}

impl Hero {
    pub fn is_alive(&self) -> bool {
        self.status == HeroStatus::Alive
    }

    /// Raw health loss with the death check; returns true when this hit killed the hero.
    pub(crate) fn lose_health(&mut self, amount: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health -= amount;
        self.check_death()
    }

    pub(crate) fn check_death(&mut self) -> bool {
        if self.is_alive() && self.health <= 0 {
            self.health = 0;
            self.status = HeroStatus::Dead;
            return true;
        }
        false
    }
}

/// One team-generation entry. Missing texts fall back to the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroDraft {
    pub name: String,
    #[serde(default)]
    pub passive: Option<String>,
    #[serde(default)]
    pub active: Option<String>,
}

impl HeroDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), passive: None, active: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("a roster needs exactly 4 heroes, got {0}")]
    WrongSize(usize),
    #[error("unknown hero archetype '{0}'")]
    UnknownArchetype(String),
    #[error("hero archetype '{0}' drafted twice")]
    DuplicateArchetype(String),
    #[error("passive ability of {name} is not recognised: '{text}'")]
    UnclassifiedPassive { name: String, text: String },
    #[error("active ability of {name} is not recognised: '{text}'")]
    UnclassifiedActive { name: String, text: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingStats {
    pub health: i32,
    pub attack_power: i32,
}

impl Default for StartingStats {
    fn default() -> Self {
        Self { health: BASE_HEALTH, attack_power: BASE_ATTACK_POWER }
    }
}

/// Stat multiplier `sqrt(ratio)` applied once to one side before roster creation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub ratio: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

impl Difficulty {
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self { ratio })
    }

    pub fn is_identity(&self) -> bool {
        self.ratio == 1.0
    }

    pub fn scale(&self, stats: StartingStats) -> StartingStats {
        if self.is_identity() {
            return stats;
        }
        let factor = self.ratio.sqrt();
        StartingStats {
            health: (f64::from(stats.health) * factor) as i32,
            attack_power: (f64::from(stats.attack_power) * factor) as i32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub side: Side,
    heroes: [Hero; ROSTER_SIZE],
}

impl Roster {
    pub fn from_drafts(
        side: Side,
        drafts: &[HeroDraft],
        stats: StartingStats,
    ) -> Result<Self, RosterError> {
        if drafts.len() != ROSTER_SIZE {
            return Err(RosterError::WrongSize(drafts.len()));
        }
        let mut heroes = Vec::with_capacity(ROSTER_SIZE);
        for (idx, draft) in drafts.iter().enumerate() {
            let archetype = Archetype::parse(&draft.name)
                .ok_or_else(|| RosterError::UnknownArchetype(draft.name.clone()))?;
            if heroes.iter().any(|hero: &Hero| hero.archetype == archetype) {
                return Err(RosterError::DuplicateArchetype(archetype.name().to_string()));
            }
            let template = content::template(archetype);
            let passive_text = draft.passive.clone().unwrap_or_else(|| template.passive.to_string());
            let active_text = draft.active.clone().unwrap_or_else(|| template.active.to_string());
            let passive = content::classify_passive(&passive_text).ok_or_else(|| {
                RosterError::UnclassifiedPassive {
                    name: archetype.name().to_string(),
                    text: passive_text.clone(),
                }
            })?;
            let active = content::classify_active(&active_text)
                .filter(|kind| *kind != SkillKind::BasicAttack)
                .ok_or_else(|| RosterError::UnclassifiedActive {
                    name: archetype.name().to_string(),
                    text: active_text.clone(),
                })?;
            heroes.push(Hero {
                position: idx as u8,
                archetype,
                health: stats.health,
                attack_power: stats.attack_power,
                status: HeroStatus::Alive,
                revealed: false,
                shield_active: false,
                accumulated_damage: 0,
                buff_threshold: DEFLECT_BUFF_STEP,
                passive,
                active,
                passive_text,
                active_text,
            });
        }
        let heroes: [Hero; ROSTER_SIZE] =
            heroes.try_into().map_err(|rest: Vec<Hero>| RosterError::WrongSize(rest.len()))?;
        Ok(Self { side, heroes })
    }

    pub fn hero(&self, position: u8) -> Option<&Hero> {
        self.heroes.get(usize::from(position))
    }

    pub fn hero_mut(&mut self, position: u8) -> Option<&mut Hero> {
        self.heroes.get_mut(usize::from(position))
    }

    pub fn heroes(&self) -> &[Hero; ROSTER_SIZE] {
        &self.heroes
    }

    pub(crate) fn heroes_mut(&mut self) -> &mut [Hero; ROSTER_SIZE] {
        &mut self.heroes
    }

    pub fn alive_positions(&self) -> Vec<u8> {
        self.heroes.iter().filter(|hero| hero.is_alive()).map(|hero| hero.position).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.heroes.iter().filter(|hero| hero.is_alive()).count()
    }

    pub fn total_health(&self) -> i64 {
        self.heroes.iter().map(|hero| i64::from(hero.health)).sum()
    }

    /// Health loss that bypasses every passive (recoil, Infight, breach, deflect shares).
    /// Returns true when the hero died from it.
    pub fn apply_raw_damage(&mut self, position: u8, amount: i32) -> Result<bool, EngineError> {
        let hero = self.hero_mut(position).ok_or(EngineError::InvalidTarget(position))?;
        Ok(hero.lose_health(amount))
    }
}
