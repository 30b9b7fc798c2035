//! Seeded, rule-based stand-in for the model-backed decision oracle.
//! `Tactical` plays the way the manager and lead prompts ask a model to play;
//! `Random` samples uniformly among legal moves.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{
    ActionDecision, DecisionOracle, HeroView, OracleError, RosterView, TargetReply, TargetRequest,
};
use crate::intel::KnownStatus;
use crate::types::*;

/// No hero may be picked more often than this in a row.
const MAX_CONSECUTIVE_PICKS: usize = 2;
/// Subtle goes to the weakest unshielded teammate once it drops under this.
const SHIELD_BELOW_HEALTH: i32 = 200;
/// Infight only hits a teammate that keeps at least this much health afterwards.
const INFIGHT_SAFE_REMAINDER: i32 = 200;
const INFIGHT_COST: i32 = 75;
/// Attack power beyond which Infight stops paying off.
const INFIGHT_ATTACK_CAP: i32 = 500;

const HOSTED_MODEL_FAMILIES: [&str; 4] = ["gpt", "claude", "gemini", "llama"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProfile {
    Tactical,
    Random,
}

impl OracleProfile {
    /// Maps a model identifier to a profile. Any id naming a hosted-model family
    /// (`gpt`, `claude`, `gemini`, `llama`) plays tactically.
    pub fn from_model_id(model: &str) -> Option<Self> {
        let model = model.trim().to_ascii_lowercase();
        if model == "random" {
            return Some(Self::Random);
        }
        let hosted = HOSTED_MODEL_FAMILIES.iter().any(|family| model.contains(family));
        (model == "tactical" || hosted).then_some(Self::Tactical)
    }
}

pub struct HeuristicOracle {
    profile: OracleProfile,
    rng: ChaCha8Rng,
    recent: Vec<u8>,
}

fn pick<T: Clone>(rng: &mut ChaCha8Rng, options: &[T]) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    let idx = (rng.next_u64() % options.len() as u64) as usize;
    options.get(idx).cloned()
}

impl HeuristicOracle {
    pub fn new(profile: OracleProfile, seed: u64) -> Self {
        Self { profile, rng: ChaCha8Rng::seed_from_u64(seed), recent: Vec::new() }
    }

    pub fn profile(&self) -> OracleProfile {
        self.profile
    }

    fn remember(&mut self, hero: u8) {
        self.recent.push(hero);
        if self.recent.len() > MAX_CONSECUTIVE_PICKS {
            self.recent.remove(0);
        }
    }

    /// Alive heroes, minus one that already acted the maximum number of times in a row.
    fn eligible<'a>(&self, roster: &'a RosterView) -> Vec<&'a HeroView> {
        let alive: Vec<&HeroView> = roster.heroes.iter().filter(|hero| hero.is_alive()).collect();
        let streak = self.recent.len() == MAX_CONSECUTIVE_PICKS
            && self.recent.windows(2).all(|pair| pair[0] == pair[1]);
        let blocked = streak.then(|| self.recent[0]);
        let rested: Vec<&HeroView> =
            alive.iter().copied().filter(|hero| Some(hero.position) != blocked).collect();
        if rested.is_empty() { alive } else { rested }
    }

    fn tactical_action(&mut self, roster: &RosterView) -> Option<ActionDecision> {
        let eligible = self.eligible(roster);
        let alive: Vec<&HeroView> = roster.heroes.iter().filter(|hero| hero.is_alive()).collect();

        let weakest_unshielded = alive
            .iter()
            .filter(|hero| !hero.shield_active && hero.health < SHIELD_BELOW_HEALTH)
            .min_by_key(|hero| (hero.health, hero.position));
        if let Some(weak) = weakest_unshielded
            && let Some(caster) = eligible.iter().find(|hero| hero.active == SkillKind::Subtle)
        {
            return Some(ActionDecision {
                hero: caster.position,
                skill: SkillKind::Subtle,
                target_type: TargetType::Teammate,
                teammate_target: Some(weak.position),
            });
        }

        let actor = eligible.iter().max_by_key(|hero| (hero.attack_power, -i32::from(hero.position)))?;
        let decision = match actor.active {
            SkillKind::Crit | SkillKind::Aoe => ActionDecision {
                hero: actor.position,
                skill: actor.active,
                target_type: TargetType::Enemy,
                teammate_target: None,
            },
            SkillKind::Infight if actor.attack_power < INFIGHT_ATTACK_CAP => {
                let donor = alive
                    .iter()
                    .filter(|mate| mate.position != actor.position)
                    .filter(|mate| mate.health - INFIGHT_COST >= INFIGHT_SAFE_REMAINDER)
                    .max_by_key(|mate| (mate.health, -i32::from(mate.position)));
                match donor {
                    Some(donor) => ActionDecision {
                        hero: actor.position,
                        skill: SkillKind::Infight,
                        target_type: TargetType::Teammate,
                        teammate_target: Some(donor.position),
                    },
                    None => basic_attack(actor.position),
                }
            }
            _ => basic_attack(actor.position),
        };
        Some(decision)
    }

    fn random_action(&mut self, roster: &RosterView) -> Option<ActionDecision> {
        let eligible = self.eligible(roster);
        let actor = pick(&mut self.rng, &eligible)?;
        let alive: Vec<u8> =
            roster.heroes.iter().filter(|hero| hero.is_alive()).map(|hero| hero.position).collect();

        let mut moves = vec![basic_attack(actor.position)];
        match actor.active {
            SkillKind::Crit | SkillKind::Aoe => moves.push(ActionDecision {
                hero: actor.position,
                skill: actor.active,
                target_type: TargetType::Enemy,
                teammate_target: None,
            }),
            SkillKind::Infight | SkillKind::Subtle => {
                for mate in alive {
                    if actor.active == SkillKind::Infight && mate == actor.position {
                        continue;
                    }
                    moves.push(ActionDecision {
                        hero: actor.position,
                        skill: actor.active,
                        target_type: TargetType::Teammate,
                        teammate_target: Some(mate),
                    });
                }
            }
            SkillKind::BasicAttack => {}
        }
        pick(&mut self.rng, &moves)
    }

    fn guess_for(&mut self, request: &TargetRequest, position: u8) -> String {
        let confirmed = request
            .intel
            .iter()
            .find(|entry| entry.position == position)
            .and_then(|entry| entry.identity);
        if let Some(identity) = confirmed {
            return identity.name().to_string();
        }
        let taken: Vec<Archetype> = request.intel.iter().filter_map(|entry| entry.identity).collect();
        let open: Vec<Archetype> =
            Archetype::ALL.into_iter().filter(|archetype| !taken.contains(archetype)).collect();
        pick(&mut self.rng, &open).unwrap_or(Archetype::Argonian).name().to_string()
    }
}

fn basic_attack(hero: u8) -> ActionDecision {
    ActionDecision {
        hero,
        skill: SkillKind::BasicAttack,
        target_type: TargetType::Enemy,
        teammate_target: None,
    }
}

impl DecisionOracle for HeuristicOracle {
    fn select_action(&mut self, roster: &RosterView) -> Result<ActionDecision, OracleError> {
        let decision = match self.profile {
            OracleProfile::Tactical => self.tactical_action(roster),
            OracleProfile::Random => self.random_action(roster),
        }
        .ok_or_else(|| OracleError::Unavailable("no alive hero to act with".to_string()))?;
        self.remember(decision.hero);
        Ok(decision)
    }

    fn choose_target(&mut self, request: &TargetRequest) -> Result<TargetReply, OracleError> {
        let open: Vec<u8> = (0..ROSTER_SIZE as u8)
            .filter(|position| {
                !request.intel.iter().any(|entry| {
                    entry.position == *position && entry.status == KnownStatus::Dead
                })
            })
            .collect();
        if open.is_empty() {
            return Ok(TargetReply::Surrender);
        }

        let position = match self.profile {
            OracleProfile::Tactical => {
                let known_weakest = request
                    .intel
                    .iter()
                    .filter(|entry| open.contains(&entry.position))
                    .filter_map(|entry| entry.health.map(|health| (health, entry.position)))
                    .min();
                match known_weakest {
                    Some((_, position)) => position,
                    None => open[0],
                }
            }
            OracleProfile::Random => pick(&mut self.rng, &open).unwrap_or(open[0]),
        };
        let guessed_identity = self.guess_for(request, position);
        Ok(TargetReply::Attack { position, guessed_identity })
    }
}
