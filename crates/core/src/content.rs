//! Static hero catalog and the free-text ability classifier.
//! Ability text is classified exactly once, when a roster is created; combat
//! code only ever dispatches on the resulting enums.

use crate::types::{Archetype, PassiveKind, SkillKind};

pub const BASE_HEALTH: i32 = 400;
pub const BASE_ATTACK_POWER: i32 = 200;
pub const BASIC_ATTACK_TEXT: &str = "Basic Attack";

pub mod text {
    pub const COUNTER: &str =
        "Counter: Deal 30 damage to the attacker when a teammate's health is below 30%.";
    pub const REDUCE: &str =
        "Reduce: There is a '30%' chance to avoid any incoming damage each time.";
    pub const DEFLECT: &str = "Deflect: Distribute '70%' damage to teammates and take '30%' damage when attacked. Gains 40 attack points after taking 200 damage accumulated.";
    pub const HEAL: &str =
        "Heal: Regain 20 health points if the health is still greater than 0 when attacked.";
    pub const EXPLODE: &str = "Explode: Deal 40 damage to the source when attacked, but not died. when the health is below '30%', increase its attack points by 15.";

    pub const AOE: &str = "AOE: Attacks all enemies for '35%' of its attack point.";
    pub const INFIGHT: &str = "Infight: Deal 75 damage on one living teammate and increase your attack points by 140. Notice! You can't attack yourself or a dead teammate!";
    pub const CRIT_FLAT: &str = "Crit: Deal 120 CRITICAL damage to enemy.";
    pub const CRIT_LOWEST: &str = "Crit: Deal 120 CRITICAL damage of your attack power to the enemy with the lowest health. If the target's health is below 160, increase CRITICAL damage to '140%'.";
    pub const SUBTLE: &str = "Subtle: Choose a teammate or yourself to reduce the damage by '70%' when attacked, and increase your attack point by 20.";
}

pub struct HeroTemplate {
    pub archetype: Archetype,
    pub passive: &'static str,
    pub active: &'static str,
}

pub fn template(archetype: Archetype) -> HeroTemplate {
    let (passive, active) = match archetype {
        Archetype::Argonian => (text::COUNTER, text::AOE),
        Archetype::Khajit => (text::COUNTER, text::INFIGHT),
        Archetype::Redguard => (text::DEFLECT, text::INFIGHT),
        Archetype::Nord => (text::REDUCE, text::CRIT_FLAT),
        Archetype::Breton => (text::REDUCE, text::SUBTLE),
        Archetype::Imperial => (text::HEAL, text::INFIGHT),
        Archetype::Onsimer => (text::HEAL, text::CRIT_LOWEST),
        Archetype::Bosmer => (text::EXPLODE, text::CRIT_LOWEST),
    };
    HeroTemplate { archetype, passive, active }
}

/// Maps a passive description to its kind by its leading keyword.
pub fn classify_passive(description: &str) -> Option<PassiveKind> {
    let lowered = description.to_lowercase();
    [
        ("counter", PassiveKind::Counter),
        ("reduce", PassiveKind::Reduce),
        ("deflect", PassiveKind::Deflect),
        ("heal", PassiveKind::Heal),
        ("explode", PassiveKind::Explode),
    ]
    .into_iter()
    .filter_map(|(keyword, kind)| lowered.find(keyword).map(|at| (at, kind)))
    .min_by_key(|(at, _)| *at)
    .map(|(_, kind)| kind)
}

/// Maps an active description (or the literal "Basic Attack") to a skill kind.
pub fn classify_active(description: &str) -> Option<SkillKind> {
    let lowered = description.trim().to_lowercase();
    if lowered == BASIC_ATTACK_TEXT.to_lowercase() {
        return Some(SkillKind::BasicAttack);
    }
    [
        ("infight", SkillKind::Infight),
        ("subtle", SkillKind::Subtle),
        ("aoe", SkillKind::Aoe),
        ("crit", SkillKind::Crit),
    ]
    .into_iter()
    .filter_map(|(keyword, kind)| lowered.find(keyword).map(|at| (at, kind)))
    .min_by_key(|(at, _)| *at)
    .map(|(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_entry_classifies_to_its_expected_kinds() {
        let expected = [
            (Archetype::Argonian, PassiveKind::Counter, SkillKind::Aoe),
            (Archetype::Khajit, PassiveKind::Counter, SkillKind::Infight),
            (Archetype::Redguard, PassiveKind::Deflect, SkillKind::Infight),
            (Archetype::Nord, PassiveKind::Reduce, SkillKind::Crit),
            (Archetype::Breton, PassiveKind::Reduce, SkillKind::Subtle),
            (Archetype::Imperial, PassiveKind::Heal, SkillKind::Infight),
            (Archetype::Onsimer, PassiveKind::Heal, SkillKind::Crit),
            (Archetype::Bosmer, PassiveKind::Explode, SkillKind::Crit),
        ];
        for (archetype, passive, active) in expected {
            let entry = template(archetype);
            assert_eq!(classify_passive(entry.passive), Some(passive), "{archetype}");
            assert_eq!(classify_active(entry.active), Some(active), "{archetype}");
        }
    }

    #[test]
    fn earliest_keyword_wins_when_text_mentions_several() {
        assert_eq!(classify_active("Crit: then AOE follow-up"), Some(SkillKind::Crit));
        assert_eq!(classify_passive("Heal: explode later"), Some(PassiveKind::Heal));
    }

    #[test]
    fn basic_attack_is_recognised_and_unknown_text_is_not() {
        assert_eq!(classify_active(" basic attack "), Some(SkillKind::BasicAttack));
        assert_eq!(classify_active("Fireball: burn everything"), None);
        assert_eq!(classify_passive("Stoneskin: nothing happens"), None);
    }
}
