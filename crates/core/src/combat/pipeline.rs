//! Per-target damage pipeline.
//! Order is fixed: Reduce, Deflect, Shield, damage, Deflect bookkeeping,
//! Counter, Explode, Heal, with a death check after every health loss.

use super::*;
use crate::state::DEFLECT_BUFF_STEP;

pub const REDUCE_CHANCE_PERCENT: u32 = 30;
pub const DEFLECT_BUFF_ATTACK: i32 = 40;
pub const COUNTER_DAMAGE: i32 = 30;
pub const COUNTER_TEAMMATE_HEALTH: i32 = 120;
pub const EXPLODE_DAMAGE: i32 = 40;
pub const ENRAGE_HEALTH: i32 = 120;
pub const ENRAGE_ATTACK: i32 = 15;
pub const HEAL_AMOUNT: i32 = 20;

fn percent_of(amount: i32, percent: i64) -> i32 {
    (i64::from(amount) * percent / 100) as i32
}

/// Runs one incoming hit through `position`'s passive pipeline.
/// Returns the counter damage this hero sends back to the attacker.
pub(super) fn strike(
    roster: &mut Roster,
    position: u8,
    incoming: i32,
    rolls: &mut dyn ChanceRoll,
    log: &mut Vec<LogEvent>,
    newly_dead: &mut Vec<u8>,
) -> i32 {
    let side = roster.side;
    let idx = usize::from(position);
    let passive = roster.heroes()[idx].passive;
    let mut damage = incoming;

    if passive == PassiveKind::Reduce && rolls.roll_percent() < REDUCE_CHANCE_PERCENT {
        debug!(target: "battle.combat", side = %side, position, "reduce: hit avoided");
        log.push(LogEvent::Dodged { side, position });
        damage = 0;
    }

    if passive == PassiveKind::Deflect && damage > 0 {
        let retained = percent_of(damage, 30);
        let shared_total = percent_of(damage, 70);
        let mates: Vec<u8> =
            roster.alive_positions().into_iter().filter(|mate| *mate != position).collect();
        let shared_each = if mates.is_empty() { 0 } else { shared_total / mates.len() as i32 };
        log.push(LogEvent::Deflected { side, position, retained, shared_each });
        for mate in mates {
            if roster.heroes_mut()[usize::from(mate)].lose_health(shared_each) {
                newly_dead.push(mate);
                log.push(LogEvent::HeroDied { side, position: mate });
            }
        }
        damage = retained;
    }

    let hero = &mut roster.heroes_mut()[idx];
    if hero.shield_active && damage > 0 {
        let before = damage;
        damage = percent_of(damage, 30);
        hero.shield_active = false;
        log.push(LogEvent::ShieldConsumed { side, position, before, after: damage });
    }

    if damage > 0 {
        let died = hero.lose_health(damage);
        log.push(LogEvent::DamageTaken { side, position, amount: damage, health: hero.health });
        if died {
            newly_dead.push(position);
            log.push(LogEvent::HeroDied { side, position });
        }
    }

    if passive == PassiveKind::Deflect {
        hero.accumulated_damage += damage;
        if hero.accumulated_damage >= hero.buff_threshold {
            hero.attack_power += DEFLECT_BUFF_ATTACK;
            hero.buff_threshold += DEFLECT_BUFF_STEP;
            log.push(LogEvent::Frenzy { side, position, attack_power: hero.attack_power });
        }
    }

    let mut counter = 0;
    if passive == PassiveKind::Counter {
        let weak_mate = roster.heroes().iter().any(|mate| {
            mate.position != position && mate.is_alive() && mate.health < COUNTER_TEAMMATE_HEALTH
        });
        if weak_mate {
            counter += COUNTER_DAMAGE;
            log.push(LogEvent::CounterArmed { side, position, amount: COUNTER_DAMAGE });
        }
    }

    let hero = &mut roster.heroes_mut()[idx];
    if passive == PassiveKind::Explode && damage > 0 {
        if hero.health > 0 {
            counter += EXPLODE_DAMAGE;
            log.push(LogEvent::CounterArmed { side, position, amount: EXPLODE_DAMAGE });
        }
        if hero.health > 0 && hero.health < ENRAGE_HEALTH {
            hero.attack_power += ENRAGE_ATTACK;
            log.push(LogEvent::Enraged { side, position, attack_power: hero.attack_power });
        }
    }

    if passive == PassiveKind::Heal && hero.health > 0 && damage > 0 {
        hero.health += HEAL_AMOUNT;
        log.push(LogEvent::Healed { side, position, health: hero.health });
    }

    if hero.check_death() {
        newly_dead.push(position);
        log.push(LogEvent::HeroDied { side, position });
    }
    counter
}
