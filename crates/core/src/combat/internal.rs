//! Own-team skills: Infight and Subtle.
//! These never touch the opposing roster and produce no counter damage.

use super::*;

pub const INFIGHT_DAMAGE: i32 = 75;
pub const INFIGHT_ATTACK_GAIN: i32 = 140;
pub const SUBTLE_ATTACK_GAIN: i32 = 20;

pub fn apply_internal_skill(
    roster: &mut Roster,
    actor: u8,
    skill: SkillKind,
    target: u8,
    log: &mut Vec<LogEvent>,
) -> Result<(), EngineError> {
    let side = roster.side;
    let actor_hero = roster.hero(actor).ok_or(EngineError::InvalidTarget(actor))?;
    let target_hero = roster.hero(target).ok_or(EngineError::InvalidTarget(target))?;
    if !actor_hero.is_alive() {
        return Err(EngineError::IllegalMove(format!("acting hero {actor} is dead")));
    }
    if !target_hero.is_alive() {
        return Err(EngineError::IllegalMove(format!("{skill:?} cannot target dead hero {target}")));
    }

    match skill {
        SkillKind::Infight => {
            if target == actor {
                return Err(EngineError::IllegalMove("Infight cannot target the actor".into()));
            }
            let heroes = roster.heroes_mut();
            if heroes[usize::from(target)].lose_health(INFIGHT_DAMAGE) {
                log.push(LogEvent::HeroDied { side, position: target });
            }
            heroes[usize::from(actor)].attack_power += INFIGHT_ATTACK_GAIN;
        }
        SkillKind::Subtle => {
            let hero = &mut roster.heroes_mut()[usize::from(target)];
            hero.shield_active = true;
            hero.attack_power += SUBTLE_ATTACK_GAIN;
        }
        other => {
            return Err(EngineError::IllegalMove(format!("{other:?} is not an internal skill")));
        }
    }

    info!(target: "battle.combat", side = %side, actor, teammate = target, ?skill, "internal skill applied");
    log.push(LogEvent::InternalSkill { side, actor, skill, target });
    Ok(())
}
