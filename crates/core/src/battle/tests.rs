use super::*;
use crate::combat::ParsedSkill;
use crate::oracle::{ActionDecision, ScriptedOracle, ScriptedParser, TargetReply};
use crate::state::{Difficulty, HeroDraft};

fn drafts(names: [&str; ROSTER_SIZE]) -> Vec<HeroDraft> {
    names.into_iter().map(HeroDraft::named).collect()
}

fn setup(a: [&str; ROSTER_SIZE], b: [&str; ROSTER_SIZE]) -> BattleSetup {
    BattleSetup {
        seed: 42,
        teams: [drafts(a), drafts(b)],
        difficulty: Difficulty::default(),
        scaled_side: Side::B,
        max_rounds: 10,
    }
}

const PLAIN: [&str; ROSTER_SIZE] = ["Imperial", "Khajit", "Onsimer", "Argonian"];

fn attack(hero: u8, skill: SkillKind) -> ActionDecision {
    ActionDecision { hero, skill, target_type: TargetType::Enemy, teammate_target: None }
}

fn internal(hero: u8, skill: SkillKind, target: u8) -> ActionDecision {
    ActionDecision { hero, skill, target_type: TargetType::Teammate, teammate_target: Some(target) }
}

fn aim(position: u8, guess: &str) -> TargetReply {
    TargetReply::Attack { position, guessed_identity: guess.to_string() }
}

fn health(battle: &Battle, side: Side) -> Vec<i32> {
    battle.roster(side).heroes().iter().map(|hero| hero.health).collect()
}

#[test]
fn infight_turn_stays_on_the_acting_side_and_passes_control() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    let mut oracle = ScriptedOracle::new([internal(1, SkillKind::Infight, 0)], []);
    let mut parser = ScriptedParser::default();

    let stop = battle.play_turn(&mut oracle, &mut parser).unwrap();

    assert_eq!(stop, TurnStop::Continue);
    assert_eq!(health(&battle, Side::A), vec![325, 400, 400, 400]);
    assert_eq!(battle.roster(Side::A).hero(1).unwrap().attack_power, 340);
    assert_eq!(health(&battle, Side::B), vec![400; 4]);
    assert!(battle.intel(Side::B).snapshot().is_empty());
    assert_eq!(battle.to_act(), Side::B);
    assert_eq!(battle.round(), 1);
    assert_eq!(battle.inputs().len(), 1);
}

#[test]
fn attack_turn_resolves_and_updates_the_attackers_intel() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    let mut oracle =
        ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(1, "khajit")]);
    let mut parser = ScriptedParser::new([ParsedSkill::single(100.0)]);

    battle.play_turn(&mut oracle, &mut parser).unwrap();

    assert_eq!(health(&battle, Side::B), vec![350, 250, 350, 350]);
    let entry = battle.intel(Side::A).entry(1).unwrap();
    assert_eq!(entry.identity, Some(Archetype::Khajit));
    assert_eq!(entry.health, Some(250));
    assert!(battle.log().contains(&LogEvent::Breach { side: Side::B, position: 1 }));
    let kinds: Vec<&InputPayload> = battle.inputs().iter().map(|record| &record.payload).collect();
    assert!(matches!(
        kinds.as_slice(),
        [InputPayload::Action(_), InputPayload::Target(_), InputPayload::SkillParse(_)]
    ));
}

#[test]
fn explode_recoil_hits_the_acting_hero_raw() {
    let mut battle =
        Battle::new(&setup(PLAIN, ["Bosmer", "Khajit", "Imperial", "Argonian"])).unwrap();
    let mut oracle = ScriptedOracle::new([attack(1, SkillKind::BasicAttack)], [aim(0, "Nord")]);
    let mut parser = ScriptedParser::new([ParsedSkill::single(100.0)]);

    battle.play_turn(&mut oracle, &mut parser).unwrap();

    assert_eq!(battle.roster(Side::A).hero(1).unwrap().health, 360);
    assert!(battle.log().contains(&LogEvent::Recoil { side: Side::A, position: 1, amount: 40 }));
}

#[test]
fn counter_recoil_can_kill_the_attacker() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    battle.roster_mut(Side::A).apply_raw_damage(0, 380).unwrap();
    battle.roster_mut(Side::B).apply_raw_damage(0, 300).unwrap();
    let mut oracle =
        ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(1, "khajit")]);
    let mut parser = ScriptedParser::new([ParsedSkill::single(100.0)]);

    battle.play_turn(&mut oracle, &mut parser).unwrap();

    let attacker = battle.roster(Side::A).hero(0).unwrap();
    assert_eq!(attacker.status, HeroStatus::Dead);
    assert_eq!(attacker.health, 0);
    assert!(battle.roster(Side::B).hero(1).unwrap().is_alive());
    assert!(battle.log().contains(&LogEvent::Recoil { side: Side::A, position: 0, amount: 30 }));
    assert!(battle.log().contains(&LogEvent::HeroDied { side: Side::A, position: 0 }));
}

#[test]
fn side_with_no_living_heroes_is_defeated_without_consulting_its_oracle() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    for position in 0..4 {
        battle.roster_mut(Side::A).apply_raw_damage(position, 400).unwrap();
    }
    let mut oracle = ScriptedOracle::default();
    let mut parser = ScriptedParser::default();

    let stop = battle.play_turn(&mut oracle, &mut parser).unwrap();

    let expected = BattleOutcome {
        winner: Winner::Side(Side::B),
        end: EpisodeEnd::GameOver(GameOverCause::Defeat),
        rounds: 1,
    };
    assert_eq!(stop, TurnStop::GameOver(expected));
    assert_eq!(battle.outcome(), Some(expected));
    assert!(battle.log().contains(&LogEvent::Defeated { side: Side::A }));
}

#[test]
fn surrender_ends_the_game_for_the_opponent() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    let mut oracle =
        ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [TargetReply::Surrender]);
    let mut parser = ScriptedParser::default();

    let stop = battle.play_turn(&mut oracle, &mut parser).unwrap();

    let TurnStop::GameOver(outcome) = stop else { panic!("expected game over, got {stop:?}") };
    assert_eq!(outcome.winner, Winner::Side(Side::B));
    assert_eq!(outcome.end, EpisodeEnd::GameOver(GameOverCause::Surrender));
    assert_eq!(battle.play_turn(&mut oracle, &mut parser).unwrap(), stop);
    assert_eq!(health(&battle, Side::B), vec![400; 4]);
}

#[test]
fn invalid_actions_abort_without_touching_state() {
    let cases = [
        (attack(1, SkillKind::Infight), "internal skill on an enemy"),
        (internal(0, SkillKind::BasicAttack, 1), "attack on a teammate"),
        (internal(1, SkillKind::Subtle, 1), "skill the hero does not have"),
        (internal(1, SkillKind::Infight, 1), "infight on self"),
    ];
    for (decision, why) in cases {
        let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
        let hash = battle.snapshot_hash();
        let mut oracle = ScriptedOracle::new([decision], []);
        let result = battle.play_turn(&mut oracle, &mut ScriptedParser::default());
        assert!(matches!(result, Err(EngineError::IllegalMove(_))), "{why}: {result:?}");
        assert_eq!(battle.snapshot_hash(), hash, "{why}");
    }
}

#[test]
fn rejected_internal_action_is_not_recorded() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    battle.roster_mut(Side::A).apply_raw_damage(2, 400).unwrap();
    let mut oracle = ScriptedOracle::new([internal(1, SkillKind::Infight, 2)], []);

    let result = battle.play_turn(&mut oracle, &mut ScriptedParser::default());

    assert!(matches!(result, Err(EngineError::IllegalMove(_))), "{result:?}");
    assert!(battle.inputs().is_empty());
    assert_eq!(battle.roster(Side::A).hero(1).unwrap().attack_power, 200);
}

#[test]
fn dead_or_missing_actor_and_missing_teammate_are_rejected() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    battle.roster_mut(Side::A).apply_raw_damage(2, 400).unwrap();
    let mut oracle = ScriptedOracle::new(
        [
            attack(2, SkillKind::BasicAttack),
            attack(9, SkillKind::BasicAttack),
            ActionDecision {
                hero: 1,
                skill: SkillKind::Infight,
                target_type: TargetType::Teammate,
                teammate_target: None,
            },
        ],
        [],
    );
    let mut parser = ScriptedParser::default();
    assert!(matches!(battle.play_turn(&mut oracle, &mut parser), Err(EngineError::IllegalMove(_))));
    assert_eq!(battle.play_turn(&mut oracle, &mut parser), Err(EngineError::InvalidTarget(9)));
    assert!(matches!(
        battle.play_turn(&mut oracle, &mut parser),
        Err(EngineError::OracleMalformed(_))
    ));
}

#[test]
fn targeting_a_position_known_dead_is_illegal() {
    let fresh = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    let mut sides = [fresh.side(Side::A).clone(), fresh.side(Side::B).clone()];
    sides[0].intel.mark_dead(2);
    let mut battle = Battle::from_sides(1, 10, sides);
    let mut oracle =
        ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(2, "Onsimer")]);
    let result = battle.play_turn(&mut oracle, &mut ScriptedParser::default());
    assert!(matches!(result, Err(EngineError::IllegalMove(_))));

    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    let mut oracle = ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(4, "Nord")]);
    let result = battle.play_turn(&mut oracle, &mut ScriptedParser::default());
    assert_eq!(result, Err(EngineError::InvalidTarget(4)));
}

#[test]
fn oracle_failures_surface_as_engine_errors() {
    let mut battle = Battle::new(&setup(PLAIN, PLAIN)).unwrap();
    let result = battle.play_turn(&mut ScriptedOracle::default(), &mut ScriptedParser::default());
    assert!(matches!(result, Err(EngineError::OracleUnavailable(_))));

    let mut oracle = ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(0, "Nord")]);
    let mut parser = ScriptedParser::new([ParsedSkill::single(f64::NAN)]);
    let result = battle.play_turn(&mut oracle, &mut parser);
    assert!(matches!(result, Err(EngineError::MalformedSkillParse(_))));
    assert_eq!(health(&battle, Side::B), vec![400; 4]);
}

#[test]
fn round_limit_decides_by_alive_count() {
    let mut battle_setup = setup(["Breton", "Khajit", "Imperial", "Argonian"], PLAIN);
    battle_setup.max_rounds = 1;
    let mut battle = Battle::new(&battle_setup).unwrap();
    let mut agents = [
        SideAgents {
            oracle: Box::new(ScriptedOracle::new([internal(0, SkillKind::Subtle, 0)], [])),
            parser: Box::new(ScriptedParser::default()),
        },
        SideAgents {
            oracle: Box::new(ScriptedOracle::new([internal(1, SkillKind::Infight, 3)], [])),
            parser: Box::new(ScriptedParser::default()),
        },
    ];

    let outcome = battle.run_to_end(&mut agents).unwrap();

    assert_eq!(outcome, BattleOutcome { winner: Winner::Draw, end: EpisodeEnd::RoundLimit, rounds: 1 });
    assert_eq!(battle.round(), 2);
    assert!(battle.roster(Side::A).hero(0).unwrap().shield_active);
}

#[test]
fn round_limit_favours_the_side_with_more_survivors() {
    let mut battle_setup = setup(PLAIN, PLAIN);
    battle_setup.max_rounds = 1;
    let mut battle = Battle::new(&battle_setup).unwrap();
    battle.roster_mut(Side::B).hero_mut(3).unwrap().health = 50;
    let mut agents = [
        SideAgents {
            oracle: Box::new(ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(3, "Nord")])),
            parser: Box::new(ScriptedParser::new([ParsedSkill::single(100.0)])),
        },
        SideAgents {
            oracle: Box::new(ScriptedOracle::new([internal(1, SkillKind::Infight, 0)], [])),
            parser: Box::new(ScriptedParser::default()),
        },
    ];
    let outcome = battle.run_to_end(&mut agents).unwrap();
    assert_eq!(outcome.winner, Winner::Side(Side::A));
    // B's own Infight also counts against B's total.
    assert_eq!(battle.damage_dealt(Side::A), 475);
    assert_eq!(battle.damage_dealt(Side::B), 0);
}

#[test]
fn difficulty_scales_only_the_chosen_side() {
    let mut battle_setup = setup(PLAIN, PLAIN);
    battle_setup.difficulty = Difficulty::new(4.0).unwrap();
    let battle = Battle::new(&battle_setup).unwrap();
    assert_eq!(battle.side(Side::A).starting_health, 1600);
    assert_eq!(battle.side(Side::B).starting_health, 3200);
    assert!(battle.roster(Side::B).heroes().iter().all(|hero| hero.attack_power == 400));
    assert_eq!(battle.damage_dealt(Side::A), 0);
}

#[test]
fn identical_inputs_give_identical_hashes() {
    let play = || {
        let mut battle = Battle::new(&setup(PLAIN, ["Nord", "Breton", "Redguard", "Bosmer"])).unwrap();
        let mut oracle = ScriptedOracle::new([attack(0, SkillKind::BasicAttack)], [aim(0, "Nord")]);
        let mut parser = ScriptedParser::new([ParsedSkill::single(120.0)]);
        let before = battle.snapshot_hash();
        battle.play_turn(&mut oracle, &mut parser).unwrap();
        (before, battle.snapshot_hash(), health(&battle, Side::B))
    };
    let (before, after, first_health) = play();
    assert_ne!(before, after);
    assert_eq!(play(), (before, after, first_health));
}
