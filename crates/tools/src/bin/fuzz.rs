use anyhow::{Context, Result};
use battle_core::draft::{SeededDraft, TeamSource};
use battle_core::episode::episode_seed;
use battle_core::oracle::{HeuristicOracle, OracleProfile, RuleSkillParser};
use battle_core::{Battle, BattleSetup, Difficulty, HeroStatus, Side, TurnStop};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    episodes: u32,
    #[arg(short, long, default_value_t = 60)]
    max_rounds: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn check_invariants(battle: &Battle) {
    for side in Side::BOTH {
        for hero in battle.roster(side).heroes() {
            assert!(hero.health >= 0, "Invariant failed: negative health {hero:?}");
            assert_eq!(
                hero.status == HeroStatus::Dead,
                hero.health == 0,
                "Invariant failed: status and health disagree {hero:?}"
            );
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("Starting Fuzz harness on seed {} for {} episodes...", args.seed, args.episodes);
    let parser = RuleSkillParser::new().context("Failed to build skill parser")?;

    let mut turns = 0u64;
    for index in 0..args.episodes {
        let seed = episode_seed(args.seed, index);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut draft = SeededDraft::new(seed);
        let difficulty = choose(&mut rng, &[0.5, 1.0, 1.0, 2.0, 4.0]);
        let setup = BattleSetup {
            seed,
            teams: [draft.draft(Side::A)?, draft.draft(Side::B)?],
            difficulty: Difficulty::new(difficulty).unwrap_or_default(),
            scaled_side: choose(&mut rng, &Side::BOTH),
            max_rounds: args.max_rounds,
        };
        let mut battle = Battle::new(&setup)?;
        let mut oracles = Side::BOTH.map(|side| {
            HeuristicOracle::new(OracleProfile::Random, seed.wrapping_add(side.index() as u64))
        });
        let mut parsers = [parser.clone(), parser.clone()];

        check_invariants(&battle);
        while battle.round() <= args.max_rounds {
            let side = battle.to_act().index();
            let stop = battle
                .play_turn(&mut oracles[side], &mut parsers[side])
                .with_context(|| format!("Engine error in episode {index} (seed {seed})"))?;
            turns += 1;
            check_invariants(&battle);
            if let TurnStop::GameOver(outcome) = stop {
                println!("Episode {index}: {:?} after {} rounds", outcome.winner, outcome.rounds);
                break;
            }
        }
    }

    println!("Fuzzing completed successfully after {turns} turns.");
    Ok(())
}
