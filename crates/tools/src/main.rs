use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use battle_core::journal_file::write_journal;
use battle_core::oracle::{HeuristicOracle, RuleSkillParser};
use battle_core::{BatchReport, BattleConfig, Side, SideAgents, Winner, run_batch};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Runs a batch of hero battles and reports per-side metrics", long_about = None)]
struct Args {
    /// TOML batch configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Model identifier for team A
    #[arg(long)]
    model_a: Option<String>,
    /// Model identifier for team B
    #[arg(long)]
    model_b: Option<String>,
    #[arg(short, long)]
    episodes: Option<u32>,
    /// Strength ratio applied to the scaled side (stats grow by its square root)
    #[arg(short, long)]
    difficulty: Option<f64>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    max_rounds: Option<u32>,
    /// Directory receiving one JSONL input journal per episode
    #[arg(long)]
    journal_dir: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<BattleConfig> {
    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => BattleConfig::default(),
    };
    if let Some(model) = &args.model_a {
        config.team_mut(Side::A).model = model.clone();
    }
    if let Some(model) = &args.model_b {
        config.team_mut(Side::B).model = model.clone();
    }
    if let Some(episodes) = args.episodes {
        config.episodes = episodes;
    }
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }
    config.validate().context("Invalid batch settings")?;
    Ok(config)
}

fn write_journals(dir: &Path, report: &BatchReport) -> Result<()> {
    for result in &report.completed {
        let path = dir.join(format!("episode-{:03}.jsonl", result.summary.index));
        write_journal(&path, &result.journal)
            .with_context(|| format!("Failed to write journal: {}", path.display()))?;
    }
    for skipped in &report.skipped {
        let path = dir.join(format!("episode-{:03}-aborted.jsonl", skipped.index));
        write_journal(&path, &skipped.journal)
            .with_context(|| format!("Failed to write journal: {}", path.display()))?;
    }
    info!(target: "battle.episode", dir = %dir.display(), "journals written");
    Ok(())
}

fn print_report(report: &BatchReport) -> Result<()> {
    let Some(metrics) = report.metrics else {
        bail!("All {} episodes failed", report.skipped.len());
    };
    println!("{:<8} {:>5} {:>9} {:>12} {:>8}", "side", "wins", "win_rate", "damage_rate", "reward");
    for side in Side::BOTH {
        let side_metrics = metrics[side.index()];
        println!(
            "{:<8} {:>5} {:>9.3} {:>12.3} {:>8.3}",
            side.to_string(),
            side_metrics.wins,
            side_metrics.win_rate,
            side_metrics.damage_rate,
            side_metrics.reward
        );
    }
    if !report.skipped.is_empty() {
        println!("Skipped episodes: {}", report.skipped.len());
    }
    match report.leader() {
        Some(Winner::Side(side)) => println!("Leader: {side}"),
        Some(Winner::Draw) | None => println!("Leader: balanced"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let profiles = [config.profile(Side::A)?, config.profile(Side::B)?];
    let setup = config.battle_setup().context("Team generation failed")?;
    let parser = RuleSkillParser::new().context("Failed to build skill parser")?;

    info!(
        target: "battle.episode",
        episodes = config.episodes,
        difficulty = config.difficulty,
        scaled = %config.scaled_side,
        seed = config.seed,
        "batch started"
    );
    let report = run_batch(&setup, config.episodes, |setup| {
        Side::BOTH.map(|side| SideAgents {
            oracle: Box::new(HeuristicOracle::new(
                profiles[side.index()],
                setup.seed.rotate_left(side.index() as u32 * 32),
            )),
            parser: Box::new(parser.clone()),
        })
    })
    .context("Batch aborted")?;

    if let Some(dir) = &args.journal_dir {
        write_journals(dir, &report)?;
    }
    print_report(&report)
}
