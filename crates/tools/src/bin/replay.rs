use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_core::journal_file::load_journal_from_file;
use battle_core::replay_to_end;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Re-executes a recorded episode journal", long_about = None)]
struct Args {
    /// Path to the JSONL journal to replay
    #[arg(short, long)]
    journal: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let journal = load_journal_from_file(&args.journal)
        .with_context(|| format!("Failed to load journal: {}", args.journal.display()))?;
    let result = replay_to_end(&journal).context("Replay failed during execution")?;

    println!("Replay complete.");
    println!("Inputs: {}", journal.inputs.len());
    println!("Rounds: {}", result.rounds);
    println!("Outcome: {:?} ({:?})", result.outcome.winner, result.outcome.end);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);
    Ok(())
}
