//! Deterministic two-team hero battle engine: rosters with hidden identities,
//! a passive-ability combat pipeline, per-side intel, and batch evaluation.

pub mod battle;
pub mod combat;
pub mod config;
pub mod content;
pub mod draft;
pub mod episode;
pub mod intel;
pub mod journal;
pub mod journal_file;
pub mod metrics;
pub mod oracle;
pub mod replay;
pub mod state;
pub mod types;

pub use battle::{Battle, BattleOutcome, SideAgents, SideState, TurnStop};
pub use config::{BattleConfig, ConfigError, TeamConfig};
pub use episode::{BatchError, BatchReport, EpisodeResult, EpisodeSummary, run_batch, run_episode};
pub use journal::{BattleSetup, InputJournal, InputPayload, InputRecord};
pub use metrics::SideMetrics;
pub use replay::{ReplayError, ReplayResult, replay_to_end};
pub use state::{Difficulty, HeroDraft, Roster, RosterError};
pub use types::*;
