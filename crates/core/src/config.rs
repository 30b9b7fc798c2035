//! Batch configuration, read from TOML. Every field has a default.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::de::Error as TomlError;

use crate::draft::{FixedDraft, SeededDraft, TeamSource};
use crate::episode::BatchError;
use crate::journal::BattleSetup;
use crate::oracle::OracleProfile;
use crate::state::{Difficulty, HeroDraft, Roster, StartingStats};
use crate::types::Side;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_ROUNDS: u32 = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] TomlError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamConfig {
    /// Model identifier, mapped onto a built-in oracle profile.
    pub model: String,
    /// Fixed archetype names; drawn from the seed when absent.
    pub roster: Option<Vec<String>>,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string(), roster: None }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattleConfig {
    pub episodes: u32,
    pub difficulty: f64,
    pub scaled_side: Side,
    pub max_rounds: u32,
    pub seed: u64,
    pub team_a: TeamConfig,
    pub team_b: TeamConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            episodes: 5,
            difficulty: 1.0,
            scaled_side: Side::B,
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: 0,
            team_a: TeamConfig::default(),
            team_b: TeamConfig::default(),
        }
    }
}

impl BattleConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn team(&self, side: Side) -> &TeamConfig {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut TeamConfig {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::Invalid("episodes must be at least 1".to_string()));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be at least 1".to_string()));
        }
        if Difficulty::new(self.difficulty).is_none() {
            return Err(ConfigError::Invalid(format!(
                "difficulty must be a positive finite ratio, got {}",
                self.difficulty
            )));
        }
        for side in Side::BOTH {
            self.profile(side)?;
            if let Some(names) = &self.team(side).roster {
                let drafts: Vec<_> = names.iter().map(HeroDraft::named).collect();
                Roster::from_drafts(side, &drafts, StartingStats::default())
                    .map_err(|err| ConfigError::Invalid(format!("{side} roster: {err}")))?;
            }
        }
        Ok(())
    }

    pub fn profile(&self, side: Side) -> Result<OracleProfile, ConfigError> {
        let model = &self.team(side).model;
        OracleProfile::from_model_id(model)
            .ok_or_else(|| ConfigError::Invalid(format!("{side}: unknown model '{model}'")))
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::new(self.difficulty).unwrap_or_default()
    }

    /// The configured roster for `side`, or a seeded draw when none is fixed.
    pub fn team_source(&self, side: Side) -> Box<dyn TeamSource> {
        match &self.team(side).roster {
            Some(names) => Box::new(FixedDraft::new(names.iter().cloned())),
            None => Box::new(SeededDraft::new(self.seed ^ (side.index() as u64 + 1))),
        }
    }

    /// Drafts both teams. A failed draft aborts the whole batch.
    pub fn battle_setup(&self) -> Result<BattleSetup, BatchError> {
        let draft = |side: Side| {
            self.team_source(side).draft(side).map_err(|source| BatchError::Draft { side, source })
        };
        let teams = [draft(Side::A)?, draft(Side::B)?];
        Ok(BattleSetup {
            seed: self.seed,
            teams,
            difficulty: self.difficulty(),
            scaled_side: self.scaled_side,
            max_rounds: self.max_rounds,
        })
    }
}
