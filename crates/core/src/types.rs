use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every roster holds exactly this many heroes, at positions `0..ROSTER_SIZE`.
pub const ROSTER_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "Team A"),
            Side::B => write!(f, "Team B"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Argonian,
    Khajit,
    Redguard,
    Nord,
    Breton,
    Imperial,
    Onsimer,
    Bosmer,
}

impl Archetype {
    pub const ALL: [Archetype; 8] = [
        Archetype::Argonian,
        Archetype::Khajit,
        Archetype::Redguard,
        Archetype::Nord,
        Archetype::Breton,
        Archetype::Imperial,
        Archetype::Onsimer,
        Archetype::Bosmer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Argonian => "Argonian",
            Archetype::Khajit => "Khajit",
            Archetype::Redguard => "Redguard",
            Archetype::Nord => "Nord",
            Archetype::Breton => "Breton",
            Archetype::Imperial => "Imperial",
            Archetype::Onsimer => "Onsimer",
            Archetype::Bosmer => "Bosmer",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn parse(name: &str) -> Option<Archetype> {
        let name = name.trim();
        Self::ALL.into_iter().find(|archetype| archetype.name().eq_ignore_ascii_case(name))
    }

    pub fn matches_guess(self, guess: &str) -> bool {
        self.name().eq_ignore_ascii_case(guess.trim())
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveKind {
    Counter,
    Reduce,
    Deflect,
    Heal,
    Explode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Crit,
    Aoe,
    Infight,
    Subtle,
    BasicAttack,
}

impl SkillKind {
    /// Internal skills target the acting side's own roster.
    pub fn is_internal(self) -> bool {
        matches!(self, SkillKind::Infight | SkillKind::Subtle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Enemy,
    Teammate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroStatus {
    Alive,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Side(Side),
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// The acting side had no alive hero left at action selection.
    Defeat,
    Surrender,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    GameOver(GameOverCause),
    RoundLimit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    TurnStarted { side: Side, round: u32 },
    InternalSkill { side: Side, actor: u8, skill: SkillKind, target: u8 },
    AttackDispatched { side: Side, actor: u8, skill: SkillKind, target: u8, guess: String },
    Breach { side: Side, position: u8 },
    Dodged { side: Side, position: u8 },
    Deflected { side: Side, position: u8, retained: i32, shared_each: i32 },
    ShieldConsumed { side: Side, position: u8, before: i32, after: i32 },
    DamageTaken { side: Side, position: u8, amount: i32, health: i32 },
    Frenzy { side: Side, position: u8, attack_power: i32 },
    Enraged { side: Side, position: u8, attack_power: i32 },
    Healed { side: Side, position: u8, health: i32 },
    CounterArmed { side: Side, position: u8, amount: i32 },
    Recoil { side: Side, position: u8, amount: i32 },
    HeroDied { side: Side, position: u8 },
    Surrendered { side: Side },
    Defeated { side: Side },
}

/// Failures that abort the current turn, and with it the episode.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("oracle response malformed: {0}")]
    OracleMalformed(String),
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("invalid target position {0}")]
    InvalidTarget(u8),
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),
    #[error("malformed skill parse: {0}")]
    MalformedSkillParse(String),
}
